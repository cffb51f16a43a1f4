//! Builds a [`UserProfile`] from whatever the provider gives us.

use super::state::UserProfile;
use crate::backend::auth::{IdentityClient, ProviderProfile, TokenClaims};

/// Name shown when the provider knows nothing about the user.
pub const DEFAULT_DISPLAY_NAME: &str = "User";

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Profile from the provider's account document.
pub fn from_provider_profile(profile: &ProviderProfile, roles: Vec<String>) -> UserProfile {
    let first_name = profile.first_name.clone().unwrap_or_default();
    let last_name = profile.last_name.clone().unwrap_or_default();
    let full_name = format!("{first_name} {last_name}");

    let name = non_empty(Some(full_name.as_str()))
        .or_else(|| non_empty(profile.username.as_deref()))
        .unwrap_or(DEFAULT_DISPLAY_NAME)
        .to_string();

    UserProfile {
        name,
        email: profile.email.clone().unwrap_or_default(),
        username: profile.username.clone().unwrap_or_default(),
        first_name,
        last_name,
        roles,
    }
}

/// Profile synthesized from token claims.
pub fn from_claims(claims: &TokenClaims) -> UserProfile {
    let name = non_empty(claims.name.as_deref())
        .or_else(|| non_empty(claims.preferred_username.as_deref()))
        .unwrap_or(DEFAULT_DISPLAY_NAME)
        .to_string();

    UserProfile {
        name,
        email: claims.email.clone().unwrap_or_default(),
        username: claims.preferred_username.clone().unwrap_or_default(),
        first_name: claims.given_name.clone().unwrap_or_default(),
        last_name: claims.family_name.clone().unwrap_or_default(),
        roles: claims.realm_roles(),
    }
}

/// Fetches the profile and falls back to token claims. Never fails.
pub async fn resolve<C>(client: &C) -> UserProfile
where
    C: IdentityClient + ?Sized,
{
    log::info!("Loading user data...");
    match client.load_user_profile().await {
        Ok(profile) => {
            let user = from_provider_profile(&profile, client.realm_roles());
            log::info!("User data loaded for {}", user.name);
            user
        }
        Err(e) => {
            log::warn!("Profile loading failed, using token data: {e}");
            from_claims(&client.token_claims().unwrap_or_default())
        }
    }
}
