//! Application configuration loaded from the environment.

use crate::simple_error;
use serde::{Deserialize, Serialize};
use url::Url;

pub const ENV_KEYCLOAK_URL: &str = "BUSINESSPRO_KEYCLOAK_URL";
pub const ENV_KEYCLOAK_REALM: &str = "BUSINESSPRO_KEYCLOAK_REALM";
pub const ENV_KEYCLOAK_CLIENT_ID: &str = "BUSINESSPRO_KEYCLOAK_CLIENT_ID";
pub const ENV_REDIRECT_ORIGIN: &str = "BUSINESSPRO_REDIRECT_ORIGIN";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    pub provider: ProviderConfig,
    /// Origin the provider redirects back to. A loopback listener is bound to its port.
    pub redirect_origin: String,
}

/// Identity provider coordinates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub url: String,
    pub realm: String,
    pub client_id: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            provider: ProviderConfig::default(),
            redirect_origin: "http://localhost:3000".to_string(),
        }
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:8080/".to_string(),
            realm: "SME".to_string(),
            client_id: "front-end".to_string(),
        }
    }
}

impl AppConfig {
    /// Reads the configuration from process environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary lookup, falling back to defaults
    /// for variables that are not set at all. Set-but-empty values are kept so that
    /// [`AppConfig::validate`] can report them.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            provider: ProviderConfig {
                url: lookup(ENV_KEYCLOAK_URL).unwrap_or(defaults.provider.url),
                realm: lookup(ENV_KEYCLOAK_REALM).unwrap_or(defaults.provider.realm),
                client_id: lookup(ENV_KEYCLOAK_CLIENT_ID).unwrap_or(defaults.provider.client_id),
            },
            redirect_origin: lookup(ENV_REDIRECT_ORIGIN).unwrap_or(defaults.redirect_origin),
        }
    }

    /// Returns the names of missing or unusable settings. Callers log these and carry on.
    pub fn validate(&self) -> Vec<&'static str> {
        let mut problems = Vec::new();
        if self.provider.url.trim().is_empty() {
            problems.push(ENV_KEYCLOAK_URL);
        }
        if self.provider.realm.trim().is_empty() {
            problems.push(ENV_KEYCLOAK_REALM);
        }
        if self.provider.client_id.trim().is_empty() {
            problems.push(ENV_KEYCLOAK_CLIENT_ID);
        }
        if Url::parse(&self.redirect_origin).is_err() {
            problems.push(ENV_REDIRECT_ORIGIN);
        }
        problems
    }

    /// Logs the configuration. Only called in debug builds.
    pub fn log_summary(&self) {
        log::info!("=== KEYCLOAK CONFIGURATION ===");
        log::info!("URL: {}", self.provider.url);
        log::info!("Realm: {}", self.provider.realm);
        log::info!("Client ID: {}", self.provider.client_id);
        log::info!("Redirect origin: {}", self.redirect_origin);
    }

    /// Logs every invalid setting as a configuration error.
    pub fn report_problems(&self) {
        let problems = self.validate();
        if problems.is_empty() {
            return;
        }

        log::error!("=== KEYCLOAK CONFIG ERROR ===");
        log::error!("Missing required Keycloak configuration:");
        for name in problems {
            log::error!("  {name} is missing or invalid");
        }
        log::error!("URL: {:?}", self.provider.url);
        log::error!("Realm: {:?}", self.provider.realm);
        log::error!("Client ID: {:?}", self.provider.client_id);
    }

    /// Redirect origin with a trailing slash removed.
    pub fn origin(&self) -> &str {
        self.redirect_origin.trim_end_matches('/')
    }

    /// Redirect target used after a successful login.
    pub fn dashboard_redirect_uri(&self) -> String {
        format!("{}/dashboard", self.origin())
    }

    /// Resolves the launch location against the redirect origin. Relative paths
    /// such as `/dashboard?code=..&state=..` are joined onto the origin.
    pub fn launch_url(&self, requested: Option<&str>) -> crate::utils::Result<Url> {
        let origin = Url::parse(self.origin())
            .map_err(|e| simple_error!("Invalid redirect origin {}: {}", self.origin(), e))?;
        match requested {
            Some(raw) => origin
                .join(raw)
                .map_err(|e| simple_error!("Invalid launch URL {}: {}", raw, e)),
            None => Ok(origin.join("/")?),
        }
    }
}

impl ProviderConfig {
    /// Base URL of the realm, e.g. `http://localhost:8080/realms/SME`.
    pub fn realm_url(&self) -> String {
        format!("{}/realms/{}", self.url.trim_end_matches('/'), self.realm)
    }

    pub fn discovery_url(&self) -> String {
        format!("{}/.well-known/openid-configuration", self.realm_url())
    }

    pub fn account_url(&self) -> String {
        format!("{}/account", self.realm_url())
    }
}
