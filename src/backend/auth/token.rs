//! Token payloads issued by the identity provider.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::Deserialize;
use std::time::{SystemTime, UNIX_EPOCH};

use super::error::AuthError;

/// Claims read from the access token payload. Every field is optional because
/// realms differ in which mappers they enable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TokenClaims {
    pub sub: Option<String>,
    pub name: Option<String>,
    pub preferred_username: Option<String>,
    pub email: Option<String>,
    pub given_name: Option<String>,
    pub family_name: Option<String>,
    /// Expiry, seconds since the epoch.
    pub exp: Option<u64>,
    pub realm_access: Option<RealmAccess>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RealmAccess {
    #[serde(default)]
    pub roles: Vec<String>,
}

impl TokenClaims {
    pub fn realm_roles(&self) -> Vec<String> {
        self.realm_access
            .as_ref()
            .map(|access| access.roles.clone())
            .unwrap_or_default()
    }
}

/// Decodes the payload segment of a JWT without verifying its signature.
/// The token came straight from the token endpoint over the configured transport.
pub fn decode_claims(token: &str) -> Result<TokenClaims, AuthError> {
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        return Err(AuthError::MalformedToken(format!(
            "expected 3 segments, got {}",
            parts.len()
        )));
    }

    let payload = parts[1].trim_end_matches('=');
    let decoded = URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|e| AuthError::MalformedToken(format!("payload is not base64url: {e}")))?;

    serde_json::from_slice(&decoded)
        .map_err(|e| AuthError::MalformedToken(format!("payload is not JSON: {e}")))
}

pub fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Raw token endpoint response.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub id_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
}

/// Tokens held in memory for the current session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenSet {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub id_token: Option<String>,
    /// Access token expiry, seconds since the epoch.
    pub expires_at: u64,
    pub claims: TokenClaims,
}

impl TokenSet {
    /// Builds a token set from a token endpoint response. The `exp` claim wins over
    /// `expires_in` when both are present.
    pub fn from_response(response: TokenResponse) -> Result<Self, AuthError> {
        let claims = decode_claims(&response.access_token)?;
        let expires_at = claims
            .exp
            .or_else(|| response.expires_in.map(|secs| now_secs() + secs))
            .unwrap_or_else(now_secs);

        Ok(Self {
            access_token: response.access_token,
            refresh_token: response.refresh_token,
            id_token: response.id_token,
            expires_at,
            claims,
        })
    }

    /// Seconds until the access token expires, zero if already expired.
    pub fn seconds_left(&self) -> u64 {
        self.expires_at.saturating_sub(now_secs())
    }

    pub fn is_expired(&self) -> bool {
        self.seconds_left() == 0
    }

    /// True when the token expires within `min_validity` seconds.
    pub fn expires_within(&self, min_validity: u64) -> bool {
        self.seconds_left() < min_validity
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Builds an unsigned JWT with the given JSON payload.
    pub(crate) fn fake_jwt(payload: &serde_json::Value) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
        let body = URL_SAFE_NO_PAD.encode(payload.to_string());
        format!("{header}.{body}.sig")
    }

    #[test]
    fn decodes_keycloak_claims() {
        let token = fake_jwt(&serde_json::json!({
            "sub": "42",
            "name": "Ada Lovelace",
            "preferred_username": "ada",
            "email": "ada@example.com",
            "given_name": "Ada",
            "family_name": "Lovelace",
            "exp": 4_000_000_000u64,
            "realm_access": { "roles": ["admin", "viewer"] }
        }));

        let claims = decode_claims(&token).unwrap();
        assert_eq!(claims.preferred_username.as_deref(), Some("ada"));
        assert_eq!(claims.realm_roles(), vec!["admin", "viewer"]);
    }

    #[test]
    fn missing_claims_are_none() {
        let claims = decode_claims(&fake_jwt(&serde_json::json!({}))).unwrap();
        assert_eq!(claims, TokenClaims::default());
        assert!(claims.realm_roles().is_empty());
    }

    #[test]
    fn rejects_malformed_tokens() {
        assert!(matches!(
            decode_claims("only.two"),
            Err(AuthError::MalformedToken(_))
        ));
        assert!(matches!(
            decode_claims("a.!!!.c"),
            Err(AuthError::MalformedToken(_))
        ));
    }

    #[test]
    fn expiry_prefers_exp_claim() {
        let exp = now_secs() + 600;
        let response = TokenResponse {
            access_token: fake_jwt(&serde_json::json!({ "exp": exp })),
            refresh_token: Some("r".into()),
            id_token: None,
            expires_in: Some(5),
        };

        let tokens = TokenSet::from_response(response).unwrap();
        assert_eq!(tokens.expires_at, exp);
        assert!(!tokens.is_expired());
        assert!(!tokens.expires_within(30));
        assert!(tokens.expires_within(3600));
    }

    #[test]
    fn expiry_falls_back_to_expires_in() {
        let response = TokenResponse {
            access_token: fake_jwt(&serde_json::json!({})),
            refresh_token: None,
            id_token: None,
            expires_in: Some(300),
        };

        let tokens = TokenSet::from_response(response).unwrap();
        assert!(tokens.seconds_left() > 290);
    }
}
