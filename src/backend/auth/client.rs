//! Identity client abstraction and its lifecycle events.

use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::broadcast;
use url::Url;

use super::callback::{CallbackParams, callback_params};
use super::error::AuthError;
use super::pkce::CHALLENGE_METHOD;
use super::token::TokenClaims;

/// How `init` treats a launch without an existing session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnLoad {
    /// Only report whether a session already exists.
    CheckSso,
    /// Finish (or start) an interactive login before returning.
    LoginRequired,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitOptions {
    pub on_load: OnLoad,
    pub pkce_method: &'static str,
    /// Hidden-iframe session polling. Always off: third-party cookie rules break it.
    pub check_login_iframe: bool,
    /// Authorization response found on the launch location, if any.
    pub callback: Option<CallbackParams>,
    /// Where the provider should send the browser after an interactive login.
    pub redirect_uri: String,
}

impl InitOptions {
    /// Picks the init mode from the launch location: a location carrying `code` and
    /// `state` forces an interactive login, anything else is a silent check.
    pub fn for_location(location: &Url, redirect_uri: impl Into<String>) -> Self {
        let callback = callback_params(location);
        let on_load = if callback.is_some() {
            OnLoad::LoginRequired
        } else {
            OnLoad::CheckSso
        };

        Self {
            on_load,
            pkce_method: CHALLENGE_METHOD,
            check_login_iframe: false,
            callback,
            redirect_uri: redirect_uri.into(),
        }
    }
}

/// Lifecycle notifications emitted by an identity client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    AuthSuccess,
    AuthError(String),
    AuthLogout,
    TokenExpired,
    AuthRefreshSuccess,
    AuthRefreshError,
}

/// Fan-out channel for [`AuthEvent`]s.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<AuthEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(32);
        Self { sender }
    }

    /// Sends an event. Events with no subscriber are dropped.
    pub fn emit(&self, event: AuthEvent) {
        log::debug!("Auth event: {event:?}");
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> EventSubscription {
        EventSubscription {
            receiver: Some(self.sender.subscribe()),
        }
    }

    #[cfg(test)]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// A registered listener. Dropping it or calling [`EventSubscription::unsubscribe`]
/// tears the registration down.
pub struct EventSubscription {
    receiver: Option<broadcast::Receiver<AuthEvent>>,
}

impl EventSubscription {
    /// Waits for the next event. Returns `None` once unsubscribed or when the
    /// client is gone.
    pub async fn next(&mut self) -> Option<AuthEvent> {
        loop {
            let receiver = self.receiver.as_mut()?;
            match receiver.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    log::warn!("Auth event listener lagged, skipped {skipped} events");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    self.receiver = None;
                    return None;
                }
            }
        }
    }

    pub fn unsubscribe(&mut self) {
        self.receiver = None;
    }

    #[cfg(test)]
    pub fn is_active(&self) -> bool {
        self.receiver.is_some()
    }
}

/// Profile document returned by the provider's account endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderProfile {
    pub id: Option<String>,
    pub username: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// Everything the session coordinator needs from an identity provider SDK.
#[async_trait]
pub trait IdentityClient: Send + Sync {
    /// Runs the provider handshake and reports whether a session exists.
    async fn init(&self, options: InitOptions) -> Result<bool, AuthError>;

    /// Starts an interactive login. Completion is reported through events.
    async fn login(&self, redirect_uri: &str) -> Result<(), AuthError>;

    /// Ends the local and provider session and emits [`AuthEvent::AuthLogout`].
    async fn logout(&self, redirect_uri: &str) -> Result<(), AuthError>;

    async fn load_user_profile(&self) -> Result<ProviderProfile, AuthError>;

    /// Refreshes the access token if it expires within `min_validity` seconds.
    /// Returns whether a refresh happened.
    async fn update_token(&self, min_validity: u64) -> Result<bool, AuthError>;

    fn token_claims(&self) -> Option<TokenClaims>;

    fn realm_roles(&self) -> Vec<String> {
        self.token_claims()
            .map(|claims| claims.realm_roles())
            .unwrap_or_default()
    }

    fn is_authenticated(&self) -> bool;

    fn subscribe(&self) -> EventSubscription;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn callback_location_forces_interactive_mode() {
        let location = Url::parse("http://localhost:3000/dashboard?code=abc&state=xyz").unwrap();
        let options = InitOptions::for_location(&location, "http://localhost:3000/dashboard");

        assert_eq!(options.on_load, OnLoad::LoginRequired);
        assert_eq!(options.pkce_method, "S256");
        assert!(!options.check_login_iframe);
        assert_eq!(options.callback.unwrap().code, "abc");
    }

    #[test]
    fn plain_location_checks_silently() {
        let location = Url::parse("http://localhost:3000/login").unwrap();
        let options = InitOptions::for_location(&location, "http://localhost:3000/dashboard");

        assert_eq!(options.on_load, OnLoad::CheckSso);
        assert!(options.callback.is_none());
    }

    #[tokio::test]
    async fn unsubscribed_listener_stops_receiving() {
        let bus = EventBus::new();
        let mut subscription = bus.subscribe();

        bus.emit(AuthEvent::AuthLogout);
        assert_eq!(subscription.next().await, Some(AuthEvent::AuthLogout));

        subscription.unsubscribe();
        bus.emit(AuthEvent::TokenExpired);
        assert!(!subscription.is_active());
        assert_eq!(subscription.next().await, None);
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn dropping_subscription_tears_down() {
        let bus = EventBus::new();
        {
            let _subscription = bus.subscribe();
            assert_eq!(bus.subscriber_count(), 1);
        }
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn profile_uses_camel_case_fields() {
        let profile: ProviderProfile = serde_json::from_str(
            r#"{"id":"1","username":"ada","firstName":"Ada","lastName":"Lovelace","email":"a@b.c","emailVerified":true}"#,
        )
        .unwrap();
        assert_eq!(profile.first_name.as_deref(), Some("Ada"));
        assert_eq!(profile.last_name.as_deref(), Some("Lovelace"));
    }
}
