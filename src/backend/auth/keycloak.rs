//! Keycloak implementation of [`IdentityClient`].
//!
//! Runs the OpenID Connect authorization-code flow with PKCE: the login page is
//! opened in the system browser and the provider redirects back to a loopback
//! listener on the configured redirect origin. Tokens live in memory only.

use async_trait::async_trait;
use serde::Deserialize;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::task::JoinHandle;

use super::callback::{CALLBACK_TIMEOUT, CallbackListener};
use super::client::{
    AuthEvent, EventBus, EventSubscription, IdentityClient, InitOptions, OnLoad, ProviderProfile,
};
use super::error::AuthError;
use super::pkce::{CHALLENGE_METHOD, Pkce, random_token};
use super::token::{TokenClaims, TokenResponse, TokenSet};
use crate::backend::utils::config::ProviderConfig;

/// Opens a URL in the user's browser.
pub type BrowserOpener = Arc<dyn Fn(&str) -> Result<(), String> + Send + Sync>;

/// Endpoints advertised by the realm's discovery document.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Endpoints {
    pub authorization_endpoint: String,
    pub token_endpoint: String,
    #[serde(default)]
    pub end_session_endpoint: Option<String>,
}

/// Login started by this process and not finished yet.
#[derive(Debug, Clone)]
struct PendingLogin {
    state: String,
    pkce: Pkce,
    redirect_uri: String,
}

impl PendingLogin {
    fn new(redirect_uri: &str) -> Self {
        Self {
            state: random_token(),
            pkce: Pkce::generate(),
            redirect_uri: redirect_uri.to_string(),
        }
    }
}

struct Inner {
    config: ProviderConfig,
    http: reqwest::Client,
    events: EventBus,
    opener: BrowserOpener,
    endpoints: Mutex<Option<Endpoints>>,
    tokens: Mutex<Option<TokenSet>>,
    pending: Mutex<Option<PendingLogin>>,
    expiry_timer: Mutex<Option<JoinHandle<()>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}

#[derive(Clone)]
pub struct KeycloakClient {
    inner: Arc<Inner>,
}

impl KeycloakClient {
    pub fn new(config: ProviderConfig) -> Self {
        Self::with_opener(
            config,
            Arc::new(|url: &str| webbrowser::open(url).map_err(|e| e.to_string())),
        )
    }

    pub fn with_opener(config: ProviderConfig, opener: BrowserOpener) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            inner: Arc::new(Inner {
                config,
                http,
                events: EventBus::new(),
                opener,
                endpoints: Mutex::new(None),
                tokens: Mutex::new(None),
                pending: Mutex::new(None),
                expiry_timer: Mutex::new(None),
            }),
        }
    }

    pub fn has_token(&self) -> bool {
        lock(&self.inner.tokens).is_some()
    }

    /// Registers a new pending login and returns the provider URL to open.
    #[cfg(test)]
    pub async fn authorization_url(&self, redirect_uri: &str) -> Result<String, AuthError> {
        let endpoints = self.inner.endpoints().await?;
        let pending = PendingLogin::new(redirect_uri);
        let url = build_authorization_url(&endpoints, &self.inner.config, &pending, &random_token());
        *lock(&self.inner.pending) = Some(pending);
        Ok(url)
    }
}

/// Builds the authorization request URL.
fn build_authorization_url(
    endpoints: &Endpoints,
    config: &ProviderConfig,
    pending: &PendingLogin,
    nonce: &str,
) -> String {
    let params = [
        ("client_id", config.client_id.as_str()),
        ("redirect_uri", pending.redirect_uri.as_str()),
        ("state", pending.state.as_str()),
        ("response_mode", "query"),
        ("response_type", "code"),
        ("scope", "openid"),
        ("nonce", nonce),
        ("code_challenge", pending.pkce.challenge.as_str()),
        ("code_challenge_method", CHALLENGE_METHOD),
    ];

    let query: String = url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(params)
        .finish();

    let separator = if endpoints.authorization_endpoint.contains('?') {
        '&'
    } else {
        '?'
    };
    format!("{}{separator}{query}", endpoints.authorization_endpoint)
}

/// Builds the end-session URL.
fn build_logout_url(
    end_session_endpoint: &str,
    config: &ProviderConfig,
    redirect_uri: &str,
    id_token: Option<&str>,
) -> String {
    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    serializer.append_pair("client_id", &config.client_id);
    serializer.append_pair("post_logout_redirect_uri", redirect_uri);
    if let Some(id_token) = id_token {
        serializer.append_pair("id_token_hint", id_token);
    }
    format!("{end_session_endpoint}?{}", serializer.finish())
}

impl Inner {
    async fn endpoints(&self) -> Result<Endpoints, AuthError> {
        if let Some(endpoints) = lock(&self.endpoints).clone() {
            return Ok(endpoints);
        }

        let url = self.config.discovery_url();
        log::info!("Fetching OpenID configuration from {url}");
        let response = self.http.get(&url).send().await?;
        let endpoints: Endpoints = Self::json_or_error(response).await?;

        *lock(&self.endpoints) = Some(endpoints.clone());
        Ok(endpoints)
    }

    async fn json_or_error<T>(response: reqwest::Response) -> Result<T, AuthError>
    where
        T: serde::de::DeserializeOwned,
    {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AuthError::Http {
                status: status.as_u16(),
                body,
            });
        }
        response
            .json()
            .await
            .map_err(|e| AuthError::MalformedResponse(e.to_string()))
    }

    async fn token_request(&self, form: &[(&str, &str)]) -> Result<TokenSet, AuthError> {
        let endpoints = self.endpoints().await?;
        let response = self
            .http
            .post(&endpoints.token_endpoint)
            .form(form)
            .send()
            .await?;
        let token_response: TokenResponse = Self::json_or_error(response).await?;
        TokenSet::from_response(token_response)
    }

    async fn exchange_code(&self, code: &str, pending: &PendingLogin) -> Result<TokenSet, AuthError> {
        self.token_request(&[
            ("grant_type", "authorization_code"),
            ("client_id", &self.config.client_id),
            ("code", code),
            ("redirect_uri", &pending.redirect_uri),
            ("code_verifier", &pending.pkce.verifier),
        ])
        .await
    }

    /// Binds the callback listener, records a pending login, and opens the
    /// provider's login page in the browser.
    async fn begin_login(
        &self,
        redirect_uri: &str,
    ) -> Result<(CallbackListener, PendingLogin), AuthError> {
        let endpoints = self.endpoints().await?;
        let listener = CallbackListener::bind(redirect_uri).await?;

        let pending = PendingLogin::new(redirect_uri);
        let url = build_authorization_url(&endpoints, &self.config, &pending, &random_token());
        *lock(&self.pending) = Some(pending.clone());

        log::info!("Opening browser for Keycloak login");
        (self.opener)(&url).map_err(AuthError::Browser)?;
        Ok((listener, pending))
    }

    /// Waits for the browser to come back and exchanges the code.
    async fn finish_login(
        &self,
        listener: CallbackListener,
        pending: &PendingLogin,
    ) -> Result<TokenSet, AuthError> {
        let code = listener.wait_for_code(&pending.state, CALLBACK_TIMEOUT).await;
        lock(&self.pending).take();
        self.exchange_code(&code?, pending).await
    }

    async fn interactive_login(&self, redirect_uri: &str) -> Result<TokenSet, AuthError> {
        let (listener, pending) = self.begin_login(redirect_uri).await?;
        self.finish_login(listener, &pending).await
    }

    fn set_tokens(self: &Arc<Self>, tokens: TokenSet) {
        let seconds_left = tokens.seconds_left();
        *lock(&self.tokens) = Some(tokens);
        self.schedule_expiry(seconds_left);
    }

    fn clear_tokens(&self) -> Option<TokenSet> {
        if let Some(timer) = lock(&self.expiry_timer).take() {
            timer.abort();
        }
        lock(&self.tokens).take()
    }

    /// Emits [`AuthEvent::TokenExpired`] when the current access token runs out.
    fn schedule_expiry(self: &Arc<Self>, seconds_left: u64) {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            log::warn!("No async runtime, token expiry will not be reported");
            return;
        };

        let weak = Arc::downgrade(self);
        let timer = handle.spawn(async move {
            tokio::time::sleep(Duration::from_secs(seconds_left)).await;
            if let Some(inner) = weak.upgrade() {
                inner.events.emit(AuthEvent::TokenExpired);
            }
        });

        if let Some(previous) = lock(&self.expiry_timer).replace(timer) {
            previous.abort();
        }
    }
}

#[async_trait]
impl IdentityClient for KeycloakClient {
    async fn init(&self, options: InitOptions) -> Result<bool, AuthError> {
        log::info!(
            "Keycloak init: onLoad={:?} pkce={} checkLoginIframe={}",
            options.on_load,
            options.pkce_method,
            options.check_login_iframe
        );

        // Discovery doubles as the reachability check
        self.inner.endpoints().await?;

        match options.on_load {
            OnLoad::CheckSso => Ok(lock(&self.inner.tokens)
                .as_ref()
                .is_some_and(|tokens| !tokens.is_expired())),
            OnLoad::LoginRequired => {
                let pending = lock(&self.inner.pending).clone();
                let tokens = match (options.callback, pending) {
                    (Some(callback), Some(pending)) if callback.state == pending.state => {
                        lock(&self.inner.pending).take();
                        self.inner.exchange_code(&callback.code, &pending).await?
                    }
                    (Some(_), _) => {
                        log::warn!("Callback state does not belong to this session, starting a new login");
                        self.inner.interactive_login(&options.redirect_uri).await?
                    }
                    (None, _) => self.inner.interactive_login(&options.redirect_uri).await?,
                };
                self.inner.set_tokens(tokens);
                Ok(true)
            }
        }
    }

    async fn login(&self, redirect_uri: &str) -> Result<(), AuthError> {
        let (listener, pending) = self.inner.begin_login(redirect_uri).await?;

        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            match inner.finish_login(listener, &pending).await {
                Ok(tokens) => {
                    inner.set_tokens(tokens);
                    inner.events.emit(AuthEvent::AuthSuccess);
                }
                Err(e) => {
                    log::error!("Login failed: {e}");
                    inner.events.emit(AuthEvent::AuthError(e.to_string()));
                }
            }
        });

        Ok(())
    }

    async fn logout(&self, redirect_uri: &str) -> Result<(), AuthError> {
        let tokens = self.inner.clear_tokens();
        let end_session = self
            .inner
            .endpoints()
            .await
            .ok()
            .and_then(|endpoints| endpoints.end_session_endpoint);

        self.inner.events.emit(AuthEvent::AuthLogout);

        if let Some(endpoint) = end_session {
            let id_token = tokens.as_ref().and_then(|t| t.id_token.as_deref());
            let url = build_logout_url(&endpoint, &self.inner.config, redirect_uri, id_token);
            (self.inner.opener)(&url).map_err(AuthError::Browser)?;
        } else {
            log::warn!("Provider advertises no end-session endpoint, logged out locally only");
        }
        Ok(())
    }

    async fn load_user_profile(&self) -> Result<ProviderProfile, AuthError> {
        let access_token = lock(&self.inner.tokens)
            .as_ref()
            .map(|tokens| tokens.access_token.clone())
            .ok_or(AuthError::NotAuthenticated)?;

        let response = self
            .inner
            .http
            .get(self.inner.config.account_url())
            .bearer_auth(access_token)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;
        Inner::json_or_error(response).await
    }

    async fn update_token(&self, min_validity: u64) -> Result<bool, AuthError> {
        let refresh_token = {
            let tokens = lock(&self.inner.tokens);
            let tokens = tokens.as_ref().ok_or(AuthError::NotAuthenticated)?;
            if !tokens.expires_within(min_validity) {
                return Ok(false);
            }
            tokens.refresh_token.clone()
        };

        let result = match refresh_token {
            Some(refresh_token) => {
                self.inner
                    .token_request(&[
                        ("grant_type", "refresh_token"),
                        ("client_id", &self.inner.config.client_id),
                        ("refresh_token", &refresh_token),
                    ])
                    .await
            }
            None => Err(AuthError::NoRefreshToken),
        };

        match result {
            Ok(tokens) => {
                self.inner.set_tokens(tokens);
                self.inner.events.emit(AuthEvent::AuthRefreshSuccess);
                Ok(true)
            }
            Err(e) => {
                log::warn!("Token refresh failed: {e}");
                self.inner.clear_tokens();
                self.inner.events.emit(AuthEvent::AuthRefreshError);
                Err(e)
            }
        }
    }

    fn token_claims(&self) -> Option<TokenClaims> {
        lock(&self.inner.tokens)
            .as_ref()
            .map(|tokens| tokens.claims.clone())
    }

    fn is_authenticated(&self) -> bool {
        self.has_token()
    }

    fn subscribe(&self) -> EventSubscription {
        self.inner.events.subscribe()
    }
}
