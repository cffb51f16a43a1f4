//! The session coordinator: the single authority for who is signed in.

use std::sync::Arc;
use url::Url;

use super::profile;
use super::redirect::{DASHBOARD_PATH, Navigator, RouteKind, redirect_target};
use super::reducer::{AUTH_FAILED_MESSAGE, SessionAction, SessionStore};
use crate::backend::auth::{AuthError, AuthEvent, EventSubscription, IdentityClient, InitOptions};
use crate::backend::utils::config::AppConfig;

/// Minimum validity requested when renewing an expired token, in seconds.
pub const TOKEN_RENEWAL_WINDOW_SECS: u64 = 30;

pub struct SessionCoordinator<C: ?Sized, N> {
    client: Arc<C>,
    store: SessionStore,
    navigator: N,
    login_redirect_uri: String,
    logout_redirect_uri: String,
}

impl<C, N> SessionCoordinator<C, N>
where
    C: IdentityClient + ?Sized,
    N: Navigator,
{
    pub fn new(client: Arc<C>, store: SessionStore, navigator: N, config: &AppConfig) -> Self {
        Self {
            client,
            store,
            navigator,
            login_redirect_uri: config.dashboard_redirect_uri(),
            logout_redirect_uri: config.origin().to_string(),
        }
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    pub fn client(&self) -> &Arc<C> {
        &self.client
    }

    /// Runs the provider handshake for this launch. Returns the event subscription
    /// on success; a failed handshake leaves the session in the error phase and
    /// registers nothing.
    pub async fn initialize(&self, location: &Url) -> Option<EventSubscription> {
        log::info!("=== INITIALIZING KEYCLOAK ===");
        log::info!("Launch location: {location}");
        self.store.dispatch(SessionAction::Connecting);

        let options = InitOptions::for_location(location, self.login_redirect_uri.clone());
        log::info!("Is callback URL: {}", options.callback.is_some());

        match self.client.init(options).await {
            Ok(true) => {
                log::info!("User is authenticated, loading profile...");
                let user = profile::resolve(self.client.as_ref()).await;
                self.store.dispatch(SessionAction::InitSucceeded(Some(user)));
            }
            Ok(false) => {
                log::info!("User not authenticated");
                self.store.dispatch(SessionAction::InitSucceeded(None));
            }
            Err(e) => {
                log::error!("=== KEYCLOAK INIT FAILED === {e}");
                self.store.dispatch(SessionAction::InitFailed(e.to_string()));
                return None;
            }
        }

        self.enforce_route();
        Some(self.client.subscribe())
    }

    /// Clears a failed handshake and runs it again.
    pub async fn retry(&self, location: &Url) -> Option<EventSubscription> {
        self.store.dispatch(SessionAction::Retry);
        self.initialize(location).await
    }

    /// Applies the redirect policy to the current route. Returns the path navigated
    /// to, if any.
    pub fn enforce_route(&self) -> Option<&'static str> {
        let session = self.store.snapshot();
        let current = self.navigator.current_path();
        let target = redirect_target(session.authenticated, session.phase, &current)?;

        log::info!("Redirecting from {current} to {target}");
        self.navigator.replace(target);
        Some(target)
    }

    async fn sign_in(&self) {
        let user = profile::resolve(self.client.as_ref()).await;
        self.store.dispatch(SessionAction::Authenticated(user));
    }

    /// Reacts to one identity client event.
    pub async fn handle_event(&self, event: AuthEvent) {
        match event {
            AuthEvent::AuthSuccess => {
                log::info!("=== AUTH SUCCESS EVENT ===");
                self.sign_in().await;
                if RouteKind::of(&self.navigator.current_path()) != RouteKind::Dashboard {
                    self.navigator.replace(DASHBOARD_PATH);
                }
            }
            AuthEvent::AuthError(detail) => {
                log::error!("=== AUTH ERROR EVENT === {detail}");
                self.store
                    .dispatch(SessionAction::AuthFailed(AUTH_FAILED_MESSAGE.to_string()));
            }
            AuthEvent::AuthLogout => {
                log::info!("=== AUTH LOGOUT EVENT ===");
                self.store.dispatch(SessionAction::LoggedOut);
            }
            AuthEvent::TokenExpired => {
                log::info!("=== TOKEN EXPIRED EVENT ===");
                if let Err(e) = self.client.update_token(TOKEN_RENEWAL_WINDOW_SECS).await {
                    log::info!("Token refresh failed, logging out: {e}");
                    self.store.dispatch(SessionAction::LoggedOut);
                }
            }
            AuthEvent::AuthRefreshError => {
                log::warn!("Token refresh error reported, ending session");
                self.store.dispatch(SessionAction::LoggedOut);
            }
            AuthEvent::AuthRefreshSuccess => {
                log::debug!("Token refreshed");
            }
        }

        self.enforce_route();
    }

    /// Handles events until the subscription ends.
    pub async fn run_events(&self, mut subscription: EventSubscription) {
        log::info!("Setting up Keycloak event listeners...");
        while let Some(event) = subscription.next().await {
            self.handle_event(event).await;
        }
        log::debug!("Keycloak event listener stopped");
    }

    /// Brings local state back in line with the identity client's own flag.
    /// Returns whether anything changed.
    pub async fn reconcile(&self) -> bool {
        let live = self.client.is_authenticated();
        let local = self.store.snapshot().authenticated;
        log::info!("=== MANUAL AUTH CHECK === client={live} local={local}");

        let changed = match (live, local) {
            (true, false) => {
                log::info!("Client says authenticated but local state says not, fixing");
                self.sign_in().await;
                true
            }
            (false, true) => {
                log::info!("Client session is gone but local state says authenticated, fixing");
                self.store.dispatch(SessionAction::LoggedOut);
                true
            }
            _ => false,
        };

        if changed {
            self.enforce_route();
        }
        changed
    }

    /// Starts an interactive login. The outcome arrives as an event.
    pub async fn login(&self) -> Result<(), AuthError> {
        log::info!("=== LOGIN REQUESTED ===");
        self.client
            .login(&self.login_redirect_uri)
            .await
            .inspect_err(|e| log::error!("Login failed: {e}"))
    }

    pub async fn logout(&self) -> Result<(), AuthError> {
        log::info!("=== LOGOUT REQUESTED ===");
        self.client
            .logout(&self.logout_redirect_uri)
            .await
            .inspect_err(|e| log::error!("Logout failed: {e}"))
    }

    pub fn dismiss_error(&self) {
        self.store.dispatch(SessionAction::DismissError);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::auth::client::EventBus;
    use crate::backend::auth::{OnLoad, ProviderProfile, TokenClaims};
    use crate::backend::session::redirect::LOGIN_PATH;
    use crate::backend::session::state::LoadingPhase;
    use async_trait::async_trait;
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    struct FakeClient {
        init_result: Result<bool, AuthError>,
        profile_result: Result<ProviderProfile, AuthError>,
        renewal_result: Result<bool, AuthError>,
        claims: TokenClaims,
        live: AtomicBool,
        profile_fetches: AtomicUsize,
        init_options: Mutex<Vec<InitOptions>>,
        events: EventBus,
    }

    impl FakeClient {
        fn new(init_result: Result<bool, AuthError>) -> Self {
            Self {
                live: AtomicBool::new(matches!(init_result, Ok(true))),
                init_result,
                profile_result: Ok(ProviderProfile {
                    username: Some("ada".into()),
                    first_name: Some("Ada".into()),
                    last_name: Some("Lovelace".into()),
                    ..ProviderProfile::default()
                }),
                renewal_result: Ok(true),
                claims: TokenClaims {
                    name: Some("Token Ada".into()),
                    ..TokenClaims::default()
                },
                profile_fetches: AtomicUsize::new(0),
                init_options: Mutex::new(Vec::new()),
                events: EventBus::new(),
            }
        }
    }

    #[async_trait]
    impl IdentityClient for FakeClient {
        async fn init(&self, options: InitOptions) -> Result<bool, AuthError> {
            self.init_options.lock().unwrap().push(options);
            self.init_result.clone()
        }

        async fn login(&self, _redirect_uri: &str) -> Result<(), AuthError> {
            Ok(())
        }

        async fn logout(&self, _redirect_uri: &str) -> Result<(), AuthError> {
            self.live.store(false, Ordering::SeqCst);
            self.events.emit(AuthEvent::AuthLogout);
            Ok(())
        }

        async fn load_user_profile(&self) -> Result<ProviderProfile, AuthError> {
            self.profile_fetches.fetch_add(1, Ordering::SeqCst);
            self.profile_result.clone()
        }

        async fn update_token(&self, _min_validity: u64) -> Result<bool, AuthError> {
            self.renewal_result.clone()
        }

        fn token_claims(&self) -> Option<TokenClaims> {
            Some(self.claims.clone())
        }

        fn is_authenticated(&self) -> bool {
            self.live.load(Ordering::SeqCst)
        }

        fn subscribe(&self) -> EventSubscription {
            self.events.subscribe()
        }
    }

    #[derive(Clone, Default)]
    struct FakeRouter {
        path: Rc<RefCell<String>>,
        replaced: Rc<RefCell<Vec<String>>>,
    }

    impl FakeRouter {
        fn at(path: &str) -> Self {
            let router = Self::default();
            *router.path.borrow_mut() = path.to_string();
            router
        }

        fn navigations(&self) -> Vec<String> {
            self.replaced.borrow().clone()
        }
    }

    impl Navigator for FakeRouter {
        fn current_path(&self) -> String {
            self.path.borrow().clone()
        }

        fn replace(&self, path: &str) {
            *self.path.borrow_mut() = path.to_string();
            self.replaced.borrow_mut().push(path.to_string());
        }
    }

    fn coordinator(
        client: FakeClient,
        path: &str,
    ) -> (SessionCoordinator<FakeClient, FakeRouter>, FakeRouter) {
        let router = FakeRouter::at(path);
        let coordinator = SessionCoordinator::new(
            Arc::new(client),
            SessionStore::new(),
            router.clone(),
            &AppConfig::default(),
        );
        (coordinator, router)
    }

    fn location(url: &str) -> Url {
        Url::parse(url).unwrap()
    }

    #[tokio::test]
    async fn callback_location_selects_interactive_mode() {
        let (coordinator, _) = coordinator(FakeClient::new(Ok(true)), "/dashboard");

        coordinator
            .initialize(&location("http://localhost:3000/dashboard?code=abc&state=xyz"))
            .await;

        let options = coordinator.client().init_options.lock().unwrap();
        assert_eq!(options[0].on_load, OnLoad::LoginRequired);
        assert_eq!(options[0].pkce_method, "S256");
        assert!(!options[0].check_login_iframe);
    }

    #[tokio::test]
    async fn silent_check_without_session_skips_profile() {
        let (coordinator, router) = coordinator(FakeClient::new(Ok(false)), "/login");

        let subscription = coordinator
            .initialize(&location("http://localhost:3000/login"))
            .await;

        let session = coordinator.store().snapshot();
        assert!(subscription.is_some());
        assert!(!session.authenticated);
        assert_eq!(session.phase, LoadingPhase::Ready);
        assert_eq!(coordinator.client().profile_fetches.load(Ordering::SeqCst), 0);
        assert_eq!(
            coordinator.client().init_options.lock().unwrap()[0].on_load,
            OnLoad::CheckSso
        );
        assert!(router.navigations().is_empty());
    }

    #[tokio::test]
    async fn authenticated_launch_on_root_goes_to_dashboard() {
        let (coordinator, router) = coordinator(FakeClient::new(Ok(true)), "/");

        coordinator.initialize(&location("http://localhost:3000/")).await;

        let session = coordinator.store().snapshot();
        assert!(session.authenticated);
        assert_eq!(session.display_name(), Some("Ada Lovelace"));
        assert_eq!(router.navigations(), vec![DASHBOARD_PATH]);
    }

    #[tokio::test]
    async fn unauthenticated_viewer_on_dashboard_is_sent_to_login() {
        let (coordinator, router) = coordinator(FakeClient::new(Ok(false)), "/dashboard");

        coordinator
            .initialize(&location("http://localhost:3000/dashboard"))
            .await;

        assert_eq!(router.navigations(), vec![LOGIN_PATH]);
    }

    #[tokio::test]
    async fn init_failure_is_terminal_and_registers_nothing() {
        let client = FakeClient::new(Err(AuthError::Network("connection refused".into())));
        let (coordinator, router) = coordinator(client, "/dashboard");

        let subscription = coordinator
            .initialize(&location("http://localhost:3000/dashboard"))
            .await;

        let session = coordinator.store().snapshot();
        assert!(subscription.is_none());
        assert_eq!(session.phase, LoadingPhase::Error);
        assert!(!session.is_loading());
        assert!(session.last_error.unwrap().contains("connection refused"));
        assert_eq!(coordinator.client().events.subscriber_count(), 0);
        assert!(router.navigations().is_empty());
    }

    #[tokio::test]
    async fn profile_failure_falls_back_to_claims() {
        let mut client = FakeClient::new(Ok(true));
        client.profile_result = Err(AuthError::Http {
            status: 403,
            body: String::new(),
        });
        let (coordinator, _) = coordinator(client, "/dashboard");

        coordinator
            .initialize(&location("http://localhost:3000/dashboard"))
            .await;

        let session = coordinator.store().snapshot();
        assert!(session.authenticated);
        assert_eq!(session.display_name(), Some("Token Ada"));
        assert!(session.last_error.is_none());
    }

    #[tokio::test]
    async fn auth_success_on_login_resolves_profile_and_redirects() {
        let client = FakeClient::new(Ok(false));
        let (coordinator, router) = coordinator(client, "/login");
        coordinator.initialize(&location("http://localhost:3000/login")).await;

        coordinator.client().live.store(true, Ordering::SeqCst);
        coordinator.handle_event(AuthEvent::AuthSuccess).await;

        let session = coordinator.store().snapshot();
        assert!(session.authenticated);
        assert_eq!(session.display_name(), Some("Ada Lovelace"));
        assert_eq!(coordinator.client().profile_fetches.load(Ordering::SeqCst), 1);
        assert_eq!(router.navigations(), vec![DASHBOARD_PATH]);
    }

    #[tokio::test]
    async fn auth_error_clears_user_and_shows_message() {
        let (coordinator, router) = coordinator(FakeClient::new(Ok(true)), "/dashboard");
        coordinator
            .initialize(&location("http://localhost:3000/dashboard"))
            .await;

        coordinator
            .handle_event(AuthEvent::AuthError("invalid_grant".into()))
            .await;

        let session = coordinator.store().snapshot();
        assert!(!session.authenticated);
        assert!(session.user.is_none());
        assert_eq!(session.last_error.as_deref(), Some(AUTH_FAILED_MESSAGE));
        assert_eq!(router.navigations(), vec![LOGIN_PATH]);
    }

    #[tokio::test]
    async fn failed_renewal_is_a_logout() {
        let mut client = FakeClient::new(Ok(true));
        client.renewal_result = Err(AuthError::NoRefreshToken);
        let (coordinator, router) = coordinator(client, "/dashboard");
        coordinator
            .initialize(&location("http://localhost:3000/dashboard"))
            .await;

        coordinator.handle_event(AuthEvent::TokenExpired).await;

        let session = coordinator.store().snapshot();
        assert!(!session.authenticated);
        assert!(session.user.is_none());
        assert!(session.last_error.is_none());
        assert_eq!(router.navigations(), vec![LOGIN_PATH]);
    }

    #[tokio::test]
    async fn refresh_error_is_a_logout() {
        let (coordinator, router) = coordinator(FakeClient::new(Ok(true)), "/dashboard");
        coordinator
            .initialize(&location("http://localhost:3000/dashboard"))
            .await;

        coordinator.handle_event(AuthEvent::AuthRefreshError).await;

        let session = coordinator.store().snapshot();
        assert!(!session.authenticated);
        assert!(session.user.is_none());
        assert!(session.last_error.is_none());
        assert_eq!(router.navigations(), vec![LOGIN_PATH]);
    }

    #[tokio::test]
    async fn auth_success_on_dashboard_stays_put() {
        let (coordinator, router) = coordinator(FakeClient::new(Ok(true)), "/dashboard");
        coordinator
            .initialize(&location("http://localhost:3000/dashboard"))
            .await;

        coordinator.handle_event(AuthEvent::AuthSuccess).await;

        let session = coordinator.store().snapshot();
        assert!(session.authenticated);
        assert_eq!(session.display_name(), Some("Ada Lovelace"));
        assert_eq!(coordinator.client().profile_fetches.load(Ordering::SeqCst), 2);
        assert!(router.navigations().is_empty());
    }

    #[tokio::test]
    async fn successful_renewal_keeps_session() {
        let (coordinator, router) = coordinator(FakeClient::new(Ok(true)), "/dashboard");
        coordinator
            .initialize(&location("http://localhost:3000/dashboard"))
            .await;

        coordinator.handle_event(AuthEvent::TokenExpired).await;

        assert!(coordinator.store().snapshot().authenticated);
        assert!(router.navigations().is_empty());
    }

    #[tokio::test]
    async fn logout_event_flows_through_subscription() {
        let (coordinator, router) = coordinator(FakeClient::new(Ok(true)), "/dashboard");
        let mut subscription = coordinator
            .initialize(&location("http://localhost:3000/dashboard"))
            .await
            .unwrap();

        coordinator.logout().await.unwrap();
        let event = subscription.next().await.unwrap();
        coordinator.handle_event(event).await;

        let session = coordinator.store().snapshot();
        assert!(!session.authenticated);
        assert_eq!(router.navigations(), vec![LOGIN_PATH]);
    }

    #[tokio::test]
    async fn reconcile_repairs_drift_both_ways() {
        let (coordinator, router) = coordinator(FakeClient::new(Ok(false)), "/login");
        coordinator.initialize(&location("http://localhost:3000/login")).await;

        assert!(!coordinator.reconcile().await);

        coordinator.client().live.store(true, Ordering::SeqCst);
        assert!(coordinator.reconcile().await);
        assert!(coordinator.store().snapshot().authenticated);
        assert_eq!(router.navigations(), vec![DASHBOARD_PATH]);

        coordinator.client().live.store(false, Ordering::SeqCst);
        assert!(coordinator.reconcile().await);
        assert!(!coordinator.store().snapshot().authenticated);
        assert_eq!(router.navigations(), vec![DASHBOARD_PATH, LOGIN_PATH]);
    }

    #[tokio::test]
    async fn enforcing_a_correct_route_does_not_navigate() {
        let (coordinator, router) = coordinator(FakeClient::new(Ok(true)), "/dashboard");
        coordinator
            .initialize(&location("http://localhost:3000/dashboard"))
            .await;

        assert_eq!(coordinator.enforce_route(), None);
        assert_eq!(coordinator.enforce_route(), None);
        assert!(router.navigations().is_empty());
    }

    #[tokio::test]
    async fn retry_runs_the_handshake_again() {
        let client = FakeClient::new(Err(AuthError::Timeout));
        let (coordinator, _) = coordinator(client, "/login");
        coordinator.initialize(&location("http://localhost:3000/login")).await;

        coordinator.retry(&location("http://localhost:3000/login")).await;

        assert_eq!(coordinator.client().init_options.lock().unwrap().len(), 2);
        assert_eq!(coordinator.store().snapshot().phase, LoadingPhase::Error);
    }
}
