//! Session reducer and the store that owns session state.
//!
//! Every mutation is a [`SessionAction`] applied by [`reduce`]. The store is the
//! only place that calls it.

use tokio::sync::watch;

use super::state::{LoadingPhase, Session, UserProfile};

/// Message shown when the provider reports a runtime authentication error.
pub const AUTH_FAILED_MESSAGE: &str = "Authentication failed";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionAction {
    /// Handshake with the provider started.
    Connecting,
    /// Handshake finished. `Some` means authenticated.
    InitSucceeded(Option<UserProfile>),
    /// Handshake failed. Terminal until retried.
    InitFailed(String),
    /// Viewer is signed in as this user.
    Authenticated(UserProfile),
    AuthFailed(String),
    LoggedOut,
    DismissError,
    /// Start over after a failed handshake.
    Retry,
}

/// Applies one action. Only [`SessionAction::Authenticated`] and a successful
/// [`SessionAction::InitSucceeded`] set `authenticated`, and both carry the user.
pub fn reduce(session: &mut Session, action: SessionAction) {
    match action {
        SessionAction::Connecting => {
            session.phase = LoadingPhase::Connecting;
        }
        SessionAction::InitSucceeded(user) => {
            session.phase = LoadingPhase::Ready;
            session.authenticated = user.is_some();
            session.user = user;
        }
        SessionAction::InitFailed(message) => {
            session.phase = LoadingPhase::Error;
            session.authenticated = false;
            session.user = None;
            session.last_error = Some(message);
        }
        SessionAction::Authenticated(user) => {
            session.authenticated = true;
            session.user = Some(user);
            session.last_error = None;
            if session.phase.is_loading() {
                session.phase = LoadingPhase::Ready;
            }
        }
        SessionAction::AuthFailed(message) => {
            session.authenticated = false;
            session.user = None;
            session.last_error = Some(message);
        }
        SessionAction::LoggedOut => {
            session.authenticated = false;
            session.user = None;
            session.last_error = None;
        }
        SessionAction::DismissError => {
            session.last_error = None;
        }
        SessionAction::Retry => {
            *session = Session::default();
        }
    }
}

/// Owner of the session. Clones share the same state.
#[derive(Clone)]
pub struct SessionStore {
    sender: watch::Sender<Session>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            sender: watch::Sender::new(Session::default()),
        }
    }

    /// The single entry point for session mutations.
    pub fn dispatch(&self, action: SessionAction) {
        log::debug!("Session action: {action:?}");
        self.sender.send_modify(|session| reduce(session, action));
    }

    pub fn snapshot(&self) -> Session {
        self.sender.borrow().clone()
    }

    /// Receiver notified after every dispatch.
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.sender.subscribe()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}
