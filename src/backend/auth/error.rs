//! Identity client errors.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Provider unreachable or the transport failed.
    Network(String),
    /// Provider answered with a non-success status.
    Http { status: u16, body: String },
    /// Provider answered with something we could not parse.
    MalformedResponse(String),
    MalformedToken(String),
    /// Callback `state` did not match the pending login.
    StateMismatch,
    /// Provider redirected back with an `error` parameter.
    Provider(String),
    /// Loopback callback listener failed.
    Callback(String),
    /// No callback arrived in time.
    Timeout,
    NotAuthenticated,
    NoRefreshToken,
    /// The system browser could not be opened.
    Browser(String),
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Network(msg) => write!(f, "Identity provider unreachable: {msg}"),
            Self::Http { status, body } => write!(f, "Identity provider returned HTTP {status}: {body}"),
            Self::MalformedResponse(msg) => write!(f, "Malformed provider response: {msg}"),
            Self::MalformedToken(msg) => write!(f, "Malformed token: {msg}"),
            Self::StateMismatch => write!(f, "Callback state does not match the pending login"),
            Self::Provider(msg) => write!(f, "Identity provider reported an error: {msg}"),
            Self::Callback(msg) => write!(f, "Callback listener failed: {msg}"),
            Self::Timeout => write!(f, "Timed out waiting for the login callback"),
            Self::NotAuthenticated => write!(f, "Not authenticated"),
            Self::NoRefreshToken => write!(f, "No refresh token available"),
            Self::Browser(msg) => write!(f, "Failed to open browser: {msg}"),
        }
    }
}

impl std::error::Error for AuthError {}

impl From<reqwest::Error> for AuthError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::MalformedResponse(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}

impl From<std::io::Error> for AuthError {
    fn from(err: std::io::Error) -> Self {
        Self::Callback(err.to_string())
    }
}
