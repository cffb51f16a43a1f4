//! Session snapshot types.

use std::fmt;

/// Where the identity handshake stands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LoadingPhase {
    #[default]
    Initializing,
    Connecting,
    Ready,
    Error,
}

impl LoadingPhase {
    pub const fn is_loading(self) -> bool {
        matches!(self, Self::Initializing | Self::Connecting)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Initializing => "initializing",
            Self::Connecting => "connecting",
            Self::Ready => "ready",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for LoadingPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who is signed in. Replaced wholesale, never edited in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserProfile {
    pub name: String,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub roles: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub authenticated: bool,
    pub user: Option<UserProfile>,
    pub phase: LoadingPhase,
    pub last_error: Option<String>,
}

impl Session {
    pub const fn is_loading(&self) -> bool {
        self.phase.is_loading()
    }

    /// Display name of the signed-in user.
    pub fn display_name(&self) -> Option<&str> {
        self.user.as_ref().map(|user| user.name.as_str())
    }
}
