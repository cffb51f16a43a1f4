//! Session state and the coordinator that drives it.

pub mod coordinator;
pub mod profile;
pub mod redirect;
pub mod reducer;
pub mod state;

pub use coordinator::SessionCoordinator;
pub use redirect::{DASHBOARD_PATH, LOGIN_PATH, Navigator, ROOT_PATH, redirect_target};
pub use reducer::{SessionAction, SessionStore};
pub use state::{LoadingPhase, Session, UserProfile};
