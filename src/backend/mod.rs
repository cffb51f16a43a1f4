//! Backend of the application: identity provider access and session state.

pub mod auth;
pub mod session;
pub mod utils;
