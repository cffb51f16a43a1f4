//! Identity provider integration.

pub mod callback;
pub mod client;
pub mod error;
pub mod keycloak;
pub mod pkce;
pub mod token;

pub use client::{AuthEvent, EventSubscription, IdentityClient, InitOptions, OnLoad, ProviderProfile};
pub use error::AuthError;
pub use keycloak::KeycloakClient;
pub use token::TokenClaims;
