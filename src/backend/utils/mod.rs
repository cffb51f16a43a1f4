//! Utility modules for the backend.

/// Application configuration.
pub mod config;
/// Embedded stylesheets and images.
pub mod css;
