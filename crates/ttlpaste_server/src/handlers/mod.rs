//! HTTP request handlers.

/// Store health endpoint.
pub mod health;
/// Paste create/view endpoints.
pub mod paste;
