//! HTTP request handlers (route handlers).
//!
//! Every handler receives the [`DataLayer`](crate::db::supervisor::DataLayer)
//! as shared state and never constructs a pool of its own.

/// Liveness and database connectivity
pub mod health;
/// Data layer status
pub mod status;
