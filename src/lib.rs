//! Data layer for the starter web app.
//!
//! The interesting part is [`db::supervisor`]: it owns the lifecycle of the
//! PostgreSQL connection pool and behaves differently in development (pool
//! survives reloads), test (fresh pool per process, torn down explicitly) and
//! production (pool drained before the host suspends the instance).

pub mod app;
pub mod config;
pub mod context;
pub mod db;
pub mod error;
pub mod handlers;
