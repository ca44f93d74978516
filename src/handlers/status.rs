//! Data layer status endpoint.
//!
//! Reports how the pool was set up without touching the database, so it stays
//! useful while the database is down.

use crate::{
    context::ExecutionContext,
    db::{PoolStatus, policy::PoolSizingParams, supervisor::DataLayer},
};
use axum::{Json, extract::State};
use serde::Serialize;

/// Status response.
///
/// ```json
/// {
///   "context": "production",
///   "sizing": { "max_connections": 10, "idle_timeout_ms": 5000 },
///   "pool": { "size": 2, "idle": 1, "max_connections": 10, "closed": false },
///   "reused": false
/// }
/// ```
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub context: ExecutionContext,
    pub sizing: PoolSizingParams,
    pub pool: PoolStatus,

    /// Whether this pool was served from the development cache
    pub reused: bool,
}

pub async fn data_layer_status(State(layer): State<DataLayer>) -> Json<StatusResponse> {
    Json(StatusResponse {
        context: layer.context,
        sizing: layer.sizing,
        pool: layer.db.status(),
        reused: layer.reused,
    })
}
