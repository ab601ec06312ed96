use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Returns a simple status object with service version and scorer mode.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    let remote = state.evaluator.remote_enabled();
    let scorer = if remote { "remote_ai" } else { "local_heuristic" };
    let remote_timeout_secs = remote.then(|| state.config.remote_timeout.as_secs());
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "grader",
        "scorer": scorer,
        "remote_timeout_secs": remote_timeout_secs,
        "units": state.evaluator.catalogue().units.len()
    }))
}
