use std::sync::Arc;

use crate::config::Config;
use crate::evaluation::Evaluator;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Read-only after startup; shared by every request.
    pub evaluator: Arc<Evaluator>,
    pub config: Config,
}
