use std::sync::Arc;

use crate::notifications::NotificationDispatcher;
use crate::pipeline::store::PipelineStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Postgres in production; swapped for the in-memory store in tests.
    pub store: Arc<dyn PipelineStore>,
    pub notifier: Arc<dyn NotificationDispatcher>,
}
