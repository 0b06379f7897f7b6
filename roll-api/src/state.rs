use std::sync::Arc;

use roll_core::RollRepository;

/// Shared application state passed to all route handlers.
///
/// Holds the repository handle, opened once at process start and injected
/// into every handler through axum's `State` extractor; no handler touches
/// a global connection.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<dyn RollRepository>,
}

impl AppState {
    pub fn new(repo: Arc<dyn RollRepository>) -> Self {
        Self { repo }
    }
}
