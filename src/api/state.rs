use std::sync::Arc;

use crate::artifacts::Artifacts;

/// Shared application state.
///
/// Artifacts are loaded before the router is built and never change, so
/// handlers read them without locking.
#[derive(Clone)]
pub struct AppState {
    pub artifacts: Arc<Artifacts>,
    pub default_recommendation_count: usize,
    pub default_word_limit: usize,
}

impl AppState {
    /// Wraps loaded artifacts with the request defaults
    pub fn new(
        artifacts: Artifacts,
        default_recommendation_count: usize,
        default_word_limit: usize,
    ) -> Self {
        Self {
            artifacts: Arc::new(artifacts),
            default_recommendation_count,
            default_word_limit,
        }
    }
}
