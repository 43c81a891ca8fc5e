use std::sync::Arc;

use crate::services::Recommender;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub recommender: Arc<Recommender>,
    /// List length used when a request does not ask for one
    pub default_top_n: usize,
}

impl AppState {
    pub fn new(recommender: Recommender, default_top_n: usize) -> Self {
        Self {
            recommender: Arc::new(recommender),
            default_top_n,
        }
    }
}
