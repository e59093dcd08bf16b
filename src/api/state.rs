use std::sync::Arc;

use crate::services::{CatalogProvider, SuggestionService};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<dyn CatalogProvider>,
    pub suggestions: Arc<SuggestionService>,
}

impl AppState {
    /// Creates application state around a catalog provider
    pub fn new(catalog: Arc<dyn CatalogProvider>) -> Self {
        let suggestions = Arc::new(SuggestionService::new(Arc::clone(&catalog)));
        Self {
            catalog,
            suggestions,
        }
    }
}
