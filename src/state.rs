//! Shared application state handed to every handler.

use std::sync::Arc;

use crate::store::StatusStore;

/// State shared by all handlers through axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn StatusStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn StatusStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &dyn StatusStore {
        self.store.as_ref()
    }
}
