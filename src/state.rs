//! Shared backend state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor. It
//! only holds the image generator; the backend keeps no per-page state, all
//! of that lives in the client-side illustration manager.

use std::sync::Arc;

use crate::imagegen::ImageGenerator;

/// Shared application state. Clone is required by Axum.
#[derive(Clone)]
pub struct AppState {
    /// `None` when the provider is not configured; generation answers 503.
    pub generator: Option<Arc<dyn ImageGenerator>>,
}

impl AppState {
    #[must_use]
    pub fn new(generator: Option<Arc<dyn ImageGenerator>>) -> Self {
        Self { generator }
    }
}
