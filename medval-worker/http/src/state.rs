//! Application state for HTTP handlers.

use medval_core::processor::EventProcessor;
use std::sync::Arc;

/// State shared across all HTTP handlers.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Processor used for every incoming batch.
    pub processor: Arc<EventProcessor>,
}

impl AppState {
    pub fn new(processor: EventProcessor) -> Self {
        AppState {
            processor: Arc::new(processor),
        }
    }
}
