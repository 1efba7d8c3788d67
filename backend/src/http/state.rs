//! Application state for the HTTP server.

use std::sync::Arc;

use crate::bus::EventBus;
use crate::severity::{RecordSink, SeverityScanner};

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Channel the upload endpoint publishes to
    pub bus: Arc<dyn EventBus>,
    /// Severity records served by the API
    pub sink: Arc<dyn RecordSink>,
    /// On-demand scanner; `None` when no disease table is configured
    pub scanner: Option<SeverityScanner>,
}

impl AppState {
    pub fn new(bus: Arc<dyn EventBus>, sink: Arc<dyn RecordSink>) -> Self {
        Self {
            bus,
            sink,
            scanner: None,
        }
    }

    /// Enable `POST /v1/severity/scan`.
    pub fn with_scanner(mut self, scanner: SeverityScanner) -> Self {
        self.scanner = Some(scanner);
        self
    }
}
