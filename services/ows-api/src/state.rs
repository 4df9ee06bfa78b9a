//! Application state and shared resources.

use std::sync::Arc;

use ows_common::MapConfig;
use ows_protocol::OwsDispatcher;

use crate::metrics::MetricsCollector;

/// Shared application state.
///
/// The map configuration is immutable once loaded; layer names were made
/// unique before it got here.
pub struct AppState {
    pub map: Arc<MapConfig>,
    pub dispatcher: Arc<OwsDispatcher>,
    pub metrics: Arc<MetricsCollector>,
    /// Port the server listens on, used when the Host header has none
    pub listen_port: u16,
}

impl AppState {
    pub fn new(map: MapConfig, listen_port: u16) -> Self {
        Self {
            map: Arc::new(map),
            dispatcher: Arc::new(OwsDispatcher::default()),
            metrics: Arc::new(MetricsCollector::new()),
            listen_port,
        }
    }
}
