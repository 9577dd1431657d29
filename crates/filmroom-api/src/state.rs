//! Application state shared across handlers.

use filmroom_core::Config;
use filmroom_processing::IngestionPipeline;
use filmroom_storage::Storage;
use std::sync::Arc;

/// Main application state: configuration plus the ingestion pipeline and the
/// storage handle health checks probe.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub pipeline: Arc<IngestionPipeline>,
    pub storage: Arc<dyn Storage>,
}

fn _assert_app_state_send_sync() {
    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}
    assert_send::<AppState>();
    assert_sync::<AppState>();
}
