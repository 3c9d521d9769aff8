//! Application state shared across all request handlers.

use cascade_core::config::SharedConfig;
use cascade_core::framework::StateStore;
use cascade_core::processors::CoordinatorHandle;
use std::sync::Arc;

/// Application state that is shared across all request handlers.
///
/// This is cloneable and cheap to pass around (everything is behind Arc).
#[derive(Clone)]
pub struct AppState {
    /// Runtime configuration (sections reloadable via SIGHUP).
    pub config: SharedConfig,
    /// Read access to the state document. All writes go through `coordinator`.
    pub store: Arc<dyn StateStore>,
    pub coordinator: CoordinatorHandle,
}

impl AppState {
    pub fn new(
        config: SharedConfig,
        store: Arc<dyn StateStore>,
        coordinator: CoordinatorHandle,
    ) -> Self {
        Self {
            config,
            store,
            coordinator,
        }
    }
}
