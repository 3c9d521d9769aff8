//! Configuration types for the cascade coordinator.
//!
//! These types represent the validated runtime configuration. The actual
//! config loading/parsing is handled by the server crate.

mod config_store;
mod discord;
mod poller;

pub use config_store::{ConfigStore, ConfigWatcher};
pub use discord::DiscordConfig;
pub use poller::{DEFAULT_FEED_URL, DEFAULT_USER_AGENT, MissionSelector, PollerConfig};

use std::sync::Arc;
use tokio::sync::RwLock;

/// Shared configuration state with separate locks for each section.
#[derive(Clone)]
pub struct SharedConfig {
    /// Interaction verification and whitelist policy.
    pub discord: Arc<RwLock<DiscordConfig>>,
    /// Poller settings; the poller re-reads them every tick.
    pub poller: ConfigStore<PollerConfig>,
}
