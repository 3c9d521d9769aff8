//! TOML file configuration structures.
//!
//! These structs directly map to the `cascade-config.toml` file format.
//! Everything except `[discord].public_key` has a default.

use serde::Deserialize;
use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use url::Url;

/// Root configuration structure as read from the TOML file.
#[derive(Debug, Clone, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub server: ServerConfig,
    pub discord: DiscordConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub poller: PollerConfig,
    /// Board channels registered at startup. Existing registrations win.
    #[serde(default)]
    pub servers: Vec<ServerSeed>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// The address and port to listen on (e.g., "0.0.0.0:8080").
    #[serde(default = "default_listen_addr")]
    pub listen: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen_addr(),
        }
    }
}

fn default_listen_addr() -> SocketAddr {
    SocketAddr::from((Ipv4Addr::UNSPECIFIED, 8080))
}

#[derive(Debug, Clone, Deserialize)]
pub struct DiscordConfig {
    /// Hex-encoded Ed25519 application public key.
    pub public_key: String,
    /// REST API root; the public v10 API when absent.
    pub api_base: Option<Url>,
    pub owner_id: Option<String>,
    #[serde(default)]
    pub enforce_whitelist: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_state_path")]
    pub path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_state_path(),
        }
    }
}

fn default_state_path() -> PathBuf {
    PathBuf::from(".data/data.json")
}

#[derive(Debug, Clone, Deserialize)]
pub struct PollerConfig {
    pub feed_url: Option<Url>,
    pub user_agent: Option<String>,
    #[serde(default = "default_base_interval")]
    pub base_interval_secs: u64,
    #[serde(default = "default_wake_buffer")]
    pub wake_buffer_secs: u64,
    #[serde(default = "default_min_remaining")]
    pub min_remaining_secs: u64,
    #[serde(default)]
    pub selector: SelectorConfig,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            feed_url: None,
            user_agent: None,
            base_interval_secs: default_base_interval(),
            wake_buffer_secs: default_wake_buffer(),
            min_remaining_secs: default_min_remaining(),
            selector: SelectorConfig::default(),
        }
    }
}

fn default_base_interval() -> u64 {
    60
}

fn default_wake_buffer() -> u64 {
    60
}

fn default_min_remaining() -> u64 {
    300
}

/// Which feed mission to track. Defaults to the hard-mode Zariman cascade.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    pub node: String,
    pub mission_type: String,
    pub hard: bool,
    pub label: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        let selector = cascade_core::config::MissionSelector::default();
        Self {
            node: selector.node,
            mission_type: selector.mission_type,
            hard: selector.hard,
            label: selector.label,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSeed {
    pub guild_id: String,
    pub channel_id: String,
    pub role_id: Option<String>,
}
