//! Configuration module for cascade-server.
//!
//! Handles loading configuration from TOML files, CLI arguments,
//! and environment variables.

pub mod file;

use crate::config::file::{FileConfig, PollerConfig as FilePollerConfig, ServerSeed};
use cascade_core::config::{
    ConfigStore, DEFAULT_FEED_URL, DEFAULT_USER_AGENT, DiscordConfig, MissionSelector,
    PollerConfig, SharedConfig,
};
use cascade_core::entities::ServerRegistration;
use cascade_sdk::client::DEFAULT_API_BASE;
use cascade_sdk::objects::{ChannelId, GuildId, RoleId, UserId};
use cascade_sdk::signature::{InteractionPublicKey, SignatureError};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;
use url::Url;

/// Environment variable holding the bot token.
pub const TOKEN_ENV: &str = "DISCORD_TOKEN";

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("invalid url: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("invalid discord public key: {0}")]
    PublicKeyError(#[from] SignatureError),

    #[error("validation error: {0}")]
    ValidationError(String),

    #[error("DISCORD_TOKEN environment variable not set")]
    MissingToken,
}

/// Loaded configuration result containing all parts.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub listen: SocketAddr,
    pub storage_path: PathBuf,
    pub discord: DiscordConfig,
    pub poller: PollerConfig,
    pub seeds: Vec<(GuildId, ServerRegistration)>,
}

impl LoadedConfig {
    /// Convert into a SharedConfig with separately reloadable sections.
    pub fn into_shared(self) -> SharedConfig {
        SharedConfig {
            discord: Arc::new(RwLock::new(self.discord)),
            poller: ConfigStore::new(self.poller),
        }
    }
}

/// Configuration loader that handles the complete loading process.
pub struct ConfigLoader {
    config_path: PathBuf,
    listen_override: Option<SocketAddr>,
}

impl ConfigLoader {
    /// Create a new config loader.
    pub fn new(config_path: impl AsRef<Path>, listen_override: Option<SocketAddr>) -> Self {
        Self {
            config_path: config_path.as_ref().to_path_buf(),
            listen_override,
        }
    }

    /// Load and process the configuration.
    ///
    /// This will:
    /// 1. Read the TOML file
    /// 2. Apply CLI overrides
    /// 3. Validate the configuration
    /// 4. Build the runtime configuration
    pub fn load(&self) -> Result<LoadedConfig, ConfigError> {
        let config_content = std::fs::read_to_string(&self.config_path)?;
        let mut file_config: FileConfig = toml::from_str(&config_content)?;

        if let Some(listen) = self.listen_override {
            file_config.server.listen = listen;
        }

        validate(&file_config)?;
        build_loaded_config(file_config)
    }

    /// Reload the configuration (used during SIGHUP).
    pub fn reload(&self) -> Result<LoadedConfig, ConfigError> {
        self.load()
    }
}

fn validate(config: &FileConfig) -> Result<(), ConfigError> {
    if config.poller.base_interval_secs == 0 {
        return Err(ConfigError::ValidationError(
            "poller.base_interval_secs must be positive".to_owned(),
        ));
    }
    for seed in &config.servers {
        if seed.guild_id.trim().is_empty() || seed.channel_id.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "servers entries need both guild_id and channel_id".to_owned(),
            ));
        }
    }
    Ok(())
}

fn build_loaded_config(file_config: FileConfig) -> Result<LoadedConfig, ConfigError> {
    let api_base = match file_config.discord.api_base {
        Some(url) => url,
        None => Url::parse(DEFAULT_API_BASE)?,
    };

    Ok(LoadedConfig {
        listen: file_config.server.listen,
        storage_path: file_config.storage.path,
        discord: DiscordConfig {
            api_base,
            public_key: InteractionPublicKey::from_hex(&file_config.discord.public_key)?,
            owner_id: file_config.discord.owner_id.as_deref().map(UserId::from),
            enforce_whitelist: file_config.discord.enforce_whitelist,
        },
        poller: convert_poller(file_config.poller)?,
        seeds: file_config.servers.into_iter().map(convert_seed).collect(),
    })
}

fn convert_poller(p: FilePollerConfig) -> Result<PollerConfig, ConfigError> {
    let feed_url = match p.feed_url {
        Some(url) => url,
        None => Url::parse(DEFAULT_FEED_URL)?,
    };
    Ok(PollerConfig {
        feed_url,
        user_agent: p.user_agent.unwrap_or_else(|| DEFAULT_USER_AGENT.to_owned()),
        base_interval: secs(p.base_interval_secs),
        wake_buffer: secs(p.wake_buffer_secs),
        min_remaining: secs(p.min_remaining_secs),
        selector: MissionSelector {
            node: p.selector.node,
            mission_type: p.selector.mission_type,
            hard: p.selector.hard,
            label: p.selector.label,
        },
    })
}

fn secs(value: u64) -> time::Duration {
    time::Duration::seconds(i64::try_from(value).unwrap_or(i64::MAX))
}

fn convert_seed(seed: ServerSeed) -> (GuildId, ServerRegistration) {
    (
        GuildId::from(seed.guild_id.trim()),
        ServerRegistration {
            channel_id: ChannelId::from(seed.channel_id.trim()),
            role_id: seed.role_id.as_deref().map(str::trim).map(RoleId::from),
        },
    )
}

/// Get the bot token from the environment.
pub fn get_bot_token() -> Result<String, ConfigError> {
    match std::env::var(TOKEN_ENV) {
        Ok(token) if !token.trim().is_empty() => Ok(token),
        _ => Err(ConfigError::MissingToken),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PUBLIC_KEY: &str = "d75a980182b10ab7d54bfed3c964073a0ee172f3daa62325af021a68f707511a";

    fn write_config(name: &str, content: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("cascade-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_load_builds_runtime_config() {
        let path = write_config(
            "load.toml",
            &format!(
                r#"
[discord]
public_key = "{PUBLIC_KEY}"
owner_id = "42"

[poller]
base_interval_secs = 45

[[servers]]
guild_id = "100"
channel_id = "200"
role_id = "300"
"#
            ),
        );
        let listen: SocketAddr = "127.0.0.1:9999".parse().unwrap();
        let loaded = ConfigLoader::new(&path, Some(listen)).load().unwrap();

        assert_eq!(loaded.listen, listen);
        assert_eq!(loaded.discord.api_base.as_str(), DEFAULT_API_BASE);
        assert_eq!(loaded.discord.owner_id, Some(UserId::from("42")));
        assert_eq!(loaded.poller.feed_url.as_str(), DEFAULT_FEED_URL);
        assert_eq!(loaded.poller.base_interval, time::Duration::seconds(45));
        assert_eq!(loaded.poller.min_remaining, time::Duration::seconds(300));
        assert_eq!(loaded.poller.selector, MissionSelector::default());
        assert_eq!(loaded.seeds.len(), 1);
        assert_eq!(loaded.seeds[0].0, GuildId::from("100"));
        assert_eq!(loaded.seeds[0].1.role_id, Some(RoleId::from("300")));
    }

    #[test]
    fn test_bad_public_key_is_rejected() {
        let path = write_config("badkey.toml", "[discord]\npublic_key = \"zz\"\n");
        assert!(matches!(
            ConfigLoader::new(&path, None).load(),
            Err(ConfigError::PublicKeyError(_))
        ));
    }

    #[test]
    fn test_zero_interval_is_rejected() {
        let path = write_config(
            "zero.toml",
            &format!("[discord]\npublic_key = \"{PUBLIC_KEY}\"\n[poller]\nbase_interval_secs = 0\n"),
        );
        assert!(matches!(
            ConfigLoader::new(&path, None).load(),
            Err(ConfigError::ValidationError(_))
        ));
    }
}
