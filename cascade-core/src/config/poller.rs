//! Poller configuration.

use crate::entities::DEFAULT_CASCADE_LABEL;
use time::Duration;
use url::Url;

pub const DEFAULT_FEED_URL: &str = "https://content.warframe.com/dynamic/worldState.php";
pub const DEFAULT_USER_AGENT: &str = concat!("cascade-lfg/", env!("CARGO_PKG_VERSION"));

/// Which feed mission counts as "the" cascade.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissionSelector {
    pub node: String,
    pub mission_type: String,
    pub hard: bool,
    /// Shown as the board title; the feed only carries the node id.
    pub label: String,
}

impl Default for MissionSelector {
    fn default() -> Self {
        Self {
            node: "SolNode232".to_owned(),
            mission_type: "MT_VOID_CASCADE".to_owned(),
            hard: true,
            label: DEFAULT_CASCADE_LABEL.to_owned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollerConfig {
    pub feed_url: Url,
    pub user_agent: String,
    /// Poll interval while idle or close to expiry.
    pub base_interval: Duration,
    /// How long before expiry a hibernating poller wakes up.
    pub wake_buffer: Duration,
    /// Missions with less time left are ignored.
    pub min_remaining: Duration,
    pub selector: MissionSelector,
}

impl PollerConfig {
    pub fn new(feed_url: Url) -> Self {
        Self {
            feed_url,
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            base_interval: Duration::seconds(60),
            wake_buffer: Duration::seconds(60),
            min_remaining: Duration::seconds(300),
            selector: MissionSelector::default(),
        }
    }
}
