use cascade_sdk::objects::{ChannelId, GuildId, MessageId, RoleId};
use compact_str::CompactString;
use serde::{Deserialize, Deserializer, Serialize};
use time::OffsetDateTime;

/// Board title used when a stored session carries no label.
pub const DEFAULT_CASCADE_LABEL: &str = "Tuvul Commons (Zariman)";

/// One posted board at one endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Announcement {
    pub guild_id: GuildId,
    pub channel_id: ChannelId,
    pub message_id: MessageId,
}

/// The currently tracked cascade and its broadcast footprint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Mission id reported by the feed.
    pub id: CompactString,
    #[serde(with = "time::serde::timestamp")]
    pub expiry: OffsetDateTime,
    /// Human-readable location, shown as the board title.
    #[serde(
        rename = "node",
        default = "default_label",
        deserialize_with = "label_or_default"
    )]
    pub label: String,
    #[serde(rename = "messages", default)]
    pub announcements: Vec<Announcement>,
}

impl Session {
    pub fn is_expired_at(&self, now: OffsetDateTime) -> bool {
        self.expiry <= now
    }
}

fn default_label() -> String {
    DEFAULT_CASCADE_LABEL.to_owned()
}

fn label_or_default<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let label = Option::<String>::deserialize(deserializer)?;
    Ok(label
        .filter(|label| !label.trim().is_empty())
        .unwrap_or_else(default_label))
}

/// Where a guild wants its boards posted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerRegistration {
    pub channel_id: ChannelId,
    #[serde(default)]
    pub role_id: Option<RoleId>,
}
