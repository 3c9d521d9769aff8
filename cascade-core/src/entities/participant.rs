use crate::entities::region::Region;
use cascade_sdk::objects::{ChannelId, UserId};
use compact_str::CompactString;
use serde::{Deserialize, Serialize};

/// Longest in-game name accepted on the board.
pub const MAX_NAME_LEN: usize = 24;

/// A user holding a squad slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub id: UserId,
    pub name: CompactString,
    pub region: Region,
    /// Channel the user joined from; host announcements go back there.
    pub channel_id: ChannelId,
}
