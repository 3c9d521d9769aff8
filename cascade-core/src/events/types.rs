//! Messages exchanged between the poller, the HTTP surface and the
//! coordinator.
//!
//! Every mutation of the state document travels through a [`Command`], so
//! the coordinator can apply them strictly one at a time.

use crate::entities::{Region, ServerRegistration, Session};
use crate::framework::StoreError;
use crate::utils::board::board_embed;
use cascade_sdk::objects::{ChannelId, Embed, GuildId, MessageId, UserId};
use compact_str::CompactString;
use thiserror::Error;
use time::OffsetDateTime;
use tokio::sync::oneshot;

/// A qualifying mission seen on the feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectedCascade {
    pub id: CompactString,
    pub expiry: OffsetDateTime,
    pub label: String,
}

/// Outcome of one poll tick that requires a state transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollSignal {
    Detected(DetectedCascade),
    /// The session with this mission id is past its expiry.
    Expired { id: CompactString },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinRequest {
    pub user: UserId,
    pub name: String,
    pub region: Region,
    pub channel: ChannelId,
    /// Board message the request came from; it is refreshed by the
    /// interaction reply and skipped during sync.
    pub origin: Option<MessageId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaveRequest {
    pub user: UserId,
    pub origin: Option<MessageId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WhitelistAction {
    Add,
    Remove,
}

/// The session change a poll signal actually caused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionChange {
    Unchanged,
    Started(Session),
    Superseded { previous: Session, current: Session },
    Ended(Session),
}

/// Freshly rendered board returned to the originating interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardView {
    pub label: String,
    pub text: String,
}

impl BoardView {
    pub fn embed(&self) -> Embed {
        board_embed(&self.label, self.text.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinReply {
    pub view: BoardView,
    /// The user already held a slot; only name/region changed.
    pub updated_in_place: bool,
}

/// Reasons a join or leave is refused without touching state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JoinRejection {
    #[error("no cascade is active")]
    NoActiveSession,

    #[error("name must be between 1 and {max} characters")]
    InvalidName { max: usize },

    #[error("user is not in any squad")]
    NotInSquad,
}

#[derive(Debug, Error)]
pub enum CoordinatorError {
    #[error(transparent)]
    Rejected(#[from] JoinRejection),

    #[error("state store error: {0}")]
    Store(#[from] StoreError),

    #[error("coordinator is not running")]
    Stopped,
}

pub type Reply<T> = oneshot::Sender<Result<T, CoordinatorError>>;

/// Work item for the coordinator.
#[derive(Debug)]
pub enum Command {
    Poll {
        signal: PollSignal,
        reply: Reply<SessionChange>,
    },
    Join {
        request: JoinRequest,
        reply: Reply<JoinReply>,
    },
    Leave {
        request: LeaveRequest,
        reply: Reply<BoardView>,
    },
    RegisterServer {
        guild: GuildId,
        registration: ServerRegistration,
        reply: Reply<()>,
    },
    Whitelist {
        guild: GuildId,
        action: WhitelistAction,
        reply: Reply<bool>,
    },
}
