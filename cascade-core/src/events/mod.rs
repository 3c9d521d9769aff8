//! Typed command queue feeding the coordinator.
//!
//! # Flow
//!
//! 1. `Poller` turns feed snapshots into `Command::Poll`
//! 2. The HTTP surface turns interactions into `Join`/`Leave`/`RegisterServer`/`Whitelist`
//! 3. `Coordinator` applies commands one at a time and answers through the
//!    embedded oneshot reply

pub mod channels;
pub mod types;

pub use channels::{CommandReceiver, CommandSender, DEFAULT_CHANNEL_BUFFER, command_channel};
pub use types::{
    BoardView, Command, CoordinatorError, DetectedCascade, JoinRejection, JoinReply,
    JoinRequest, LeaveRequest, PollSignal, Reply, SessionChange,
    WhitelistAction,
};
