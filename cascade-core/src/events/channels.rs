//! Command channel factory and handles.

use super::types::Command;
use tokio::sync::mpsc;

/// Default buffer size for the command channel.
///
/// Large enough to absorb a burst of button presses while the coordinator
/// is busy with a fan-out.
pub const DEFAULT_CHANNEL_BUFFER: usize = 256;

pub type CommandSender = mpsc::Sender<Command>;
pub type CommandReceiver = mpsc::Receiver<Command>;

/// Create the coordinator's command channel.
///
/// Senders can be cloned freely; the coordinator owns the only receiver.
pub fn command_channel() -> (CommandSender, CommandReceiver) {
    mpsc::channel(DEFAULT_CHANNEL_BUFFER)
}
