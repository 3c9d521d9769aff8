//! Processors that drive the cascade lifecycle.
//!
//! - `Poller`: fetches the feed, sends `PollSignal`s to the coordinator
//! - `Coordinator`: owns all state mutation, one command at a time
//! - `SessionMachine`: applies `PollSignal`s (start, supersede, end)
//! - `Lobby`: applies joins, leaves and server bookkeeping
//! - `Broadcaster`: fan-out, fan-in, teardown and host announcements

pub mod broadcaster;
pub mod coordinator;
pub mod lobby;
pub mod poller;
pub mod session_machine;

pub use broadcaster::Broadcaster;
pub use coordinator::{Coordinator, CoordinatorHandle};
pub use lobby::{Applied, BoardSync, Lobby, validate_name};
pub use poller::{Poller, evaluate};
pub use session_machine::{SessionMachine, Transition, transition};
