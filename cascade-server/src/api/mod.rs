//! HTTP API exposed to the chat platform.

pub mod extractors;
pub mod interactions;

pub use interactions::router;
