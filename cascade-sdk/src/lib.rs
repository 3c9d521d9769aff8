//! Wire objects, signature verification and HTTP clients shared by the
//! cascade LFG coordinator crates.

pub mod objects;
pub mod signature;

#[cfg(feature = "client")]
pub mod client;
