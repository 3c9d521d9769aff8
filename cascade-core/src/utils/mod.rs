pub mod board;
pub mod poll_interval;
