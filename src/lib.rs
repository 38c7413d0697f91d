//! Serial driver for a remote safety controller.
//!
//! Broadcasts a fixed cycle of operating-mode labels one line at a time
//! and logs whatever the controller answers in between.

pub mod cli;
pub mod codec;
pub mod config;
pub mod driver;
pub mod link;
pub mod logging;
pub mod sequencer;
pub mod shutdown;
