//! CLI module
//!
//! Command-line interface for the connection layer.
//!
//! # Commands
//!
//! - `check` - Connect and run a liveness check
//! - `descriptor` - Print the connection descriptor (password masked)
//! - `engines` - List registered drivers

mod commands;
mod runner;

pub use commands::{Cli, Commands};
pub use runner::Runner;
