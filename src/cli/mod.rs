//! Command-line interface for coursemate.

pub mod commands;

pub use commands::{Cli, Commands};
