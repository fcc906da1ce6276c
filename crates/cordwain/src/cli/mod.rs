//! Command-line interface module.
//!
//! This module provides the CLI structure and command handlers for the cordwain binary.

mod commands;
mod messages;

pub use commands::{Cli, Commands};
pub use messages::{handle_delete, handle_react, show_config};
