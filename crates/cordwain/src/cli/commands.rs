//! CLI command definitions.

use clap::{Parser, Subcommand};
use cordwain::{CordwainConfig, CordwainResult};
use std::path::PathBuf;

/// Cordwain - rate-limited Discord REST client
#[derive(Parser, Debug)]
#[command(name = "cordwain")]
#[command(about = "Rate-limited Discord REST client", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file replacing the default search path
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

impl Cli {
    /// Load configuration from `--config` or the default locations.
    pub fn load_config(&self) -> CordwainResult<CordwainConfig> {
        match &self.config {
            Some(path) => CordwainConfig::from_file(path),
            None => CordwainConfig::load(),
        }
    }
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Delete messages from a channel
    ///
    /// Messages younger than two weeks are deleted in batches of up to 100;
    /// older ones are deleted one by one.
    Delete {
        /// Channel id
        #[arg(long)]
        channel: String,

        /// Message ids
        #[arg(required = true)]
        messages: Vec<String>,

        /// Audit log reason; rejected when more than one message is given
        #[arg(long)]
        reason: Option<String>,
    },

    /// Add or remove a reaction on a message
    React {
        /// Channel id
        #[arg(long)]
        channel: String,

        /// Message id
        #[arg(long)]
        message: String,

        /// Unicode emoji, or `name:id` for a custom emoji
        emoji: String,

        /// Remove the reaction instead of adding it
        #[arg(long)]
        remove: bool,
    },

    /// Print the effective configuration as JSON
    Config,
}
