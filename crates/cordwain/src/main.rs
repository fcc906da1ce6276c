//! Cordwain CLI binary.
//!
//! This binary exercises the REST stack from the command line:
//! - Delete one or many messages from a channel
//! - Add or remove reactions
//! - Print the effective configuration

use clap::Parser;

mod cli;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use cli::{Cli, Commands, handle_delete, handle_react, show_config};

    // Load .env before anything reads the environment
    dotenvy::dotenv().ok();

    // Parse command-line arguments
    let cli = Cli::parse();

    // Initialize tracing
    let log_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    cordwain_core::init_telemetry_with_level(log_level)?;

    let config = cli.load_config()?;

    // Execute the requested command
    match cli.command {
        Commands::Delete {
            channel,
            messages,
            reason,
        } => {
            handle_delete(&config, &channel, &messages, reason.as_deref()).await?;
        }

        Commands::React {
            channel,
            message,
            emoji,
            remove,
        } => {
            handle_react(&config, &channel, &message, &emoji, remove).await?;
        }

        Commands::Config => {
            show_config(&config)?;
        }
    }

    Ok(())
}
