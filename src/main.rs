//! GenieX - chat client CLI
//!
#![doc = "GenieX - chat client CLI"]
#![doc = "Main entry point for the GenieX chat application."]

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use geniex::cli::{Cli, Commands, SessionCommand};
use geniex::commands;
use geniex::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    init_tracing();

    // Parse command line arguments
    let cli = Cli::parse_args();

    // Load configuration
    let config_path = cli.config.as_deref().unwrap_or("config/config.yaml");
    let config = Config::load(config_path, &cli)?;

    // Validate configuration
    config.validate()?;

    // Execute command
    match cli.command {
        Commands::Chat { language, folder } => {
            tracing::info!("Starting interactive chat");
            if let Some(l) = &language {
                tracing::debug!("Using language override: {}", l);
            }
            if let Some(f) = &folder {
                tracing::debug!("Using folder override: {}", f);
            }

            commands::chat::run_chat(config, language, folder).await?;
            Ok(())
        }
        Commands::Sessions { command } => match command {
            SessionCommand::List { folder, json } => {
                commands::sessions::list(config, folder, json).await?;
                Ok(())
            }
            SessionCommand::Rename { id, title } => {
                commands::sessions::rename(config, id, title).await?;
                Ok(())
            }
            SessionCommand::Delete { id, yes } => {
                commands::sessions::delete(config, id, yes).await?;
                Ok(())
            }
            SessionCommand::Move { id, folder } => {
                commands::sessions::move_to_folder(config, id, folder).await?;
                Ok(())
            }
        },
    }
}

/// Initialize tracing subscriber with environment filter
fn init_tracing() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("geniex=info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
