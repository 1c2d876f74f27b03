//! Command-line interface definition for GenieX
//!
//! This module defines the CLI structure using clap's derive API,
//! providing the interactive chat command and one-shot session management.

use clap::{Parser, Subcommand};

/// GenieX - chat client CLI
///
/// Talk to the assistant and keep chat history in sync with the remote
/// chat store service.
#[derive(Parser, Debug, Clone)]
#[command(name = "geniex")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Override the chat store base URL from config
    #[arg(long, env = "GENIEX_STORE_URL")]
    pub store_url: Option<String>,

    /// Override the authenticated-user subject from config
    #[arg(long)]
    pub user: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for GenieX
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start an interactive chat session
    Chat {
        /// Language code sent with reply requests (overrides config)
        #[arg(short, long)]
        language: Option<String>,

        /// Folder for newly created sessions (overrides config)
        #[arg(short, long)]
        folder: Option<String>,
    },

    /// Manage stored chat sessions
    Sessions {
        /// Session management subcommand
        #[command(subcommand)]
        command: SessionCommand,
    },
}

/// Session management subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum SessionCommand {
    /// List chat summaries for the authenticated user
    List {
        /// Only show sessions in this folder
        #[arg(short, long)]
        folder: Option<String>,

        /// Emit the list as JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Rename a chat session
    Rename {
        /// Session id
        id: String,

        /// New title
        title: String,
    },

    /// Delete a chat session
    Delete {
        /// Session id
        id: String,

        /// Skip the interactive confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Move a chat session to a folder
    Move {
        /// Session id
        id: String,

        /// Target folder label
        folder: String,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            config: Some("config/config.yaml".to_string()),
            verbose: false,
            store_url: None,
            user: None,
            command: Commands::Chat {
                language: None,
                folder: None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_default() {
        let cli = Cli::default();
        assert_eq!(cli.config, Some("config/config.yaml".to_string()));
        assert!(!cli.verbose);
        assert!(matches!(cli.command, Commands::Chat { .. }));
    }

    #[test]
    fn test_cli_parse_chat_command() {
        let cli = Cli::try_parse_from(["geniex", "chat"]);
        assert!(cli.is_ok());
        assert!(matches!(cli.unwrap().command, Commands::Chat { .. }));
    }

    #[test]
    fn test_cli_parse_chat_with_language() {
        let cli = Cli::try_parse_from(["geniex", "chat", "--language", "hi"]).unwrap();
        if let Commands::Chat { language, folder } = cli.command {
            assert_eq!(language, Some("hi".to_string()));
            assert_eq!(folder, None);
        } else {
            panic!("Expected Chat command");
        }
    }

    #[test]
    fn test_cli_parse_sessions_list() {
        let cli = Cli::try_parse_from(["geniex", "sessions", "list", "--folder", "Work"]).unwrap();
        if let Commands::Sessions {
            command: SessionCommand::List { folder, json },
        } = cli.command
        {
            assert_eq!(folder, Some("Work".to_string()));
            assert!(!json);
        } else {
            panic!("Expected Sessions List command");
        }
    }

    #[test]
    fn test_cli_parse_sessions_rename() {
        let cli =
            Cli::try_parse_from(["geniex", "sessions", "rename", "abc123", "New title"]).unwrap();
        if let Commands::Sessions {
            command: SessionCommand::Rename { id, title },
        } = cli.command
        {
            assert_eq!(id, "abc123");
            assert_eq!(title, "New title");
        } else {
            panic!("Expected Sessions Rename command");
        }
    }

    #[test]
    fn test_cli_parse_sessions_delete_with_yes() {
        let cli = Cli::try_parse_from(["geniex", "sessions", "delete", "abc123", "--yes"]).unwrap();
        if let Commands::Sessions {
            command: SessionCommand::Delete { id, yes },
        } = cli.command
        {
            assert_eq!(id, "abc123");
            assert!(yes);
        } else {
            panic!("Expected Sessions Delete command");
        }
    }

    #[test]
    fn test_cli_parse_sessions_move() {
        let cli = Cli::try_parse_from(["geniex", "sessions", "move", "abc123", "Work"]).unwrap();
        if let Commands::Sessions {
            command: SessionCommand::Move { id, folder },
        } = cli.command
        {
            assert_eq!(id, "abc123");
            assert_eq!(folder, "Work");
        } else {
            panic!("Expected Sessions Move command");
        }
    }

    #[test]
    fn test_cli_parse_global_overrides() {
        let cli = Cli::try_parse_from([
            "geniex",
            "--store-url",
            "http://127.0.0.1:9000",
            "--user",
            "u-1",
            "chat",
        ])
        .unwrap();
        assert_eq!(cli.store_url, Some("http://127.0.0.1:9000".to_string()));
        assert_eq!(cli.user, Some("u-1".to_string()));
    }

    #[test]
    fn test_cli_requires_subcommand() {
        assert!(Cli::try_parse_from(["geniex"]).is_err());
    }
}
