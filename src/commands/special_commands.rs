//! Special commands parser for interactive chat mode
//!
//! This module parses the special commands available during an interactive
//! chat session. Special commands let users:
//! - Start, open, and manage chat sessions without leaving the REPL
//! - Edit an earlier message and redo the conversation from there
//! - Switch the persisted theme preference
//! - Display help information and exit
//!
//! Commands are prefixed with `/` and are case-insensitive; anything else
//! is sent to the assistant as a regular message.

use thiserror::Error;

/// Errors that can occur when parsing special commands
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Unknown command was entered
    #[error("Unknown command: {0}\n\nType '/help' to see available commands")]
    UnknownCommand(String),

    /// Command requires an argument but none was provided
    #[error("Command {command} requires an argument\n\nUsage: {usage}")]
    MissingArgument { command: String, usage: String },
}

/// Special commands that can be executed during interactive chat
///
/// These commands drive the synchronizer or the session state rather than
/// being sent to the assistant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecialCommand {
    /// Persist the current session and start a fresh one
    NewChat,

    /// Open a stored session by id
    OpenChat(String),

    /// List chat summaries in the sidebar sense
    ListChats,

    /// Edit an earlier message and regenerate the reply
    ///
    /// Discards everything after the edited message.
    EditMessage { message_id: String, content: String },

    /// Rename a stored session
    RenameChat { id: String, title: String },

    /// Delete a stored session (the REPL confirms before issuing it)
    DeleteChat(String),

    /// Move a stored session to a folder
    MoveChat { id: String, folder: String },

    /// Switch and persist the theme preference
    SetTheme(String),

    /// Display help information
    Help,

    /// Exit the interactive session
    Exit,

    /// Not a special command; send the input to the assistant
    None,
}

/// Parse a user input string into a special command
///
/// # Arguments
///
/// * `input` - The user input string to parse
///
/// # Errors
///
/// Returns `CommandError::UnknownCommand` for an unrecognized `/` command
/// and `CommandError::MissingArgument` when required arguments are absent.
///
/// # Examples
///
/// ```
/// use geniex::commands::special_commands::{parse_special_command, SpecialCommand};
///
/// let cmd = parse_special_command("/new").unwrap();
/// assert_eq!(cmd, SpecialCommand::NewChat);
///
/// let cmd = parse_special_command("Hello there").unwrap();
/// assert_eq!(cmd, SpecialCommand::None);
/// ```
pub fn parse_special_command(input: &str) -> Result<SpecialCommand, CommandError> {
    let trimmed = input.trim();
    if !trimmed.starts_with('/') {
        return Ok(SpecialCommand::None);
    }

    let mut parts = trimmed.split_whitespace();
    let command = parts
        .next()
        .unwrap_or_default()
        .to_lowercase();
    let args: Vec<&str> = parts.collect();

    match command.as_str() {
        "/new" => Ok(SpecialCommand::NewChat),
        "/open" | "/switch" => match args.first() {
            Some(id) => Ok(SpecialCommand::OpenChat((*id).to_string())),
            None => Err(CommandError::MissingArgument {
                command,
                usage: "/open <chat-id>".to_string(),
            }),
        },
        "/list" | "/chats" => Ok(SpecialCommand::ListChats),
        "/edit" => {
            if args.len() < 2 {
                return Err(CommandError::MissingArgument {
                    command,
                    usage: "/edit <message-id> <new text>".to_string(),
                });
            }
            Ok(SpecialCommand::EditMessage {
                message_id: args[0].to_string(),
                content: args[1..].join(" "),
            })
        }
        "/rename" => {
            if args.len() < 2 {
                return Err(CommandError::MissingArgument {
                    command,
                    usage: "/rename <chat-id> <new title>".to_string(),
                });
            }
            Ok(SpecialCommand::RenameChat {
                id: args[0].to_string(),
                title: args[1..].join(" "),
            })
        }
        "/delete" => match args.first() {
            Some(id) => Ok(SpecialCommand::DeleteChat((*id).to_string())),
            None => Err(CommandError::MissingArgument {
                command,
                usage: "/delete <chat-id>".to_string(),
            }),
        },
        "/move" => {
            if args.len() < 2 {
                return Err(CommandError::MissingArgument {
                    command,
                    usage: "/move <chat-id> <folder>".to_string(),
                });
            }
            Ok(SpecialCommand::MoveChat {
                id: args[0].to_string(),
                folder: args[1..].join(" "),
            })
        }
        "/theme" => match args.first() {
            Some(theme) => Ok(SpecialCommand::SetTheme((*theme).to_string())),
            None => Err(CommandError::MissingArgument {
                command,
                usage: "/theme <light|dark>".to_string(),
            }),
        },
        "/help" | "/?" => Ok(SpecialCommand::Help),
        "/exit" | "/quit" | "/q" => Ok(SpecialCommand::Exit),
        other => Err(CommandError::UnknownCommand(other.to_string())),
    }
}

/// Print help for all special commands
pub fn print_help() {
    println!("Available commands:");
    println!("  /new                          Start a fresh chat (saves the current one)");
    println!("  /open <chat-id>               Open a stored chat");
    println!("  /list                         List your chats");
    println!("  /edit <message-id> <text>     Edit a message and redo the conversation from there");
    println!("  /rename <chat-id> <title>     Rename a chat");
    println!("  /delete <chat-id>             Delete a chat (asks for confirmation)");
    println!("  /move <chat-id> <folder>      Move a chat to a folder");
    println!("  /theme <light|dark>           Switch the display theme");
    println!("  /help                         Show this help");
    println!("  /exit                         Leave the chat");
    println!();
    println!("Anything else is sent to the assistant.");
}
