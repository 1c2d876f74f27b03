/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint.

It exposes two top-level command modules:

- `chat`     — Interactive chat mode
- `sessions` — One-shot session management (list/rename/delete/move)

These handlers are intentionally small and use the library components:
the store client, the identity seam, and the synchronizer.
*/

use crate::config::Config;
use crate::error::{GeniexError, Result};
use crate::identity::{IdentityProvider, StaticIdentity};
use crate::session::Synchronizer;
use crate::store::ChatStoreClient;
use std::sync::Arc;

// Special commands parser for the chat REPL
pub mod special_commands;

/// Builds the synchronizer stack shared by both command families
fn build_synchronizer(config: &Config) -> Result<(Synchronizer, Arc<dyn IdentityProvider>)> {
    let identity: Arc<dyn IdentityProvider> = Arc::new(StaticIdentity::resolve(
        config.identity.user_id.as_deref(),
    ));
    let store = ChatStoreClient::new(&config.store)?;
    let sync = Synchronizer::new(store, Arc::clone(&identity), &config.chat);
    Ok((sync, identity))
}

/// Shortens a store id for display
fn short_id(id: &str) -> &str {
    &id[..id.len().min(8)]
}

// Chat command handler
pub mod chat {
    //! Interactive chat mode handler.
    //!
    //! Instantiates the store client and synchronizer, then runs a
    //! readline-based loop that submits user input to the assistant and
    //! handles `/` commands locally.

    use super::*;
    use crate::commands::special_commands::{parse_special_command, print_help, SpecialCommand};
    use crate::preferences::{Preferences, Theme};
    use crate::session::{ChatMessage, EditOutcome, Role, SendOutcome};
    use colored::Colorize;
    use rustyline::error::ReadlineError;
    use rustyline::DefaultEditor;

    /// Start interactive chat mode
    ///
    /// # Arguments
    ///
    /// * `config` - Global configuration (consumed)
    /// * `language` - Optional override for the reply language
    /// * `folder` - Optional override for the new-session folder
    pub async fn run_chat(
        mut config: Config,
        language: Option<String>,
        folder: Option<String>,
    ) -> Result<()> {
        tracing::info!("Starting interactive chat mode");

        if let Some(language) = language {
            config.chat.language = language;
        }
        if let Some(folder) = folder {
            config.chat.default_folder = folder;
        }

        let (mut sync, identity) = build_synchronizer(&config)?;

        let mut preferences = Preferences::load().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Could not load preferences, using defaults");
            Preferences::default()
        });

        print_welcome_banner(identity.subject().as_deref(), preferences.theme);
        if identity.subject().is_none() {
            println!(
                "{}",
                "No user is signed in; set GENIEX_USER_ID or identity.user_id to chat.".yellow()
            );
        } else {
            if let Err(e) = sync.refresh_summaries().await {
                tracing::warn!(error = %e, "Initial summary refresh failed");
            }
            match sync.resume_latest().await {
                Ok(Some(id)) => {
                    println!("Resumed chat {}\n", short_id(&id).cyan());
                    print_transcript(sync.messages());
                }
                Ok(None) => {}
                Err(e) => tracing::warn!(error = %e, "Could not resume the latest chat"),
            }
        }

        let mut rl = DefaultEditor::new()?;

        loop {
            match rl.readline("you> ") {
                Ok(line) => {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }
                    rl.add_history_entry(trimmed)?;

                    match parse_special_command(trimmed) {
                        Ok(SpecialCommand::None) => match sync.send_message(trimmed).await? {
                            SendOutcome::Delivered(reply) => print_reply(&reply),
                            SendOutcome::Failed(notice) => {
                                println!("{}\n", notice.content.red())
                            }
                            SendOutcome::Ignored => {
                                if identity.subject().is_none() {
                                    println!("{}", "Sign in before chatting.".yellow());
                                }
                            }
                        },
                        Ok(SpecialCommand::Exit) => break,
                        Ok(command) => {
                            handle_command(&mut sync, &mut rl, &mut preferences, command).await?
                        }
                        Err(e) => println!("{}", e.to_string().yellow()),
                    }
                }
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
                Err(e) => return Err(e.into()),
            }
        }

        println!("Goodbye!");
        Ok(())
    }

    async fn handle_command(
        sync: &mut Synchronizer,
        rl: &mut DefaultEditor,
        preferences: &mut Preferences,
        command: SpecialCommand,
    ) -> Result<()> {
        match command {
            SpecialCommand::NewChat => match sync.create_new_chat().await? {
                Some(id) => println!("Started chat {}\n", short_id(&id).cyan()),
                None => println!("Started a local draft chat\n"),
            },
            SpecialCommand::OpenChat(id) => match sync.switch_chat(&id).await {
                Ok(()) => print_transcript(sync.messages()),
                Err(e) => println!("{}", format!("Could not open chat: {}", e).red()),
            },
            SpecialCommand::ListChats => match sync.refresh_summaries().await {
                Ok(summaries) => print_summaries(summaries),
                Err(e) => println!("{}", format!("Could not list chats: {}", e).red()),
            },
            SpecialCommand::EditMessage {
                message_id,
                content,
            } => match sync.edit_message(&message_id, &content).await? {
                EditOutcome::Delivered(reply) => print_reply(&reply),
                EditOutcome::Failed(notice) => println!("{}\n", notice.content.red()),
                EditOutcome::Ignored => {
                    println!("{}", "No message with that id in this chat.".yellow())
                }
            },
            SpecialCommand::RenameChat { id, title } => match sync.rename_chat(&id, &title).await {
                Ok(()) => println!("Renamed {} to \"{}\"\n", short_id(&id), title),
                Err(e) => println!("{}", format!("Rename failed: {}", e).red()),
            },
            SpecialCommand::DeleteChat(id) => {
                let answer = rl.readline(&format!(
                    "Are you sure you want to delete chat {}? [y/N] ",
                    short_id(&id)
                ))?;
                if answer.trim().eq_ignore_ascii_case("y") {
                    match sync.delete_chat(&id).await {
                        Ok(()) => println!("Deleted {}\n", short_id(&id)),
                        Err(e) => println!("{}", format!("Delete failed: {}", e).red()),
                    }
                } else {
                    println!("Kept {}\n", short_id(&id));
                }
            }
            SpecialCommand::MoveChat { id, folder } => {
                match sync.move_chat(&id, &folder).await {
                    Ok(()) => println!("Moved {} to {}\n", short_id(&id), folder),
                    Err(e) => println!("{}", format!("Move failed: {}", e).red()),
                }
            }
            SpecialCommand::SetTheme(name) => match Theme::parse_str(&name) {
                Ok(theme) => {
                    preferences.theme = theme;
                    if let Err(e) = preferences.save() {
                        tracing::warn!(error = %e, "Could not persist theme preference");
                    }
                    println!("Theme set to {}\n", theme);
                }
                Err(e) => println!("{}", e.to_string().yellow()),
            },
            SpecialCommand::Help => print_help(),
            SpecialCommand::Exit | SpecialCommand::None => {}
        }
        Ok(())
    }

    fn print_reply(reply: &ChatMessage) {
        println!("{} {}\n", "assistant>".green().bold(), reply.content);
    }

    fn print_transcript(messages: &[ChatMessage]) {
        if messages.is_empty() {
            println!("(empty chat)\n");
            return;
        }
        for message in messages {
            let role = match message.role {
                Role::User => "you".purple().bold(),
                Role::Assistant => "assistant".green().bold(),
                Role::System => "system".yellow().bold(),
            };
            let edited = if message.edited { " (edited)" } else { "" };
            println!(
                "[{}] {}{}: {}",
                short_id(&message.id).dimmed(),
                role,
                edited,
                message.content
            );
        }
        println!();
    }

    fn print_summaries(summaries: &[crate::session::ChatSummary]) {
        if summaries.is_empty() {
            println!("No chats yet.\n");
            return;
        }
        for summary in summaries {
            println!(
                "  {}  {}  [{}]",
                short_id(&summary.id).cyan(),
                summary.title,
                summary.folder.dimmed()
            );
        }
        println!();
    }

    fn print_welcome_banner(subject: Option<&str>, theme: Theme) {
        use colored::Colorize;

        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║              GenieX Chat - your smart assistant              ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");
        match subject {
            Some(subject) => println!("Signed in as {} (theme: {})", subject.cyan(), theme),
            None => println!("Signed out (theme: {})", theme),
        }
        println!("Type '/help' for commands.\n");
    }
}

// Session management command handlers
pub mod sessions {
    //! One-shot session management: list, rename, delete, move.
    //!
    //! Each handler builds a synchronizer, performs one operation, and
    //! prints the outcome. Deletion prompts on stdin unless `--yes`.

    use super::*;
    use chrono::{TimeZone, Utc};
    use prettytable::{cell, row, Table};

    /// List chat summaries, optionally filtered by folder
    pub async fn list(config: Config, folder: Option<String>, json: bool) -> Result<()> {
        let (mut sync, identity) = build_synchronizer(&config)?;
        if identity.subject().is_none() {
            return Err(GeniexError::NotSignedIn("sessions list".into()).into());
        }

        let mut summaries = sync.refresh_summaries().await?.to_vec();
        if let Some(folder) = folder {
            summaries.retain(|s| s.folder == folder);
        }

        if json {
            println!("{}", serde_json::to_string_pretty(&summaries)?);
            return Ok(());
        }

        if summaries.is_empty() {
            println!("No chats found.");
            return Ok(());
        }

        let mut table = Table::new();
        table.add_row(row!["ID", "Title", "Folder", "Updated"]);
        for summary in &summaries {
            table.add_row(row![
                summary.id,
                summary.title,
                summary.folder,
                format_timestamp(summary.timestamp)
            ]);
        }
        table.printstd();
        Ok(())
    }

    /// Rename a stored session
    pub async fn rename(config: Config, id: String, title: String) -> Result<()> {
        let (mut sync, _) = build_synchronizer(&config)?;
        sync.rename_chat(&id, &title).await?;
        println!("Renamed {} to \"{}\"", short_id(&id), title);
        Ok(())
    }

    /// Delete a stored session, confirming on stdin unless `yes`
    pub async fn delete(config: Config, id: String, yes: bool) -> Result<()> {
        if !yes && !confirm_on_stdin(&format!(
            "Are you sure you want to delete chat {}? [y/N] ",
            short_id(&id)
        ))? {
            println!("Kept {}", short_id(&id));
            return Ok(());
        }

        let (mut sync, _) = build_synchronizer(&config)?;
        sync.delete_chat(&id).await?;
        println!("Deleted {}", short_id(&id));
        Ok(())
    }

    /// Move a stored session to a folder
    pub async fn move_to_folder(config: Config, id: String, folder: String) -> Result<()> {
        let (mut sync, _) = build_synchronizer(&config)?;
        sync.move_chat(&id, &folder).await?;
        println!("Moved {} to {}", short_id(&id), folder);
        Ok(())
    }

    fn confirm_on_stdin(prompt: &str) -> Result<bool> {
        use std::io::Write;

        print!("{}", prompt);
        std::io::stdout().flush()?;
        let mut answer = String::new();
        std::io::stdin().read_line(&mut answer)?;
        Ok(answer.trim().eq_ignore_ascii_case("y"))
    }

    fn format_timestamp(millis: i64) -> String {
        Utc.timestamp_millis_opt(millis)
            .single()
            .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| millis.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_id_truncates_long_ids() {
        assert_eq!(short_id("0123456789abcdef"), "01234567");
    }

    #[test]
    fn test_short_id_keeps_short_ids() {
        assert_eq!(short_id("abc"), "abc");
    }
}
