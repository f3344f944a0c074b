//! Terminal chat loop: renders the message log, reads one utterance per
//! turn and handles slash commands.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use colored::Colorize;
use dialoguer::{Confirm, FuzzySelect, Input};
use tracing::warn;

use talentscout_agent::ChatModel;
use talentscout_core::{transcript, Controller, Language, Message, Role, Session};
use talentscout_logging::{LogEvent, Logger};
use talentscout_store::SessionStore;

use crate::config::Settings;

/// Slash commands accepted at the prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Info,
    Language(Option<String>),
    Reset,
    Export(Option<PathBuf>),
    Quit,
    Unknown(String),
}

impl Command {
    /// Parse a `/command`; plain text returns None
    pub fn parse(input: &str) -> Option<Self> {
        let rest = input.trim().strip_prefix('/')?;
        let mut parts = rest.splitn(2, char::is_whitespace);
        let name = parts.next().unwrap_or_default().to_lowercase();
        let arg = parts
            .next()
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .map(String::from);

        Some(match name.as_str() {
            "help" | "?" => Command::Help,
            "info" => Command::Info,
            "language" | "lang" => Command::Language(arg),
            "reset" => Command::Reset,
            "export" => Command::Export(arg.map(PathBuf::from)),
            "quit" | "exit" | "q" => Command::Quit,
            other => Command::Unknown(other.to_string()),
        })
    }
}

/// One line read at the prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// Nothing but whitespace; ignored
    Blank,
    Command(Command),
    Text(String),
}

impl Submission {
    pub fn parse(input: &str) -> Self {
        if input.trim().is_empty() {
            return Submission::Blank;
        }
        match Command::parse(input) {
            Some(command) => Submission::Command(command),
            None => Submission::Text(input.to_string()),
        }
    }
}

/// Result of looking for a saved session at startup
pub struct Restored {
    pub session: Session,
    pub restored: bool,
    /// Set when a snapshot exists but could not be read
    pub warning: Option<String>,
}

/// Load the saved session, or start a new one in `language`.
///
/// An unreadable snapshot is not fatal; the caller gets a warning to show.
pub fn restore_session(store: &SessionStore, language: Language) -> Restored {
    match store.try_load() {
        Ok(Some(session)) => Restored {
            session,
            restored: true,
            warning: None,
        },
        Ok(None) => Restored {
            session: Session::new(language),
            restored: false,
            warning: None,
        },
        Err(e) => {
            warn!(path = %store.path().display(), error = %e, "Failed to restore session");
            Restored {
                session: Session::new(language),
                restored: false,
                warning: Some(format!(
                    "Could not restore the saved session ({}). Starting a new one; it replaces {} on the next save.",
                    e,
                    store.path().display()
                )),
            }
        }
    }
}

pub fn print_message(message: &Message) {
    match message.role {
        Role::Assistant => {
            println!("{} {}", "TalentScout:".bright_cyan().bold(), message.content)
        }
        Role::User => println!("{} {}", "You:".bright_green().bold(), message.content),
    }
    println!();
}

fn print_help() {
    eprintln!("{}", "Commands:".bold());
    for (cmd, desc) in [
        ("/help", "Show this help"),
        ("/info", "Show the collected candidate details"),
        ("/language [name]", "Switch the screening language"),
        ("/reset", "Clear the conversation and start over"),
        ("/export <path>", "Write a Markdown transcript"),
        ("/quit", "Leave (the session is kept for next time)"),
    ] {
        eprintln!("  {:<18} {}", cmd.bright_cyan(), desc);
    }
    eprintln!(
        "  {}",
        "During the questions: next, skip, back to move; done when finished.".dimmed()
    );
}

/// Print the collected candidate details, or a hint if there are none yet
pub fn print_candidate_info(session: &Session) {
    if !session.info_collected() {
        eprintln!(
            "{}",
            "Candidate details are shown once they have been collected.".dimmed()
        );
        return;
    }

    eprintln!("{}", "Candidate Details".bold());
    for (field, value) in session.candidate.provided() {
        eprintln!("  {:<22} {}", format!("{}:", field).dimmed(), value);
    }
}

/// One interactive screening run
pub struct Repl {
    controller: Controller,
    session: Session,
    store: SessionStore,
    logger: Arc<Logger>,
}

impl Repl {
    /// Restore the saved session, or start a new one in the configured language
    pub fn new(
        model: Arc<dyn ChatModel>,
        store: SessionStore,
        logger: Arc<Logger>,
        settings: &Settings,
    ) -> Self {
        let Restored {
            session,
            restored,
            warning,
        } = restore_session(&store, settings.language);
        if let Some(warning) = warning {
            eprintln!("{} {}", "⚠".bright_yellow(), warning);
        }

        let controller = Controller::new(model, &session, logger.clone())
            .with_min_answer_words(settings.min_answer_words);

        logger.log(&LogEvent::SessionStarted {
            restored,
            language: session.language.to_string(),
            messages: session.messages.len(),
            model: controller.chat().model_name().to_string(),
        });

        Self {
            controller,
            session,
            store,
            logger,
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        for message in &self.session.messages {
            print_message(message);
        }
        if self.session.is_ended() {
            self.print_concluded();
        }
        eprintln!("{}", "Type /help for commands.".dimmed());

        loop {
            let input: String = Input::new()
                .with_prompt("You")
                .allow_empty(true)
                .interact_text()
                .context("Failed to read input")?;

            let input = match Submission::parse(&input) {
                Submission::Blank => continue,
                Submission::Command(command) => {
                    if !self.handle_command(command).await? {
                        break;
                    }
                    continue;
                }
                Submission::Text(text) => text,
            };

            if self.session.is_ended() {
                self.print_concluded();
                continue;
            }

            let reply = self.controller.respond(&mut self.session, &input).await;
            println!();
            print_message(&Message::assistant(reply));
            self.save();

            if self.session.is_ended() {
                self.print_concluded();
            }
        }

        Ok(())
    }

    /// Returns false when the loop should stop
    async fn handle_command(&mut self, command: Command) -> Result<bool> {
        match command {
            Command::Help => print_help(),
            Command::Info => print_candidate_info(&self.session),
            Command::Language(name) => self.change_language(name)?,
            Command::Reset => self.reset()?,
            Command::Export(Some(path)) => self.export(&path),
            Command::Export(None) => eprintln!("Usage: /export <path>"),
            Command::Quit => {
                eprintln!("{}", "Session saved. Goodbye!".dimmed());
                return Ok(false);
            }
            Command::Unknown(name) => {
                eprintln!("Unknown command '/{}'. Type /help for commands.", name)
            }
        }
        Ok(true)
    }

    fn change_language(&mut self, name: Option<String>) -> Result<()> {
        let language = match name {
            Some(name) => match name.parse::<Language>() {
                Ok(language) => language,
                Err(e) => {
                    eprintln!("{}", e);
                    return Ok(());
                }
            },
            None => {
                let names: Vec<&str> = Language::ALL.iter().map(|l| l.name()).collect();
                let current = Language::ALL
                    .iter()
                    .position(|l| *l == self.session.language)
                    .unwrap_or(0);
                let selection = FuzzySelect::new()
                    .with_prompt("Select language")
                    .items(&names)
                    .default(current)
                    .interact()?;
                Language::ALL[selection]
            }
        };

        match self.controller.change_language(&mut self.session, language) {
            Some(notice) => {
                print_message(&Message::assistant(notice));
                self.save();
            }
            None => eprintln!("{}", format!("Already using {}.", language).dimmed()),
        }
        Ok(())
    }

    fn reset(&mut self) -> Result<()> {
        let confirmed = Confirm::new()
            .with_prompt("Clear this conversation and start over?")
            .default(false)
            .interact()?;
        if !confirmed {
            return Ok(());
        }

        self.session = self.controller.reset(self.session.language);
        if let Err(e) = self.store.reset() {
            warn!(error = %e, "Failed to delete session snapshot");
            eprintln!("{} Could not delete saved session: {}", "⚠".bright_yellow(), e);
        }

        println!();
        for message in &self.session.messages {
            print_message(message);
        }
        Ok(())
    }

    fn export(&self, path: &std::path::Path) {
        match std::fs::write(path, transcript::to_markdown(&self.session)) {
            Ok(()) => eprintln!(
                "{} Transcript written to {}",
                "✓".bright_green(),
                path.display()
            ),
            Err(e) => eprintln!("{} Export failed: {}", "✗".bright_red(), e),
        }
    }

    /// Persist after every change. Failures are reported, never fatal.
    fn save(&self) {
        match self.store.save(&self.session) {
            Ok(()) => self.logger.log(&LogEvent::SessionSaved {
                path: self.store.path().to_path_buf(),
            }),
            Err(e) => {
                warn!(error = %e, "Failed to save session");
                self.logger.log(&LogEvent::ErrorEncountered {
                    stage: "save".to_string(),
                    error: e.to_string(),
                });
                eprintln!("{} Could not save session: {}", "⚠".bright_yellow(), e);
            }
        }
    }

    fn print_concluded(&self) {
        eprintln!(
            "{}",
            "The screening has concluded. Use /export to keep a transcript, /reset to start over or /quit to exit."
                .dimmed()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_plain_text_is_not_a_command() {
        assert_eq!(Command::parse("John Doe, john@example.com"), None);
        assert_eq!(Command::parse("back"), None);
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(Command::parse("/help"), Some(Command::Help));
        assert_eq!(Command::parse("  /INFO "), Some(Command::Info));
        assert_eq!(Command::parse("/quit"), Some(Command::Quit));
        assert_eq!(Command::parse("/reset"), Some(Command::Reset));
        assert_eq!(Command::parse("/language"), Some(Command::Language(None)));
        assert_eq!(
            Command::parse("/language  French"),
            Some(Command::Language(Some("French".into())))
        );
        assert_eq!(
            Command::parse("/export out/screening.md"),
            Some(Command::Export(Some(PathBuf::from("out/screening.md"))))
        );
        assert_eq!(Command::parse("/export"), Some(Command::Export(None)));
        assert_eq!(
            Command::parse("/frobnicate now"),
            Some(Command::Unknown("frobnicate".into()))
        );
    }

    #[test]
    fn test_blank_lines_are_ignored() {
        assert_eq!(Submission::parse(""), Submission::Blank);
        assert_eq!(Submission::parse("   \t "), Submission::Blank);
        assert_eq!(
            Submission::parse("/info"),
            Submission::Command(Command::Info)
        );
        assert_eq!(
            Submission::parse("John Doe"),
            Submission::Text("John Doe".into())
        );
    }

    #[test]
    fn test_restore_without_snapshot() {
        let dir = TempDir::new().unwrap();
        let store = SessionStore::with_path(dir.path().join("session.json"));

        let restored = restore_session(&store, Language::French);
        assert!(!restored.restored);
        assert!(restored.warning.is_none());
        assert_eq!(restored.session.language, Language::French);
    }

    #[test]
    fn test_restore_saved_session() {
        let dir = TempDir::new().unwrap();
        let store = SessionStore::with_path(dir.path().join("session.json"));
        let mut session = Session::new(Language::German);
        session.push_user("Hallo");
        store.save(&session).unwrap();

        let restored = restore_session(&store, Language::English);
        assert!(restored.restored);
        assert!(restored.warning.is_none());
        assert_eq!(restored.session.language, Language::German);
        assert_eq!(restored.session.messages.len(), 2);
    }

    #[test]
    fn test_restore_malformed_snapshot_warns() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "{ not json").unwrap();
        let store = SessionStore::with_path(path);

        let restored = restore_session(&store, Language::Spanish);
        assert!(!restored.restored);
        assert_eq!(restored.session.language, Language::Spanish);
        assert_eq!(restored.session.messages.len(), 1);
        let warning = restored.warning.unwrap();
        assert!(warning.starts_with("Could not restore the saved session"));
        assert!(warning.contains("session.json"));
    }
}
