mod config;
mod init;
mod repl;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use dialoguer::Confirm;
use tracing::info;

use talentscout_agent::{create_model, ModelConfig, ModelType};
use talentscout_core::{transcript, Language, Session};
use talentscout_logging::{init_tracing, LogFormat, Logger};
use talentscout_store::SessionStore;

use crate::config::{api_key_from_env, CliOverrides, GlobalConfig, ProjectConfig, Settings};

#[derive(Parser, Debug)]
#[command(
    name = "talentscout",
    about = "Conversational technical screening assistant",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Model backend
    #[arg(long, value_enum, global = true)]
    backend: Option<BackendChoice>,

    /// Model to use (backend specific)
    #[arg(short, long, global = true)]
    model: Option<String>,

    /// Language for a new session
    #[arg(short, long, global = true)]
    language: Option<String>,

    /// Session snapshot path (default: <data dir>/talentscout/session.json)
    #[arg(long, global = true)]
    session_file: Option<PathBuf>,

    /// Minimum words for an answer to count as detailed
    #[arg(long, global = true)]
    min_answer_words: Option<usize>,

    /// Status line format
    #[arg(long, value_enum, default_value = "pretty", global = true)]
    log_format: LogFormatChoice,

    /// Diagnostic log level (RUST_LOG overrides)
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    /// Diagnostic log file (default: <data dir>/talentscout/talentscout.log)
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// Also append screening events as JSON lines to this file
    #[arg(long, global = true)]
    event_log: Option<PathBuf>,

    /// Hide screening status lines in the terminal
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start or resume the screening chat (default)
    Chat,
    /// Interactive setup of the global config
    Init,
    /// Delete the saved session
    Reset {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Write the saved session as a Markdown transcript
    Export {
        /// Output file
        path: PathBuf,
    },
    /// Print a summary of the saved session
    Show,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum BackendChoice {
    Gemini,
    Claude,
}

impl From<BackendChoice> for ModelType {
    fn from(choice: BackendChoice) -> Self {
        match choice {
            BackendChoice::Gemini => ModelType::Gemini,
            BackendChoice::Claude => ModelType::ClaudeCli,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormatChoice {
    Pretty,
    Json,
    Compact,
}

impl From<LogFormatChoice> for LogFormat {
    fn from(choice: LogFormatChoice) -> Self {
        match choice {
            LogFormatChoice::Pretty => LogFormat::Pretty,
            LogFormatChoice::Json => LogFormat::Json,
            LogFormatChoice::Compact => LogFormat::Compact,
        }
    }
}

fn default_log_file() -> Option<PathBuf> {
    dirs::data_dir().map(|dir| dir.join("talentscout").join("talentscout.log"))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_format: LogFormat = cli.log_format.into();
    let log_file = cli.log_file.clone().or_else(default_log_file);
    let _guard = init_tracing(&cli.log_level, log_format, log_file.as_deref());

    match cli.command {
        Some(Commands::Init) => init::handle_init().await,
        Some(Commands::Reset { yes }) => handle_reset(&open_store(&cli)?.1, yes),
        Some(Commands::Export { ref path }) => handle_export(&open_store(&cli)?.1, path),
        Some(Commands::Show) => handle_show(&open_store(&cli)?.1),
        Some(Commands::Chat) | None => {
            let (settings, store) = open_store(&cli)?;
            let logger = build_logger(log_format, cli.event_log.as_deref(), cli.quiet)?;
            handle_chat(settings, store, logger).await
        }
    }
}

/// Status-line logger, with an optional JSON-lines event file
fn build_logger(format: LogFormat, event_log: Option<&Path>, quiet: bool) -> Result<Logger> {
    let logger = match event_log {
        Some(path) => Logger::with_file(format, path)
            .with_context(|| format!("Failed to open event log {}", path.display()))?,
        None => Logger::new(format),
    };
    Ok(if quiet { logger.quiet() } else { logger })
}

/// Resolve settings from every config source and open the session store
fn open_store(cli: &Cli) -> Result<(Settings, SessionStore)> {
    let working_dir = std::env::current_dir().context("Failed to get current directory")?;
    let settings = resolve_settings(cli, &working_dir)?;

    let store = match settings.session_file.clone() {
        Some(path) => SessionStore::with_path(path),
        None => SessionStore::new()?,
    };
    Ok((settings, store))
}

fn resolve_settings(cli: &Cli, working_dir: &Path) -> Result<Settings> {
    let project = ProjectConfig::load(working_dir)?;
    let global = GlobalConfig::load()?;

    let language = cli
        .language
        .as_deref()
        .map(|name| name.parse::<Language>().map_err(anyhow::Error::msg))
        .transpose()?;

    let overrides = CliOverrides {
        backend: cli.backend.map(Into::into),
        model: cli.model.clone(),
        language,
        session_file: cli.session_file.clone(),
        min_answer_words: cli.min_answer_words,
    };

    Settings::resolve(
        &overrides,
        project.as_ref(),
        global.as_ref(),
        api_key_from_env(),
    )
}

async fn handle_chat(settings: Settings, store: SessionStore, logger: Logger) -> Result<()> {
    let working_dir = std::env::current_dir().context("Failed to get current directory")?;
    let mut model_config = ModelConfig::new(working_dir);
    if let Some(ref model) = settings.model {
        model_config = model_config.with_model(model.clone());
    }
    if let Some(ref key) = settings.api_key {
        model_config = model_config.with_api_key(key.clone());
    }
    if let Some(ref base_url) = settings.base_url {
        model_config = model_config.with_base_url(base_url.clone());
    }

    let model = match create_model(settings.backend, &model_config) {
        Ok(model) => model,
        Err(e) => {
            if init::is_first_run() {
                eprintln!(
                    "{} Run {} to configure a backend.",
                    "→".bright_cyan(),
                    "talentscout init".bright_cyan()
                );
            }
            return Err(e).context("Failed to create model backend");
        }
    };

    if !model.is_available().await {
        anyhow::bail!(
            "Backend '{}' is not available. Make sure it's installed and in PATH.",
            model.name()
        );
    }

    info!(backend = %settings.backend, model = model.name(), "Starting screening chat");

    let logger = Arc::new(logger);
    let mut repl = repl::Repl::new(model, store, logger, &settings);
    repl.run().await
}

fn handle_reset(store: &SessionStore, yes: bool) -> Result<()> {
    if !store.exists() {
        eprintln!("No saved session at {}", store.path().display());
        return Ok(());
    }

    let confirmed = yes
        || Confirm::new()
            .with_prompt("Delete the saved session?")
            .default(false)
            .interact()?;

    if confirmed {
        store.reset()?;
        eprintln!("{} Session deleted", "✓".bright_green());
    }
    Ok(())
}

fn load_saved(store: &SessionStore) -> Result<Session> {
    store
        .try_load()
        .with_context(|| format!("Failed to read {}", store.path().display()))?
        .ok_or_else(|| anyhow::anyhow!("No saved session at {}", store.path().display()))
}

fn handle_export(store: &SessionStore, path: &Path) -> Result<()> {
    let session = load_saved(store)?;
    std::fs::write(path, transcript::to_markdown(&session))
        .with_context(|| format!("Failed to write {}", path.display()))?;
    eprintln!(
        "{} Transcript written to {}",
        "✓".bright_green(),
        path.display()
    );
    Ok(())
}

fn handle_show(store: &SessionStore) -> Result<()> {
    let session = load_saved(store)?;

    eprintln!("{}", "Saved Session".bold());
    eprintln!("  {:<12} {}", "Path:".dimmed(), store.path().display());
    eprintln!("  {:<12} {}", "Status:".dimmed(), session.phase.label());
    eprintln!("  {:<12} {}", "Language:".dimmed(), session.language);
    eprintln!("  {:<12} {}", "Messages:".dimmed(), session.messages.len());

    if let Some(interview) = session.phase.interview() {
        let complete = interview.answers.values().filter(|r| r.complete).count();
        eprintln!(
            "  {:<12} {} of {} answered in detail, on question {}",
            "Questions:".dimmed(),
            complete,
            interview.questions.len(),
            (interview.current + 1).min(interview.questions.len())
        );
    }

    eprintln!();
    repl::print_candidate_info(&session);
    Ok(())
}
