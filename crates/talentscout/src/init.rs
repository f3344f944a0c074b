//! Interactive setup for talentscout.
//!
//! Writes the global config file with the chosen backend, default language
//! and, for Gemini, the API key.

use anyhow::Result;
use colored::Colorize;
use dialoguer::{Password, Select};
use std::fs;

use talentscout_agent::{create_model, ModelConfig, ModelType};
use talentscout_core::Language;

use crate::config::{api_key_from_env, GlobalConfig, GLOBAL_CONFIG_DIR, GLOBAL_CONFIG_FILE};

/// Backend info for display and config
struct BackendInfo {
    display_name: &'static str,
    model_type: ModelType,
}

const BACKENDS: &[BackendInfo] = &[
    BackendInfo {
        display_name: "Gemini API",
        model_type: ModelType::Gemini,
    },
    BackendInfo {
        display_name: "Claude CLI",
        model_type: ModelType::ClaudeCli,
    },
];

/// Render the global config file body
fn render_config(backend: ModelType, language: Language, api_key: Option<&str>) -> Result<String> {
    let config = GlobalConfig {
        backend: Some(backend.to_string()),
        language: Some(language.to_string()),
        api_key: api_key.map(String::from),
        ..Default::default()
    };
    let mut content = toml::to_string(&config)?;

    content.push_str("\n# model = \"\"  # Optional: override the backend's default model\n");
    if api_key.is_none() && backend == ModelType::Gemini {
        content.push_str("# api_key = \"\"  # Or set GOOGLE_API_KEY\n");
    }
    content.push_str("\n[screening]\n# min_answer_words = 15\n");
    Ok(content)
}

pub async fn handle_init() -> Result<()> {
    eprintln!("{}", "Setting up talentscout...".bold());
    eprintln!();

    // Step 1: Report which backends are usable right now
    eprintln!("{}", "Checking for available backends...".dimmed());

    let env_key = api_key_from_env();
    for info in BACKENDS {
        let ready = match info.model_type {
            ModelType::Gemini => env_key.is_some(),
            ModelType::ClaudeCli => {
                let config = ModelConfig::default();
                match create_model(info.model_type, &config) {
                    Ok(model) => model.is_available().await,
                    Err(_) => false,
                }
            }
        };
        if ready {
            eprintln!(
                "  {} {} ({})",
                "✓".bright_green(),
                info.display_name,
                info.model_type
            );
        } else {
            eprintln!("  {} {} (not configured)", "✗".dimmed(), info.display_name);
        }
    }
    eprintln!();

    // Step 2: Pick backend and language
    let items: Vec<&str> = BACKENDS.iter().map(|b| b.display_name).collect();
    let selection = Select::new()
        .with_prompt("Select your model backend")
        .items(&items)
        .default(0)
        .interact()?;
    let backend = BACKENDS[selection].model_type;

    let languages: Vec<&str> = Language::ALL.iter().map(|l| l.name()).collect();
    let selection = Select::new()
        .with_prompt("Default screening language")
        .items(&languages)
        .default(0)
        .interact()?;
    let language = Language::ALL[selection];

    // Step 3: API key, only when Gemini is chosen and the env has none
    let api_key = if backend == ModelType::Gemini && env_key.is_none() {
        let key: String = Password::new()
            .with_prompt("Gemini API key (leave empty to use GOOGLE_API_KEY later)")
            .allow_empty_password(true)
            .interact()?;
        Some(key).filter(|k| !k.trim().is_empty())
    } else {
        None
    };

    // Step 4: Write global config
    let config_dir = dirs::config_dir()
        .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?
        .join(GLOBAL_CONFIG_DIR);

    fs::create_dir_all(&config_dir)?;

    let config_path = config_dir.join(GLOBAL_CONFIG_FILE);

    if config_path.exists() {
        eprintln!(
            "{} Config already exists at {}",
            "⚠".bright_yellow(),
            config_path.display()
        );

        let overwrite = Select::new()
            .with_prompt("Overwrite existing config?")
            .items(&["No, keep existing", "Yes, replace it"])
            .default(0)
            .interact()?;

        if overwrite == 0 {
            eprintln!();
            eprintln!("Keeping existing config. Edit it manually if needed:");
            eprintln!("  {}", config_path.display().to_string().dimmed());
            return Ok(());
        }
    }

    fs::write(
        &config_path,
        render_config(backend, language, api_key.as_deref())?,
    )?;

    eprintln!();
    eprintln!(
        "{} Config saved to {}",
        "✓".bright_green(),
        config_path.display()
    );

    print_getting_started();

    Ok(())
}

/// Print the getting started guide
pub fn print_getting_started() {
    eprintln!();
    eprintln!("{}", "Getting started:".bold());
    eprintln!(
        "  {} Start a screening: {}",
        "1.".dimmed(),
        "talentscout".bright_cyan()
    );
    eprintln!(
        "  {} Type {} inside the chat for commands",
        "2.".dimmed(),
        "/help".bright_cyan()
    );
    eprintln!(
        "  {} Export a transcript: {}",
        "3.".dimmed(),
        "talentscout export screening.md".bright_cyan()
    );
}

/// Check if this appears to be first run (no global config)
pub fn is_first_run() -> bool {
    !GlobalConfig::exists()
}
