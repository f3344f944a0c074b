//! Configuration file support for talentscout.
//!
//! Settings come from, in priority order: CLI flags, `talentscout.toml` in
//! the working directory, the global `<config dir>/talentscout/config.toml`,
//! and built-in defaults.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use talentscout_agent::ModelType;
use talentscout_core::{Language, DEFAULT_MIN_ANSWER_WORDS};

/// The project config file name
pub const CONFIG_FILE_NAME: &str = "talentscout.toml";

/// Directory under the platform config dir holding the global config
pub const GLOBAL_CONFIG_DIR: &str = "talentscout";

/// The global config file name
pub const GLOBAL_CONFIG_FILE: &str = "config.toml";

/// Environment variables checked for a Gemini API key, in order
pub const API_KEY_ENV_VARS: [&str; 2] = ["GOOGLE_API_KEY", "GEMINI_API_KEY"];

/// Screening tunables shared by both config files
#[derive(Debug, Serialize, Deserialize, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct ScreeningConfig {
    /// Minimum word count for an answer to count as substantive
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_answer_words: Option<usize>,
}

/// Project-level configuration loaded from `talentscout.toml`
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    /// Model backend ("gemini" or "claude")
    pub backend: Option<String>,
    pub model: Option<String>,
    /// Language for new sessions
    pub language: Option<String>,
    pub session_file: Option<PathBuf>,
    /// Gemini API root, for proxies
    pub base_url: Option<String>,
    #[serde(default)]
    pub screening: ScreeningConfig,
}

/// User-level configuration; the only place an API key may be stored
#[derive(Debug, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct GlobalConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backend: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_file: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "ScreeningConfig::is_empty")]
    pub screening: ScreeningConfig,
}

impl ScreeningConfig {
    pub fn is_empty(&self) -> bool {
        self.min_answer_words.is_none()
    }
}

fn load_toml<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    if !path.exists() {
        return Ok(None);
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;

    Ok(Some(config))
}

impl ProjectConfig {
    /// Load configuration from the working directory.
    ///
    /// Returns:
    /// - `Ok(Some(config))` if file exists and parses successfully
    /// - `Ok(None)` if file does not exist
    /// - `Err(...)` if file exists but fails to parse (hard error)
    pub fn load(working_dir: &Path) -> Result<Option<Self>> {
        load_toml(&working_dir.join(CONFIG_FILE_NAME))
    }
}

impl GlobalConfig {
    pub fn path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(GLOBAL_CONFIG_DIR).join(GLOBAL_CONFIG_FILE))
    }

    pub fn exists() -> bool {
        Self::path().is_some_and(|p| p.exists())
    }

    /// Load the global config, same contract as [`ProjectConfig::load`]
    pub fn load() -> Result<Option<Self>> {
        match Self::path() {
            Some(path) => load_toml(&path),
            None => Ok(None),
        }
    }
}

/// Values given on the command line
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub backend: Option<ModelType>,
    pub model: Option<String>,
    pub language: Option<Language>,
    pub session_file: Option<PathBuf>,
    pub min_answer_words: Option<usize>,
}

/// Fully resolved runtime settings
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub backend: ModelType,
    pub model: Option<String>,
    pub language: Language,
    pub session_file: Option<PathBuf>,
    pub min_answer_words: usize,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
}

impl Settings {
    /// Merge every source. `env_api_key` wins over the global config key.
    pub fn resolve(
        cli: &CliOverrides,
        project: Option<&ProjectConfig>,
        global: Option<&GlobalConfig>,
        env_api_key: Option<String>,
    ) -> Result<Self> {
        let backend = match cli.backend {
            Some(backend) => backend,
            None => match project
                .and_then(|p| p.backend.as_deref())
                .or(global.and_then(|g| g.backend.as_deref()))
            {
                Some(name) => name.parse().map_err(anyhow::Error::msg)?,
                None => ModelType::Gemini,
            },
        };

        let language = match cli.language {
            Some(language) => language,
            None => match project
                .and_then(|p| p.language.as_deref())
                .or(global.and_then(|g| g.language.as_deref()))
            {
                Some(name) => name.parse().map_err(anyhow::Error::msg)?,
                None => Language::default(),
            },
        };

        let model = cli
            .model
            .clone()
            .or_else(|| project.and_then(|p| p.model.clone()))
            .or_else(|| global.and_then(|g| g.model.clone()));

        let session_file = cli
            .session_file
            .clone()
            .or_else(|| project.and_then(|p| p.session_file.clone()))
            .or_else(|| global.and_then(|g| g.session_file.clone()));

        let base_url = project
            .and_then(|p| p.base_url.clone())
            .or_else(|| global.and_then(|g| g.base_url.clone()));

        let min_answer_words = cli
            .min_answer_words
            .or(project.and_then(|p| p.screening.min_answer_words))
            .or(global.and_then(|g| g.screening.min_answer_words))
            .unwrap_or(DEFAULT_MIN_ANSWER_WORDS);

        let api_key = env_api_key
            .filter(|k| !k.trim().is_empty())
            .or_else(|| global.and_then(|g| g.api_key.clone()));

        Ok(Self {
            backend,
            model,
            language,
            session_file,
            min_answer_words,
            api_key,
            base_url,
        })
    }
}

/// First non-empty API key among [`API_KEY_ENV_VARS`]
pub fn api_key_from_env() -> Option<String> {
    API_KEY_ENV_VARS
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .find(|key| !key.trim().is_empty())
}
