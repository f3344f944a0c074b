use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;

use crate::ChatTurn;

/// Errors that can occur while talking to a model
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Failed to spawn model process: {0}")]
    SpawnFailed(#[from] std::io::Error),

    #[error("Missing credential: {0}")]
    MissingCredential(String),

    #[error("Model request failed: {0}")]
    RequestFailed(String),

    #[error("Model API returned {status}: {message}")]
    Http { status: u16, message: String },

    #[error("Model returned an empty response")]
    EmptyResponse,

    #[error("Model execution failed: {0}")]
    ExecutionFailed(String),
}

/// Configuration shared by every backend
#[derive(Debug, Clone)]
pub struct ModelConfig {
    /// Working directory for process-based backends
    pub working_dir: PathBuf,
    /// Model to use (backend default when None)
    pub model: Option<String>,
    /// API key for HTTP backends
    pub api_key: Option<String>,
    /// API root for HTTP backends (backend default when None)
    pub base_url: Option<String>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            working_dir: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            model: None,
            api_key: None,
            base_url: None,
        }
    }
}

impl ModelConfig {
    pub fn new(working_dir: PathBuf) -> Self {
        Self {
            working_dir,
            ..Default::default()
        }
    }

    pub fn with_model(mut self, model: String) -> Self {
        self.model = Some(model);
        self
    }

    pub fn with_api_key(mut self, api_key: String) -> Self {
        self.api_key = Some(api_key);
        self
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = Some(base_url);
        self
    }
}

/// Supported model backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelType {
    Gemini,
    ClaudeCli,
}

impl std::fmt::Display for ModelType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelType::Gemini => write!(f, "gemini"),
            ModelType::ClaudeCli => write!(f, "claude"),
        }
    }
}

impl std::str::FromStr for ModelType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "gemini" | "google" => Ok(ModelType::Gemini),
            "claude" | "claude-cli" | "claude-code" => Ok(ModelType::ClaudeCli),
            _ => Err(format!("Unknown backend: {}", s)),
        }
    }
}

/// A language model that completes a multi-turn conversation.
///
/// Implementations are stateless: the full history is passed on every call
/// and the caller decides what to keep.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Human-readable name (e.g., "Gemini (gemini-1.5-flash)")
    fn name(&self) -> &str;

    /// The backend type
    fn model_type(&self) -> ModelType;

    /// Produce the next model turn for `turns`, which always ends with a user turn
    async fn generate(&self, turns: &[ChatTurn]) -> Result<String, AgentError>;

    /// Check whether the backend can be used at all
    async fn is_available(&self) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_type_from_str() {
        assert_eq!("Gemini".parse::<ModelType>().unwrap(), ModelType::Gemini);
        assert_eq!("claude-code".parse::<ModelType>().unwrap(), ModelType::ClaudeCli);
        assert!("gpt".parse::<ModelType>().is_err());
    }

    #[test]
    fn test_model_type_display_round_trips() {
        for ty in [ModelType::Gemini, ModelType::ClaudeCli] {
            assert_eq!(ty.to_string().parse::<ModelType>().unwrap(), ty);
        }
    }
}
