//! # talentscout-agent
//!
//! The LLM collaborator behind the screening conversation.
//!
//! A [`ChatModel`] turns a list of role-tagged turns into one completion.
//! A [`ChatSession`] owns the running multi-turn history on top of a model
//! and is the only thing the controller talks to.
//!
//! ## Backends
//!
//! - [`GeminiModel`] - Gemini `generateContent` REST API
//! - [`ClaudeCliModel`] - the `claude` CLI in non-interactive print mode

mod chat;
mod claude;
mod gemini;
mod spawner;
mod traits;

use std::sync::Arc;

pub use chat::{coalesce_turns, ChatSession, ChatTurn, TurnRole};
pub use claude::ClaudeCliModel;
pub use gemini::{GeminiModel, DEFAULT_GEMINI_MODEL};
pub use spawner::{ProcessOutput, ProcessSpawner};
pub use traits::{AgentError, ChatModel, ModelConfig, ModelType};

/// Create a chat model by type.
///
/// Fails with [`AgentError::MissingCredential`] when the backend needs an API
/// key and none was configured.
pub fn create_model(
    model_type: ModelType,
    config: &ModelConfig,
) -> Result<Arc<dyn ChatModel>, AgentError> {
    match model_type {
        ModelType::Gemini => {
            let api_key = config
                .api_key
                .clone()
                .filter(|k| !k.trim().is_empty())
                .ok_or_else(|| {
                    AgentError::MissingCredential(
                        "Gemini API key not found. Set GOOGLE_API_KEY or api_key in the global config"
                            .to_string(),
                    )
                })?;
            let model = config
                .model
                .clone()
                .unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string());
            let mut gemini = GeminiModel::new(api_key, model);
            if let Some(ref base_url) = config.base_url {
                gemini = gemini.with_base_url(base_url.clone());
            }
            Ok(Arc::new(gemini))
        }
        ModelType::ClaudeCli => Ok(Arc::new(ClaudeCliModel::new(config.clone()))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gemini_requires_api_key() {
        let config = ModelConfig::default();
        let result = create_model(ModelType::Gemini, &config);
        assert!(matches!(result, Err(AgentError::MissingCredential(_))));

        let blank = ModelConfig::default().with_api_key("   ".to_string());
        let result = create_model(ModelType::Gemini, &blank);
        assert!(matches!(result, Err(AgentError::MissingCredential(_))));
    }

    #[test]
    fn test_create_models() {
        let config = ModelConfig::default().with_api_key("key".to_string());
        let gemini = create_model(ModelType::Gemini, &config).unwrap();
        assert_eq!(gemini.model_type(), ModelType::Gemini);

        let claude = create_model(ModelType::ClaudeCli, &ModelConfig::default()).unwrap();
        assert_eq!(claude.model_type(), ModelType::ClaudeCli);
    }

    #[tokio::test]
    async fn test_gemini_uses_configured_base_url() {
        let config = ModelConfig::default()
            .with_api_key("SECRET_KEY_123".to_string())
            .with_base_url("http://127.0.0.1:9/v1beta/models".to_string());
        let gemini = create_model(ModelType::Gemini, &config).unwrap();

        let err = gemini.generate(&[ChatTurn::user("hi")]).await.unwrap_err();
        assert!(matches!(err, AgentError::RequestFailed(_)));
        assert!(!err.to_string().contains("SECRET_KEY_123"));
    }
}
