use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::debug;

use crate::{AgentError, ChatModel, ChatTurn, ModelConfig, ModelType, ProcessSpawner, TurnRole};

/// Chat model backed by the `claude` CLI in print mode.
///
/// The CLI has no notion of prior turns, so the history is rendered into a
/// single transcript prompt on every call.
pub struct ClaudeCliModel {
    binary_path: PathBuf,
    config: ModelConfig,
}

impl ClaudeCliModel {
    pub fn new(config: ModelConfig) -> Self {
        Self {
            binary_path: PathBuf::from("claude"),
            config,
        }
    }

    pub fn with_binary_path(mut self, path: PathBuf) -> Self {
        self.binary_path = path;
        self
    }

    pub fn binary_path(&self) -> &Path {
        &self.binary_path
    }
}

/// Render turns as a plain-text transcript ending with a cue for the next reply
pub(crate) fn render_transcript(turns: &[ChatTurn]) -> String {
    let mut parts = vec![
        "You are continuing the conversation below. Reply with the assistant's next message only, without a speaker label."
            .to_string(),
    ];

    for turn in turns {
        let speaker = match turn.role {
            TurnRole::User => "User",
            TurnRole::Model => "Assistant",
        };
        parts.push(format!("{}: {}", speaker, turn.text));
    }

    parts.push("Assistant:".to_string());
    parts.join("\n\n")
}

#[async_trait]
impl ChatModel for ClaudeCliModel {
    fn name(&self) -> &str {
        "Claude CLI"
    }

    fn model_type(&self) -> ModelType {
        ModelType::ClaudeCli
    }

    async fn is_available(&self) -> bool {
        Command::new(&self.binary_path)
            .arg("--version")
            .output()
            .await
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    async fn generate(&self, turns: &[ChatTurn]) -> Result<String, AgentError> {
        let transcript = render_transcript(turns);
        debug!(
            agent = self.name(),
            transcript_len = transcript.len(),
            "Executing claude"
        );

        let mut args = vec!["--print"];

        let model_arg;
        if let Some(ref model) = self.config.model {
            args.push("--model");
            model_arg = model.clone();
            args.push(&model_arg);
        }

        // Transcripts start with arbitrary text; keep them out of option parsing
        args.push("--");
        args.push(&transcript);

        let output = ProcessSpawner::spawn(&self.binary_path, &args, &self.config).await?;

        if !output.success() {
            let detail = if output.stderr.trim().is_empty() {
                format!("claude exited with code {}", output.exit_code)
            } else {
                output.stderr.trim().to_string()
            };
            return Err(AgentError::ExecutionFailed(detail));
        }

        if output.stdout.trim().is_empty() {
            return Err(AgentError::EmptyResponse);
        }

        Ok(output.stdout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_transcript() {
        let transcript = render_transcript(&[
            ChatTurn::user("Extract my details"),
            ChatTurn::model("Sure"),
            ChatTurn::user("John Doe"),
        ]);

        assert!(transcript.contains("User: Extract my details\n\nAssistant: Sure\n\nUser: John Doe"));
        assert!(transcript.ends_with("Assistant:"));
    }

    #[tokio::test]
    async fn test_missing_binary_is_unavailable() {
        let model = ClaudeCliModel::new(ModelConfig::default())
            .with_binary_path(PathBuf::from("/nonexistent/claude-binary"));
        assert!(!model.is_available().await);

        let result = model.generate(&[ChatTurn::user("hi")]).await;
        assert!(matches!(result, Err(AgentError::SpawnFailed(_))));
    }
}
