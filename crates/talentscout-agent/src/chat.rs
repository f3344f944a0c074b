use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{AgentError, ChatModel};

/// Who produced a turn, in the model's vocabulary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Model,
}

/// One role-tagged turn of model history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: TurnRole,
    pub text: String,
}

impl ChatTurn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::User,
            text: text.into(),
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::Model,
            text: text.into(),
        }
    }
}

/// Merge consecutive turns with the same role and drop empty ones.
///
/// Providers expect strictly alternating turns; a replayed chat log can
/// contain two assistant messages in a row.
pub fn coalesce_turns(turns: impl IntoIterator<Item = ChatTurn>) -> Vec<ChatTurn> {
    let mut out: Vec<ChatTurn> = Vec::new();
    for turn in turns {
        if turn.text.trim().is_empty() {
            continue;
        }
        match out.last_mut() {
            Some(last) if last.role == turn.role => {
                last.text.push_str("\n\n");
                last.text.push_str(&turn.text);
            }
            _ => out.push(turn),
        }
    }
    out
}

/// A stateful multi-turn conversation with a model.
///
/// History only grows on successful exchanges; a failed `send` leaves it
/// untouched.
pub struct ChatSession {
    model: Arc<dyn ChatModel>,
    history: Vec<ChatTurn>,
}

impl ChatSession {
    pub fn new(model: Arc<dyn ChatModel>, history: Vec<ChatTurn>) -> Self {
        Self {
            model,
            history: coalesce_turns(history),
        }
    }

    pub fn history(&self) -> &[ChatTurn] {
        &self.history
    }

    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    /// Replace the whole history (used when the conversation language changes)
    pub fn rebuild(&mut self, history: Vec<ChatTurn>) {
        self.history = coalesce_turns(history);
        debug!(turns = self.history.len(), "Chat history rebuilt");
    }

    /// Send a prompt and record the exchange
    pub async fn send(&mut self, prompt: &str) -> Result<String, AgentError> {
        let request = coalesce_turns(
            self.history
                .iter()
                .cloned()
                .chain(std::iter::once(ChatTurn::user(prompt))),
        );

        debug!(
            model = self.model.name(),
            prompt_len = prompt.len(),
            history_turns = request.len(),
            "Sending prompt"
        );

        let reply = self.model.generate(&request).await?;
        let reply = reply.trim().to_string();
        if reply.is_empty() {
            return Err(AgentError::EmptyResponse);
        }

        self.history = request;
        self.history.push(ChatTurn::model(reply.clone()));
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ModelType;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct EchoModel {
        seen: Mutex<Vec<Vec<ChatTurn>>>,
        fail: bool,
    }

    #[async_trait]
    impl ChatModel for EchoModel {
        fn name(&self) -> &str {
            "echo"
        }

        fn model_type(&self) -> ModelType {
            ModelType::Gemini
        }

        async fn generate(&self, turns: &[ChatTurn]) -> Result<String, AgentError> {
            self.seen.lock().unwrap().push(turns.to_vec());
            if self.fail {
                return Err(AgentError::RequestFailed("offline".into()));
            }
            Ok(format!("  echo: {}  ", turns.last().unwrap().text))
        }

        async fn is_available(&self) -> bool {
            true
        }
    }

    fn echo(fail: bool) -> Arc<EchoModel> {
        Arc::new(EchoModel {
            seen: Mutex::new(Vec::new()),
            fail,
        })
    }

    #[test]
    fn test_coalesce_merges_same_role() {
        let turns = vec![
            ChatTurn::user("a"),
            ChatTurn::model("b"),
            ChatTurn::model("c"),
            ChatTurn::user(""),
            ChatTurn::user("d"),
        ];
        let merged = coalesce_turns(turns);
        assert_eq!(
            merged,
            vec![
                ChatTurn::user("a"),
                ChatTurn::model("b\n\nc"),
                ChatTurn::user("d"),
            ]
        );
    }

    #[tokio::test]
    async fn test_send_records_exchange() {
        let model = echo(false);
        let mut chat = ChatSession::new(
            model.clone(),
            vec![ChatTurn::user("system"), ChatTurn::model("ok")],
        );

        let reply = chat.send("hello").await.unwrap();
        assert_eq!(reply, "echo: hello");
        assert_eq!(chat.history().len(), 4);
        assert_eq!(chat.history()[3], ChatTurn::model("echo: hello"));

        let seen = model.seen.lock().unwrap();
        assert_eq!(seen[0].len(), 3);
        assert_eq!(seen[0][2], ChatTurn::user("hello"));
    }

    #[tokio::test]
    async fn test_send_failure_keeps_history() {
        let mut chat = ChatSession::new(echo(true), vec![ChatTurn::user("system")]);
        let result = chat.send("hello").await;
        assert!(matches!(result, Err(AgentError::RequestFailed(_))));
        assert_eq!(chat.history(), &[ChatTurn::user("system")]);
    }

    #[tokio::test]
    async fn test_send_after_trailing_user_turn_coalesces() {
        let model = echo(false);
        let mut chat = ChatSession::new(model.clone(), vec![ChatTurn::user("earlier")]);
        chat.send("now").await.unwrap();

        let seen = model.seen.lock().unwrap();
        assert_eq!(seen[0], vec![ChatTurn::user("earlier\n\nnow")]);
    }
}
