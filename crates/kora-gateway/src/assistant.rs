//! Staking assistant gateway
//!
//! Thin client over a chat-completion API. Each request carries the
//! product system prompt plus the most recent conversation turns; no
//! streaming, the full reply comes back in one response.

use async_trait::async_trait;
use kora_core::{KoraError, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Turns of history sent with each request, newest last
pub const MAX_HISTORY_TURNS: usize = 10;

const SYSTEM_PROMPT: &str = "You are the Kora staking assistant. Answer questions about \
     delegating KOR to orchestrators, expected earnings, and fees. Be \
     concise and never invent rates: quote only the figures provided in \
     the conversation.";

/// One prior exchange in the conversation
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChatTurn {
    /// "user" or "assistant"
    pub role: String,
    pub content: String,
}

/// Chat completion behind the assistant feature
#[async_trait]
pub trait AssistantClient: Send + Sync {
    /// Answer `message` given prior `history` (oldest first)
    async fn ask(&self, message: &str, history: &[ChatTurn]) -> Result<String>;
}

/// [`AssistantClient`] backed by an OpenAI-compatible completion API
pub struct HttpAssistantClient {
    api_url: String,
    api_key: String,
    model: String,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct CompletionRequest {
    model: String,
    messages: Vec<ApiMessage>,
    stream: bool,
}

#[derive(Serialize)]
struct ApiMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: String,
}

impl HttpAssistantClient {
    pub fn new(api_url: String, api_key: String, model: String) -> Self {
        Self {
            api_url,
            api_key,
            model,
            client: reqwest::Client::new(),
        }
    }

    fn build_messages(message: &str, history: &[ChatTurn]) -> Vec<ApiMessage> {
        let mut messages = vec![ApiMessage {
            role: "system".to_string(),
            content: SYSTEM_PROMPT.to_string(),
        }];

        let start = history.len().saturating_sub(MAX_HISTORY_TURNS);
        for turn in &history[start..] {
            messages.push(ApiMessage {
                role: turn.role.clone(),
                content: turn.content.clone(),
            });
        }

        messages.push(ApiMessage {
            role: "user".to_string(),
            content: message.to_string(),
        });
        messages
    }
}

#[async_trait]
impl AssistantClient for HttpAssistantClient {
    async fn ask(&self, message: &str, history: &[ChatTurn]) -> Result<String> {
        if message.trim().is_empty() {
            return Err(KoraError::MissingField("message"));
        }

        let request = CompletionRequest {
            model: self.model.clone(),
            messages: Self::build_messages(message, history),
            stream: false,
        };
        debug!(turns = request.messages.len(), "assistant request");

        let response = self
            .client
            .post(format!("{}/v1/chat/completions", self.api_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| KoraError::Assistant(format!("completion request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(KoraError::Assistant(format!(
                "completion API returned {}: {}",
                status, body
            )));
        }

        let parsed: CompletionResponse = response
            .json()
            .await
            .map_err(|e| KoraError::Assistant(format!("malformed completion response: {}", e)))?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| KoraError::Assistant("completion response had no choices".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn turn(role: &str, content: &str) -> ChatTurn {
        ChatTurn {
            role: role.to_string(),
            content: content.to_string(),
        }
    }

    #[test]
    fn test_history_is_capped_at_recent_turns() {
        let history: Vec<ChatTurn> = (0..25)
            .map(|i| turn(if i % 2 == 0 { "user" } else { "assistant" }, &format!("turn {}", i)))
            .collect();

        let messages = HttpAssistantClient::build_messages("latest", &history);
        // system + capped history + new message
        assert_eq!(messages.len(), 1 + MAX_HISTORY_TURNS + 1);
        assert_eq!(messages[1].content, "turn 15");
        assert_eq!(messages.last().map(|m| m.content.as_str()), Some("latest"));
    }

    #[test]
    fn test_short_history_sent_in_full() {
        let history = vec![turn("user", "hi"), turn("assistant", "hello")];
        let messages = HttpAssistantClient::build_messages("next", &history);
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0].role, "system");
    }

    #[tokio::test]
    async fn test_empty_message_rejected() {
        let client = HttpAssistantClient::new(
            "http://127.0.0.1:1".to_string(),
            "k".to_string(),
            "gpt-4o-mini".to_string(),
        );
        let result = client.ask("  ", &[]).await;
        assert!(matches!(result, Err(KoraError::MissingField("message"))));
    }
}
