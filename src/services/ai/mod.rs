pub mod faq;
pub mod groq;
pub mod ollama;

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Visitors wait on the answer, so slow models fail instead of hanging the widget.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// FAQ answers are a few sentences; this caps runaway generations.
pub const MAX_ANSWER_TOKENS: u32 = 300;

/// Low temperature keeps answers close to the site content.
pub const ANSWER_TEMPERATURE: f64 = 0.2;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

#[async_trait]
pub trait LlmProvider: Send + Sync {
    async fn chat(&self, system_prompt: &str, messages: &[Message]) -> anyhow::Result<String>;
}

fn http_client() -> anyhow::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .context("failed to build LLM HTTP client")
}

/// Chat-completions message list with the system prompt first.
fn chat_messages(system_prompt: &str, messages: &[Message]) -> Vec<Value> {
    std::iter::once(json!({ "role": "system", "content": system_prompt }))
        .chain(
            messages
                .iter()
                .map(|msg| json!({ "role": msg.role, "content": msg.content })),
        )
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_prompt_leads_message_list() {
        let messages = chat_messages("be brief", &[Message::user("Do you shoot in the rain?")]);
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0]["role"], "system");
        assert_eq!(messages[0]["content"], "be brief");
        assert_eq!(messages[1]["role"], "user");
        assert_eq!(messages[1]["content"], "Do you shoot in the rain?");
    }
}
