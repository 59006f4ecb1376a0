use anyhow::Context;
use async_trait::async_trait;
use serde_json::json;

use super::{
    chat_messages, http_client, LlmProvider, Message, ANSWER_TEMPERATURE, MAX_ANSWER_TOKENS,
};

const GROQ_CHAT_URL: &str = "https://api.groq.com/openai/v1/chat/completions";

/// Groq's OpenAI-compatible chat completions endpoint.
pub struct GroqProvider {
    api_key: String,
    model: String,
    client: reqwest::Client,
}

impl GroqProvider {
    pub fn new(api_key: String, model: String) -> anyhow::Result<Self> {
        Ok(Self {
            api_key,
            model,
            client: http_client()?,
        })
    }
}

#[async_trait]
impl LlmProvider for GroqProvider {
    async fn chat(&self, system_prompt: &str, messages: &[Message]) -> anyhow::Result<String> {
        let body = json!({
            "model": self.model,
            "messages": chat_messages(system_prompt, messages),
            "temperature": ANSWER_TEMPERATURE,
            "max_tokens": MAX_ANSWER_TOKENS,
        });

        let resp = self
            .client
            .post(GROQ_CHAT_URL)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .context("failed to call Groq API")?;

        let status = resp.status();
        let data: serde_json::Value = resp
            .json()
            .await
            .context("failed to parse Groq response")?;

        if !status.is_success() {
            tracing::warn!(status = %status, model = %self.model, "Groq request failed");
            anyhow::bail!("Groq API error ({status}): {}", data["error"]["message"]);
        }

        data["choices"][0]["message"]["content"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| anyhow::anyhow!("missing content in Groq response"))
    }
}
