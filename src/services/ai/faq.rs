use crate::models::SiteContent;
use crate::services::ai::{LlmProvider, Message};

const SYSTEM_PROMPT: &str = r#"You are the FAQ assistant for a photography studio in London that shoots portraits, couples and families at outdoor locations around the city.

Answer the visitor's question using ONLY the site content and studio notes below. If the answer is not there, say you are not sure and suggest using the booking form or contacting the studio.

Rules:
- Reply in the same language as the question (English or Korean)
- Quote package prices exactly as written; never invent discounts or availability
- A 10% deposit confirms a booking; the balance is paid on the day
- Keep answers short and friendly (3 sentences or fewer when possible)
- Plain text only, no markdown
"#;

const MAX_QUESTION_CHARS: usize = 1000;

/// Answers a visitor question from the site content. The call goes out to a
/// remote model, so callers should show a loading state while it runs.
pub async fn generate_response(
    llm: &dyn LlmProvider,
    question: &str,
    admin_context: &str,
    site: &SiteContent,
) -> anyhow::Result<String> {
    let question = question.trim();
    anyhow::ensure!(!question.is_empty(), "question is empty");
    let question: String = question.chars().take(MAX_QUESTION_CHARS).collect();

    let content_json = serde_json::to_string_pretty(site)?;
    let notes = if admin_context.trim().is_empty() {
        String::new()
    } else {
        format!("\n\nStudio notes:\n{}", admin_context.trim())
    };
    let system = format!("{SYSTEM_PROMPT}{notes}\n\nSite content (JSON):\n{content_json}");

    let messages = [Message::user(question)];

    let answer = llm.chat(&system, &messages).await?;
    let answer = answer.trim();
    anyhow::ensure!(!answer.is_empty(), "assistant returned an empty answer");

    Ok(answer.to_string())
}
