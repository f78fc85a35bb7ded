// Optional AI content review via an OpenAI-compatible chat completions API

use crate::config::ReviewConfig;
use crate::error::ReviewError;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

pub const SYSTEM_PROMPT: &str =
    "You are an email QA assistant for financial services marketing.";

const REVIEW_INSTRUCTION: &str =
    "Review this email content for grammar, tone, clarity and compliance risks:";

/// How the review section of a report ended up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "detail", rename_all = "snake_case")]
pub enum ReviewOutcome {
    /// Not attempted; carries the reason shown to the user.
    Disabled(String),
    Completed(String),
    Failed(String),
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

pub struct ReviewClient {
    /// Pre-computed `"Bearer <key>"` header value.
    auth_header: String,
    endpoint: String,
    model: String,
    client: Client,
}

impl ReviewClient {
    /// `None` when the config has the review switched off or no key.
    pub fn from_config(config: &ReviewConfig) -> Result<Option<Self>, ReviewError> {
        let Some(key) = config.api_key.as_deref().filter(|_| config.is_enabled()) else {
            return Ok(None);
        };

        let client = Client::builder()
            .timeout(config.timeout())
            .connect_timeout(std::time::Duration::from_secs(10))
            .build()?;

        Ok(Some(Self {
            auth_header: format!("Bearer {}", key.trim()),
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            model: config.model.clone(),
            client,
        }))
    }

    pub fn user_prompt(email_text: &str) -> String {
        format!("{}\n\n{}", REVIEW_INSTRUCTION, email_text)
    }

    pub async fn review(&self, email_text: &str) -> Result<String, ReviewError> {
        let prompt = Self::user_prompt(email_text);
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                Message {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                Message {
                    role: "user",
                    content: &prompt,
                },
            ],
        };

        debug!("Requesting review from {} ({})", self.endpoint, self.model);
        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", &self.auth_header)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ReviewError::Status {
                status: status.as_u16(),
                body: body.chars().take(500).collect(),
            });
        }

        let chat: ChatResponse = response.json().await?;
        chat.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or(ReviewError::EmptyResponse)
    }
}

/// Run the review if configured. Never fails: problems land in the outcome.
pub async fn run_review(config: &ReviewConfig, email_text: &str) -> ReviewOutcome {
    if !config.enabled {
        return ReviewOutcome::Disabled("disabled by configuration".to_string());
    }
    if !config.has_credential() {
        warn!("No AI review API key configured; skipping content review");
        return ReviewOutcome::Disabled(format!(
            "no API key configured (set review.api_key or {})",
            crate::config::API_KEY_ENV
        ));
    }

    let client = match ReviewClient::from_config(config) {
        Ok(Some(client)) => client,
        Ok(None) => return ReviewOutcome::Disabled("not configured".to_string()),
        Err(e) => return ReviewOutcome::Failed(e.to_string()),
    };

    match client.review(email_text).await {
        Ok(text) => {
            info!("AI review completed ({} chars)", text.len());
            ReviewOutcome::Completed(text)
        }
        Err(e) => {
            warn!("AI review failed: {}", e);
            ReviewOutcome::Failed(e.to_string())
        }
    }
}
