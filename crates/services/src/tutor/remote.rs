use std::env;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::TutorFeedbackService;
use super::context::ExplanationContext;
use crate::error::TutorError;

const SYSTEM_PROMPT: &str = "You are a warm, patient math tutor for third graders learning \
fractions as parts of a whole. Answer in two or three short sentences.";

#[derive(Clone, Debug)]
pub struct TutorConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
}

impl TutorConfig {
    /// Reads `FRACTION_TUTOR_API_KEY`, `FRACTION_TUTOR_BASE_URL` and
    /// `FRACTION_TUTOR_MODEL`. Returns `None` without an API key.
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let api_key = env::var("FRACTION_TUTOR_API_KEY").ok()?;
        if api_key.trim().is_empty() {
            return None;
        }
        let base_url = env::var("FRACTION_TUTOR_BASE_URL")
            .unwrap_or_else(|_| "https://api.openai.com/v1".into());
        let model = env::var("FRACTION_TUTOR_MODEL").unwrap_or_else(|_| "gpt-4o-mini".into());
        Some(Self {
            base_url,
            api_key,
            model,
        })
    }
}

/// Tutor backed by an OpenAI-compatible chat completions endpoint.
#[derive(Clone)]
pub struct RemoteTutor {
    client: Client,
    config: Option<TutorConfig>,
}

impl RemoteTutor {
    #[must_use]
    pub fn from_env() -> Self {
        Self::new(TutorConfig::from_env())
    }

    #[must_use]
    pub fn new(config: Option<TutorConfig>) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    #[must_use]
    pub fn enabled(&self) -> bool {
        self.config.is_some()
    }

    async fn complete(&self, prompt: String) -> Result<String, TutorError> {
        let config = self.config.as_ref().ok_or(TutorError::Disabled)?;

        let url = format!("{}/chat/completions", config.base_url.trim_end_matches('/'));
        let payload = ChatRequest {
            model: config.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: 0.4,
        };

        let response = self
            .client
            .post(url)
            .bearer_auth(&config.api_key)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(TutorError::HttpStatus(response.status()));
        }

        let body: ChatResponse = response.json().await?;
        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|text| !text.trim().is_empty())
            .ok_or(TutorError::EmptyResponse)?;

        Ok(content.trim().to_string())
    }
}

#[async_trait]
impl TutorFeedbackService for RemoteTutor {
    async fn greeting(&self) -> Result<String, TutorError> {
        self.complete(
            "Greet a learner who is about to practise fractions of a set and of a length. \
             One cheerful sentence."
                .to_string(),
        )
        .await
    }

    async fn explain(&self, context: &ExplanationContext) -> Result<String, TutorError> {
        self.complete(explain_prompt(context)?).await
    }
}

fn explain_prompt(context: &ExplanationContext) -> Result<String, TutorError> {
    let facts = serde_json::to_string(context)
        .map_err(|err| TutorError::Unavailable(err.to_string()))?;
    let verdict = if context.outcome {
        "The answer is correct. Praise the learner and restate why it works."
    } else {
        "The answer is wrong. Do not give the answer away; point at the step to rethink."
    };
    Ok(format!(
        "A learner answered this problem (JSON): {facts}\n{verdict}"
    ))
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Debug, Deserialize)]
struct ChatMessageResponse {
    content: Option<String>,
}
