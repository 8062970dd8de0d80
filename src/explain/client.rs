//! OpenAI-compatible chat-completions client.

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::explain::TextGenerator;

const TEMPERATURE: f32 = 0.3;

pub struct ChatClient {
    client: Client,
    endpoint: String,
    model: String,
}

impl ChatClient {
    pub fn new(base_url: &str, model: &str) -> Result<Self, AppError> {
        let base = base_url.trim().trim_end_matches('/');
        if base.is_empty() {
            return Err(AppError::invalid_input("Service base URL must not be empty."));
        }
        Ok(Self {
            client: Client::new(),
            endpoint: format!("{base}/chat/completions"),
            model: model.to_string(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl TextGenerator for ChatClient {
    fn generate(&self, api_key: &str, system: &str, prompt: &str) -> Result<String, AppError> {
        let body = ChatRequest {
            model: &self.model,
            temperature: TEMPERATURE,
            messages: [
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
        };

        let resp = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .map_err(|e| AppError::service(format!("Explanation request failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            let detail = resp.text().unwrap_or_default();
            tracing::warn!(%status, "explanation service returned an error");
            return Err(AppError::service(format!(
                "Explanation request failed with status {status}: {}",
                detail.trim()
            )));
        }

        let body: ChatResponse = resp
            .json()
            .map_err(|e| AppError::service(format!("Failed to parse explanation response: {e}")))?;

        extract_content(body)
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: [ChatMessage<'a>; 2],
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
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

fn extract_content(body: ChatResponse) -> Result<String, AppError> {
    body.choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .ok_or_else(|| AppError::service("Explanation response contained no message content."))
}
