use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::{ChatMessage, ChatRole, LLMError, LLMService, Result};

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<ResponseContent>,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

pub struct GeminiService {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiService {
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            model,
            base_url: API_BASE.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }

    async fn generate_content(&self, request: &GenerateContentRequest) -> Result<String> {
        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let error_text = response.text().await.unwrap_or_default();
            return Err(LLMError::from_status(status, error_text));
        }

        let body: GenerateContentResponse = response.json().await?;
        Ok(first_candidate_text(body))
    }
}

fn text_content(role: Option<&'static str>, text: &str) -> Content {
    Content {
        role,
        parts: vec![Part {
            text: text.to_string(),
        }],
    }
}

fn role_name(role: ChatRole) -> &'static str {
    match role {
        ChatRole::User => "user",
        ChatRole::Model => "model",
    }
}

/// Joins the text parts of the first candidate. A response without
/// candidates yields an empty string, which the client reports as empty.
fn first_candidate_text(response: GenerateContentResponse) -> String {
    response
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect::<Vec<String>>()
                .join("")
        })
        .unwrap_or_default()
}

#[async_trait]
impl LLMService for GeminiService {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let request = GenerateContentRequest {
            contents: vec![text_content(Some("user"), prompt)],
            system_instruction: None,
        };
        self.generate_content(&request).await
    }

    async fn chat(&self, system_instruction: &str, messages: &[ChatMessage]) -> Result<String> {
        let request = GenerateContentRequest {
            contents: messages
                .iter()
                .map(|message| text_content(Some(role_name(message.role)), &message.content))
                .collect(),
            system_instruction: Some(text_content(None, system_instruction)),
        };
        self.generate_content(&request).await
    }
}
