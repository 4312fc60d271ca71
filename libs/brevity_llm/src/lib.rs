use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::str::FromStr;
use std::time::Duration;
use tokio::time::timeout;

pub mod error;
pub mod gemini;
pub mod openai;

pub use error::LLMError;

pub type Result<T> = std::result::Result<T, LLMError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LLMProvider {
    Gemini,
    OpenAI,
}

impl LLMProvider {
    pub fn default_model(&self) -> &'static str {
        match self {
            LLMProvider::Gemini => gemini::DEFAULT_MODEL,
            LLMProvider::OpenAI => openai::DEFAULT_MODEL,
        }
    }
}

impl FromStr for LLMProvider {
    type Err = LLMError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "gemini" | "google" => Ok(LLMProvider::Gemini),
            "openai" => Ok(LLMProvider::OpenAI),
            other => Err(LLMError::Configuration(format!(
                "Unknown LLM provider: {}",
                other
            ))),
        }
    }
}

impl fmt::Display for LLMProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LLMProvider::Gemini => write!(f, "gemini"),
            LLMProvider::OpenAI => write!(f, "openai"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Model,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn model(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Model,
            content: content.into(),
        }
    }
}

/// A text-generation backend.
///
/// `chat` receives the whole transcript on every call; implementations must
/// not rely on any state kept on the provider's side.
#[async_trait]
pub trait LLMService {
    async fn generate(&self, prompt: &str) -> Result<String>;

    async fn chat(&self, system_instruction: &str, messages: &[ChatMessage]) -> Result<String>;
}

/// Handle for a multi-turn exchange. The transcript lives here and is
/// replayed to the provider on every turn.
#[derive(Debug, Clone)]
pub struct Conversation {
    system_instruction: String,
    transcript: Vec<ChatMessage>,
}

impl Conversation {
    pub fn new(system_instruction: impl Into<String>) -> Self {
        Self {
            system_instruction: system_instruction.into(),
            transcript: Vec::new(),
        }
    }

    pub fn system_instruction(&self) -> &str {
        &self.system_instruction
    }

    pub fn transcript(&self) -> &[ChatMessage] {
        &self.transcript
    }
}

#[derive(Debug, Clone)]
pub struct ProviderSettings {
    pub provider: LLMProvider,
    pub api_key: String,
    pub org_id: Option<String>,
    pub model: Option<String>,
}

impl ProviderSettings {
    pub fn new(provider: LLMProvider, api_key: impl Into<String>) -> Self {
        Self {
            provider,
            api_key: api_key.into(),
            org_id: None,
            model: None,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_org_id(mut self, org_id: impl Into<String>) -> Self {
        self.org_id = Some(org_id.into());
        self
    }

    fn model_name(&self) -> String {
        self.model
            .clone()
            .unwrap_or_else(|| self.provider.default_model().to_string())
    }
}

#[derive(Debug, Clone)]
pub struct LLMClientConfig {
    pub timeout: Duration,
}

impl Default for LLMClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(180),
        }
    }
}

/// Entry point for the rest of the workspace. Calls are made exactly once;
/// the only guard around them is the configured timeout.
pub struct LLMClient {
    service: Box<dyn LLMService + Send + Sync>,
    config: LLMClientConfig,
}

impl LLMClient {
    pub fn new(settings: ProviderSettings, config: Option<LLMClientConfig>) -> Result<Self> {
        if settings.api_key.trim().is_empty() {
            return Err(LLMError::Unauthorized(format!(
                "No API key configured for {}",
                settings.provider
            )));
        }

        let model = settings.model_name();
        let service: Box<dyn LLMService + Send + Sync> = match settings.provider {
            LLMProvider::Gemini => Box::new(gemini::GeminiService::new(settings.api_key, model)),
            LLMProvider::OpenAI => Box::new(openai::OpenAIService::new(
                settings.api_key,
                settings.org_id,
                model,
            )),
        };

        Ok(Self {
            service,
            config: config.unwrap_or_default(),
        })
    }

    pub fn from_service<S>(service: S, config: Option<LLMClientConfig>) -> Self
    where
        S: LLMService + Send + Sync + 'static,
    {
        Self {
            service: Box::new(service),
            config: config.unwrap_or_default(),
        }
    }

    async fn execute_with_timeout<Fut>(&self, operation_name: &str, operation: Fut) -> Result<String>
    where
        Fut: Future<Output = Result<String>>,
    {
        match timeout(self.config.timeout, operation).await {
            Ok(Ok(text)) if text.trim().is_empty() => {
                tracing::warn!("{} returned an empty response", operation_name);
                Err(LLMError::EmptyResponse)
            }
            Ok(Ok(text)) => Ok(text),
            Ok(Err(e)) => {
                tracing::error!("{} failed: {}", operation_name, e);
                Err(e)
            }
            Err(_) => {
                tracing::error!(
                    "{} timed out after {:?}",
                    operation_name,
                    self.config.timeout
                );
                Err(LLMError::Timeout(self.config.timeout))
            }
        }
    }

    pub async fn generate(&self, prompt: &str) -> Result<String> {
        self.execute_with_timeout("Text generation", self.service.generate(prompt))
            .await
    }

    pub fn create_conversation(&self, system_instruction: &str) -> Conversation {
        Conversation::new(system_instruction)
    }

    /// Sends one user turn. The transcript only grows when the provider
    /// answers, so a failed turn leaves the conversation as it was.
    pub async fn send_turn(&self, conversation: &mut Conversation, text: &str) -> Result<String> {
        self.send_turn_with(conversation, text, |reply| Ok::<_, LLMError>(reply.to_string()))
            .await
    }

    /// Like [`LLMClient::send_turn`], but the exchange is committed to the
    /// transcript only when `accept` takes the reply.
    pub async fn send_turn_with<T, E, F>(
        &self,
        conversation: &mut Conversation,
        text: &str,
        accept: F,
    ) -> std::result::Result<T, E>
    where
        F: FnOnce(&str) -> std::result::Result<T, E>,
        E: From<LLMError>,
    {
        let mut messages = conversation.transcript.clone();
        messages.push(ChatMessage::user(text));

        let reply = self
            .execute_with_timeout(
                "Chat turn",
                self.service
                    .chat(&conversation.system_instruction, &messages),
            )
            .await?;
        let accepted = accept(&reply)?;

        conversation.transcript = messages;
        conversation.transcript.push(ChatMessage::model(reply));

        Ok(accepted)
    }
}
