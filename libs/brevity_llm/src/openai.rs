use async_openai::{
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;

use crate::{ChatMessage, ChatRole, LLMService, Result};

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

pub struct OpenAIService {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAIService {
    pub fn new(api_key: String, org_id: Option<String>, model: String) -> Self {
        let mut config = OpenAIConfig::new().with_api_key(api_key);
        if let Some(org_id) = org_id {
            config = config.with_org_id(org_id);
        }
        let client = Client::with_config(config);
        Self { client, model }
    }

    async fn complete(&self, messages: Vec<ChatCompletionRequestMessage>) -> Result<String> {
        let request = CreateChatCompletionRequestArgs::default()
            .model(self.model.as_str())
            .messages(messages)
            .temperature(0.3)
            .build()?;

        let response = self.client.chat().create(request).await?;

        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default();

        Ok(content)
    }
}

fn to_request_message(message: &ChatMessage) -> Result<ChatCompletionRequestMessage> {
    let message: ChatCompletionRequestMessage = match message.role {
        ChatRole::User => ChatCompletionRequestUserMessageArgs::default()
            .content(message.content.as_str())
            .build()?
            .into(),
        ChatRole::Model => ChatCompletionRequestAssistantMessageArgs::default()
            .content(message.content.as_str())
            .build()?
            .into(),
    };
    Ok(message)
}

#[async_trait]
impl LLMService for OpenAIService {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let message = to_request_message(&ChatMessage::user(prompt))?;
        self.complete(vec![message]).await
    }

    async fn chat(&self, system_instruction: &str, messages: &[ChatMessage]) -> Result<String> {
        let mut request_messages: Vec<ChatCompletionRequestMessage> =
            Vec::with_capacity(messages.len() + 1);
        request_messages.push(
            ChatCompletionRequestSystemMessageArgs::default()
                .content(system_instruction)
                .build()?
                .into(),
        );
        for message in messages {
            request_messages.push(to_request_message(message)?);
        }
        self.complete(request_messages).await
    }
}
