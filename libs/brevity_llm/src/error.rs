use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LLMError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Model returned an empty response")]
    EmptyResponse,

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("API returned error status: {status}, body: {body}")]
    Api { status: u16, body: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

const AUTH_MARKERS: [&str; 3] = ["api key", "permission denied", "authentication"];

impl LLMError {
    /// Builds an error from a non-success HTTP reply, promoting credential
    /// problems to [`LLMError::Unauthorized`].
    pub fn from_status(status: u16, body: String) -> Self {
        if status == 401 || status == 403 || mentions_credentials(&body) {
            LLMError::Unauthorized(body)
        } else {
            LLMError::Api { status, body }
        }
    }

    /// Classifies a free-form provider message.
    pub fn from_message(message: impl Into<String>) -> Self {
        let message = message.into();
        if mentions_credentials(&message) {
            LLMError::Unauthorized(message)
        } else {
            LLMError::Transport(message)
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, LLMError::Unauthorized(_))
    }
}

fn mentions_credentials(text: &str) -> bool {
    let lowered = text.to_lowercase();
    AUTH_MARKERS.iter().any(|marker| lowered.contains(marker))
}

impl From<reqwest::Error> for LLMError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            return LLMError::from_status(status.as_u16(), err.to_string());
        }
        if err.is_decode() {
            return LLMError::InvalidResponse(err.to_string());
        }
        LLMError::Transport(err.to_string())
    }
}

impl From<async_openai::error::OpenAIError> for LLMError {
    fn from(err: async_openai::error::OpenAIError) -> Self {
        use async_openai::error::OpenAIError;

        match err {
            OpenAIError::ApiError(api) => LLMError::from_message(api.message),
            OpenAIError::InvalidArgument(message) => LLMError::Configuration(message),
            OpenAIError::JSONDeserialize(e) => LLMError::InvalidResponse(e.to_string()),
            other => LLMError::from_message(other.to_string()),
        }
    }
}
