use brevity_llm::LLMError;
use thiserror::Error;
use uuid::Uuid;

use crate::refinement::SessionState;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Source text must not be empty")]
    EmptySource,

    #[error("Character limit {value} is outside the allowed range {min}..={max}")]
    LimitOutOfRange { value: i64, min: usize, max: usize },

    #[error("Refinement instruction must not be empty")]
    EmptyInstruction,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransformError {
    #[error("Invalid request: {0}")]
    Validation(#[from] ValidationError),

    #[error("Text generation is unavailable or unauthorized: {0}")]
    Auth(String),

    #[error("The model returned an empty response")]
    EmptyResponse,

    #[error("Transformation failed: {0}")]
    Failed(LLMError),
}

impl From<LLMError> for TransformError {
    fn from(err: LLMError) -> Self {
        match err {
            LLMError::Unauthorized(message) => TransformError::Auth(message),
            LLMError::EmptyResponse => TransformError::EmptyResponse,
            other => TransformError::Failed(other),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RefinementError {
    #[error("Invalid instruction: {0}")]
    Validation(#[from] ValidationError),

    #[error("Refinement session is {0}, it must be seeded before instructions are applied")]
    NotReady(SessionState),

    #[error("The model returned an empty response")]
    EmptyResponse,

    #[error("Refinement failed: {0}")]
    Failed(LLMError),
}

impl From<LLMError> for RefinementError {
    fn from(err: LLMError) -> Self {
        match err {
            LLMError::EmptyResponse => RefinementError::EmptyResponse,
            other => RefinementError::Failed(other),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WorkbenchError {
    #[error(transparent)]
    Transform(#[from] TransformError),

    #[error(transparent)]
    Refinement(#[from] RefinementError),

    #[error("No message is being edited")]
    NoSession,

    #[error("Session {0} is no longer active")]
    StaleSession(Uuid),
}
