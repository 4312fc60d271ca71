use brevity_llm::LLMClient;
use serde::Deserialize;
use std::sync::Arc;

use crate::{
    artifact::{Artifact, ArtifactOrigin},
    error::{TransformError, ValidationError},
    limits::{CharLimit, DEFAULT_LIMIT},
    policy::ContentPolicy,
    prompts::transform_prompt::TransformPrompt,
    text::reply::{normalize_fragment, normalize_reply},
};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TransformRequest {
    pub source_text: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub cta: Option<String>,
    #[serde(default = "default_max_length")]
    pub max_length: i64,
}

fn default_max_length() -> i64 {
    DEFAULT_LIMIT as i64
}

/// Title and call to action that open and close every version of a message.
/// Blank fragments are stored as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FixedFragments {
    pub title: Option<String>,
    pub cta: Option<String>,
}

impl FixedFragments {
    pub fn new(title: Option<&str>, cta: Option<&str>) -> Self {
        Self {
            title: normalize_fragment(title),
            cta: normalize_fragment(cta),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.cta.is_none()
    }
}

impl TransformRequest {
    pub fn new(source_text: impl Into<String>, max_length: i64) -> Self {
        Self {
            source_text: source_text.into(),
            title: None,
            cta: None,
            max_length,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_cta(mut self, cta: impl Into<String>) -> Self {
        self.cta = Some(cta.into());
        self
    }

    /// Checks the request without touching the network.
    pub fn validate(&self) -> Result<CharLimit, ValidationError> {
        if self.source_text.trim().is_empty() {
            return Err(ValidationError::EmptySource);
        }
        CharLimit::new(self.max_length)
    }

    pub fn fragments(&self) -> FixedFragments {
        FixedFragments::new(self.title.as_deref(), self.cta.as_deref())
    }
}

pub struct BoundedTransformer {
    client: Arc<LLMClient>,
    policy: ContentPolicy,
}

impl BoundedTransformer {
    pub fn new(client: Arc<LLMClient>, policy: ContentPolicy) -> Self {
        Self { client, policy }
    }

    pub fn policy(&self) -> &ContentPolicy {
        &self.policy
    }

    /// Produces version 0 of an artifact. One attempt is made; the reply is
    /// truncated if the model ignored the length rule.
    pub async fn transform(&self, request: &TransformRequest) -> Result<Artifact, TransformError> {
        let limit = request.validate()?;

        let fragments = request.fragments();
        let prompt = TransformPrompt::get_prompt(
            &request.source_text,
            fragments.title.as_deref(),
            fragments.cta.as_deref(),
            limit,
            &self.policy,
        );

        tracing::info!(
            "Transforming {} characters of source text to at most {}",
            crate::logical_len(&request.source_text),
            limit
        );

        let reply = self.client.generate(&prompt).await?;
        let text = normalize_reply(&reply);
        if text.is_empty() {
            return Err(TransformError::EmptyResponse);
        }

        Ok(Artifact::bounded(&text, limit, ArtifactOrigin::Generated, 0))
    }
}
