use serde::Serialize;

use crate::{
    limits::CharLimit,
    text::length::{enforce_limit, logical_len},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactOrigin {
    Generated,
    Refined,
    Edited,
}

/// The current best version of the message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Artifact {
    text: String,
    length: usize,
    max_length: CharLimit,
    origin: ArtifactOrigin,
    version: u32,
}

impl Artifact {
    /// Wraps model output, truncating it to `limit` logical characters.
    pub fn bounded(text: &str, limit: CharLimit, origin: ArtifactOrigin, version: u32) -> Self {
        let text = enforce_limit(text, limit);
        Self {
            length: logical_len(&text),
            text,
            max_length: limit,
            origin,
            version,
        }
    }

    /// A manual edit. User text is kept as typed, even when it is over the
    /// limit.
    pub fn edited(text: impl Into<String>, limit: CharLimit, version: u32) -> Self {
        let text = text.into();
        Self {
            length: logical_len(&text),
            text,
            max_length: limit,
            origin: ArtifactOrigin::Edited,
            version,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn length(&self) -> usize {
        self.length
    }

    pub fn max_length(&self) -> CharLimit {
        self.max_length
    }

    pub fn origin(&self) -> ArtifactOrigin {
        self.origin
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn over_limit(&self) -> bool {
        self.length > self.max_length.get()
    }
}
