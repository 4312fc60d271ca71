use brevity_llm::{Conversation, LLMClient};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::{fmt, sync::Arc};
use uuid::Uuid;

use crate::{
    artifact::{Artifact, ArtifactOrigin},
    error::{RefinementError, ValidationError},
    limits::CharLimit,
    policy::ContentPolicy,
    prompts::refinement_prompt::RefinementPrompt,
    text::reply::normalize_reply,
    transformer::FixedFragments,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Idle,
    Seeded,
    Refining,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Idle => write!(f, "idle"),
            SessionState::Seeded => write!(f, "seeded"),
            SessionState::Refining => write!(f, "refining"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryEntry {
    pub role: HistoryRole,
    pub display_text: String,
    #[serde(skip)]
    pub full_prompt_text: String,
    pub timestamp: DateTime<Utc>,
    pub failed: bool,
}

impl HistoryEntry {
    fn user(display_text: &str, full_prompt_text: String) -> Self {
        Self {
            role: HistoryRole::User,
            display_text: display_text.to_string(),
            full_prompt_text,
            timestamp: Utc::now(),
            failed: false,
        }
    }

    fn assistant(reply: String) -> Self {
        Self {
            role: HistoryRole::Assistant,
            display_text: reply.clone(),
            full_prompt_text: reply,
            timestamp: Utc::now(),
            failed: false,
        }
    }

    fn failure(error: &RefinementError) -> Self {
        let message = format!("No reply: {}", error);
        Self {
            role: HistoryRole::Assistant,
            display_text: message.clone(),
            full_prompt_text: message,
            timestamp: Utc::now(),
            failed: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefinementConfig {
    /// Send the freshly generated artifact as the first exchange of a session.
    pub prime_conversation: bool,
}

impl Default for RefinementConfig {
    fn default() -> Self {
        Self {
            prime_conversation: true,
        }
    }
}

/// Editing context for one artifact. The limit and the fixed fragments do not
/// change for the lifetime of the session.
#[derive(Debug)]
pub struct RefinementSession {
    id: Uuid,
    limit: CharLimit,
    fragments: FixedFragments,
    fixed_instruction: String,
    state: SessionState,
    history: Vec<HistoryEntry>,
    conversation: Conversation,
}

impl RefinementSession {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn limit(&self) -> CharLimit {
        self.limit
    }

    pub fn fragments(&self) -> &FixedFragments {
        &self.fragments
    }

    pub fn fixed_instruction(&self) -> &str {
        &self.fixed_instruction
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    fn is_ready(&self) -> bool {
        matches!(self.state, SessionState::Seeded | SessionState::Refining)
    }
}

pub fn validate_instruction(instruction: &str) -> Result<&str, ValidationError> {
    let instruction = instruction.trim();
    if instruction.is_empty() {
        return Err(ValidationError::EmptyInstruction);
    }
    Ok(instruction)
}

pub struct RefinementLoop {
    client: Arc<LLMClient>,
    policy: ContentPolicy,
    config: RefinementConfig,
}

impl RefinementLoop {
    pub fn new(client: Arc<LLMClient>, policy: ContentPolicy, config: RefinementConfig) -> Self {
        Self {
            client,
            policy,
            config,
        }
    }

    /// Builds a new idle session. No request is made.
    pub fn start_session(&self, limit: CharLimit, fragments: FixedFragments) -> RefinementSession {
        let fixed_instruction =
            RefinementPrompt::system_instruction(limit, &self.policy, &fragments);
        let conversation = self.client.create_conversation(&fixed_instruction);

        RefinementSession {
            id: Uuid::new_v4(),
            limit,
            fragments,
            fixed_instruction,
            state: SessionState::Idle,
            history: Vec::new(),
            conversation,
        }
    }

    /// Moves an idle session to `Seeded`, priming the conversation with the
    /// artifact when configured to. Sessions that are already seeded are left
    /// as they are.
    pub async fn seed(
        &self,
        session: &mut RefinementSession,
        artifact: &Artifact,
    ) -> Result<(), RefinementError> {
        if session.state != SessionState::Idle {
            return Ok(());
        }

        if self.config.prime_conversation {
            let turn = RefinementPrompt::priming_turn(artifact.text(), &session.fragments);
            session
                .history
                .push(HistoryEntry::user("Start editing this message", turn.clone()));

            match self.client.send_turn(&mut session.conversation, &turn).await {
                Ok(reply) => session
                    .history
                    .push(HistoryEntry::assistant(normalize_reply(&reply))),
                Err(e) => {
                    let error = RefinementError::from(e);
                    tracing::error!("Failed to prime session {}: {}", session.id, error);
                    session.history.push(HistoryEntry::failure(&error));
                    return Err(error);
                }
            }
        }

        session.state = SessionState::Seeded;
        tracing::debug!("Session {} seeded", session.id);
        Ok(())
    }

    /// Applies one instruction to `current` and returns the full replacement.
    /// The current text is always restated in the turn, so hand edits made
    /// between turns are honoured.
    pub async fn apply_instruction(
        &self,
        session: &mut RefinementSession,
        current: &Artifact,
        instruction: &str,
    ) -> Result<Artifact, RefinementError> {
        let instruction = validate_instruction(instruction)?;
        if !session.is_ready() {
            return Err(RefinementError::NotReady(session.state));
        }

        let turn = RefinementPrompt::instruction_turn(
            current.text(),
            instruction,
            session.limit,
            &session.fragments,
        );
        session
            .history
            .push(HistoryEntry::user(instruction, turn.clone()));

        // A reply that is empty once cleaned never reaches the transcript.
        let result = self
            .client
            .send_turn_with(&mut session.conversation, &turn, |reply| {
                let text = normalize_reply(reply);
                if text.is_empty() {
                    Err(RefinementError::EmptyResponse)
                } else {
                    Ok(text)
                }
            })
            .await;

        match result {
            Ok(text) => {
                let artifact = Artifact::bounded(
                    &text,
                    session.limit,
                    ArtifactOrigin::Refined,
                    current.version() + 1,
                );
                session
                    .history
                    .push(HistoryEntry::assistant(artifact.text().to_string()));
                session.state = SessionState::Refining;
                Ok(artifact)
            }
            Err(error) => {
                tracing::error!("Refinement turn in session {} failed: {}", session.id, error);
                session.history.push(HistoryEntry::failure(&error));
                Err(error)
            }
        }
    }
}
