use brevity_llm::LLMClient;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    artifact::Artifact,
    error::WorkbenchError,
    policy::ContentPolicy,
    refinement::{validate_instruction, RefinementConfig, RefinementLoop, RefinementSession},
    transformer::{BoundedTransformer, TransformRequest},
};

/// An artifact together with the session that edits it.
#[derive(Debug)]
pub struct EditingSession {
    pub artifact: Artifact,
    pub session: RefinementSession,
}

impl EditingSession {
    pub fn id(&self) -> Uuid {
        self.session.id()
    }
}

/// Owns at most one editing session. Every operation takes `&mut self`, so
/// only one request can be in flight at a time.
pub struct Workbench {
    transformer: BoundedTransformer,
    refinement: RefinementLoop,
    current: Option<EditingSession>,
}

impl Workbench {
    pub fn new(client: Arc<LLMClient>, policy: ContentPolicy, config: RefinementConfig) -> Self {
        Self {
            transformer: BoundedTransformer::new(Arc::clone(&client), policy.clone()),
            refinement: RefinementLoop::new(client, policy, config),
            current: None,
        }
    }

    pub fn current(&self) -> Option<&EditingSession> {
        self.current.as_ref()
    }

    /// Generates a new artifact and opens a session for it. Invalid requests
    /// are rejected before anything is discarded; once the request is
    /// dispatched the previous session is gone, whatever the outcome.
    pub async fn submit(
        &mut self,
        request: &TransformRequest,
    ) -> Result<&EditingSession, WorkbenchError> {
        request
            .validate()
            .map_err(|e| WorkbenchError::Transform(e.into()))?;

        if let Some(previous) = self.current.take() {
            tracing::info!("Discarding session {}", previous.id());
        }

        let artifact = self.transformer.transform(request).await?;
        let mut session = self
            .refinement
            .start_session(artifact.max_length(), request.fragments());

        // A failed priming exchange is retried on the first instruction.
        if let Err(e) = self.refinement.seed(&mut session, &artifact).await {
            tracing::warn!("Session {} left unseeded: {}", session.id(), e);
        }

        tracing::info!(
            "Session {} started with a {} character artifact",
            session.id(),
            artifact.length()
        );

        Ok(self.current.insert(EditingSession { artifact, session }))
    }

    pub async fn refine(&mut self, instruction: &str) -> Result<&EditingSession, WorkbenchError> {
        validate_instruction(instruction).map_err(|e| WorkbenchError::Refinement(e.into()))?;

        let editing = self.current.as_mut().ok_or(WorkbenchError::NoSession)?;
        self.refinement
            .seed(&mut editing.session, &editing.artifact)
            .await?;

        let artifact = self
            .refinement
            .apply_instruction(&mut editing.session, &editing.artifact, instruction)
            .await?;
        editing.artifact = artifact;

        Ok(editing)
    }

    /// Replaces the artifact with user-typed text. The session is kept and the
    /// next instruction is applied to this text.
    pub fn edit(&mut self, text: impl Into<String>) -> Result<&EditingSession, WorkbenchError> {
        let editing = self.current.as_mut().ok_or(WorkbenchError::NoSession)?;
        editing.artifact = Artifact::edited(
            text,
            editing.session.limit(),
            editing.artifact.version() + 1,
        );
        Ok(editing)
    }

    pub fn reset(&mut self) {
        if let Some(previous) = self.current.take() {
            tracing::info!("Session {} reset", previous.id());
        }
    }

    /// Fails unless `id` names the live session.
    pub fn ensure_session(&self, id: Uuid) -> Result<&EditingSession, WorkbenchError> {
        match &self.current {
            Some(editing) if editing.id() == id => Ok(editing),
            Some(_) => Err(WorkbenchError::StaleSession(id)),
            None => Err(WorkbenchError::NoSession),
        }
    }
}
