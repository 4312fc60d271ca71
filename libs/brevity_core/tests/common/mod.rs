#![allow(dead_code)]

use async_trait::async_trait;
use brevity_core::prompts::{
    refinement_prompt::{CURRENT_MESSAGE_HEADER, INSTRUCTION_HEADER},
    transform_prompt::{CTA_HEADER, SOURCE_HEADER, TITLE_HEADER},
};
use brevity_llm::{ChatMessage, LLMClient, LLMError, LLMService, Result};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

#[derive(Default)]
pub struct Script {
    pub replies: VecDeque<Result<String>>,
    pub prompts: Vec<String>,
    pub chats: Vec<(String, Vec<ChatMessage>)>,
}

impl Script {
    pub fn calls(&self) -> usize {
        self.prompts.len() + self.chats.len()
    }

    pub fn last_turn(&self) -> &str {
        let (_, messages) = self.chats.last().expect("no chat turn recorded");
        &messages.last().expect("empty chat turn").content
    }
}

/// Replays canned replies in order and records every request.
pub struct ScriptedService {
    script: Arc<Mutex<Script>>,
}

impl ScriptedService {
    pub fn new(replies: Vec<Result<String>>) -> (Self, Arc<Mutex<Script>>) {
        let script = Arc::new(Mutex::new(Script {
            replies: replies.into(),
            ..Script::default()
        }));
        (
            Self {
                script: Arc::clone(&script),
            },
            script,
        )
    }

    fn next(script: &mut Script) -> Result<String> {
        script
            .replies
            .pop_front()
            .unwrap_or_else(|| Err(LLMError::Transport("script exhausted".to_string())))
    }
}

#[async_trait]
impl LLMService for ScriptedService {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let mut script = self.script.lock().unwrap();
        script.prompts.push(prompt.to_string());
        Self::next(&mut script)
    }

    async fn chat(&self, system_instruction: &str, messages: &[ChatMessage]) -> Result<String> {
        let mut script = self.script.lock().unwrap();
        script
            .chats
            .push((system_instruction.to_string(), messages.to_vec()));
        Self::next(&mut script)
    }
}

/// Deterministic stand-in for a model: generation echoes title, source and
/// call to action on separate lines. A chat turn echoes the current message
/// with the instruction appended to its body, keeping any title first and any
/// call to action last.
pub struct EchoService;

pub fn section<'a>(prompt: &'a str, header: &str) -> Option<&'a str> {
    let start = prompt.find(header)? + header.len() + 1;
    let rest = &prompt[start..];
    let end = rest.find("\n\n").unwrap_or(rest.len());
    Some(&rest[..end])
}

#[async_trait]
impl LLMService for EchoService {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let parts: Vec<&str> = [TITLE_HEADER, SOURCE_HEADER, CTA_HEADER]
            .iter()
            .filter_map(|header| section(prompt, header))
            .collect();
        Ok(parts.join("\n"))
    }

    async fn chat(&self, _system_instruction: &str, messages: &[ChatMessage]) -> Result<String> {
        let turn = &messages.last().expect("empty chat").content;
        let title = section(turn, TITLE_HEADER);
        let cta = section(turn, CTA_HEADER);
        let current = section(turn, CURRENT_MESSAGE_HEADER).unwrap_or_default();

        let mut body = current;
        if let Some(title) = title {
            body = body.strip_prefix(title).unwrap_or(body).trim_start_matches('\n');
        }
        if let Some(cta) = cta {
            body = body.strip_suffix(cta).unwrap_or(body).trim_end_matches('\n');
        }
        let body = match section(turn, INSTRUCTION_HEADER) {
            Some(instruction) => format!("{} {}", body, instruction),
            None => body.to_string(),
        };

        let parts: Vec<&str> = [title, Some(body.as_str()), cta]
            .into_iter()
            .flatten()
            .collect();
        Ok(parts.join("\n"))
    }
}

pub fn client<S>(service: S) -> Arc<LLMClient>
where
    S: LLMService + Send + Sync + 'static,
{
    Arc::new(LLMClient::from_service(service, None))
}
