use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;

use super::TextGenerator;
use crate::error::{InterviewError, Result};

/// Generator that replays canned responses in order.
///
/// Stands in for the chat-completions client in tests. Every prompt it
/// receives is kept so callers can inspect what was sent.
#[derive(Default)]
pub struct ScriptedGenerator {
    responses: Mutex<VecDeque<String>>,
    prompts: Mutex<Vec<String>>,
    stall: bool,
}

impl ScriptedGenerator {
    pub fn new(responses: Vec<String>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            prompts: Mutex::new(Vec::new()),
            stall: false,
        }
    }

    /// A generator that never answers
    pub fn stalled() -> Self {
        Self {
            stall: true,
            ..Self::default()
        }
    }

    pub fn push(&self, response: impl Into<String>) {
        self.responses.lock().push_back(response.into());
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }

    pub fn remaining(&self) -> usize {
        self.responses.lock().len()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().push(prompt.to_string());

        if self.stall {
            std::future::pending::<()>().await;
        }

        self.responses
            .lock()
            .pop_front()
            .ok_or_else(|| InterviewError::Generation("no scripted response left".to_string()))
    }
}
