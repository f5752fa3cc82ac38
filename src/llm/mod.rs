//! Text-generation collaborator
//!
//! Every component that needs a completion receives a `TextGenerator` at
//! construction and calls it through [`complete_within`], which bounds the
//! call with a timeout.

pub mod openai;
pub mod scripted;

pub use openai::{OpenAIClient, OpenAIModel};
pub use scripted::ScriptedGenerator;

use async_trait::async_trait;
use log::warn;
use std::time::Duration;

use crate::error::{InterviewError, Result};

/// A service that turns a prompt into a text completion.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Provider name used in logs
    fn name(&self) -> &str;

    async fn complete(&self, prompt: &str) -> Result<String>;
}

/// Run one completion, failing with `GenerationTimeout` once `limit` elapses.
pub async fn complete_within(
    generator: &dyn TextGenerator,
    prompt: &str,
    limit: Duration,
) -> Result<String> {
    match tokio::time::timeout(limit, generator.complete(prompt)).await {
        Ok(result) => result,
        Err(_) => {
            warn!("{} did not answer within {:?}", generator.name(), limit);
            Err(InterviewError::GenerationTimeout(limit))
        }
    }
}
