use chrono::Utc;
use log::info;
use std::sync::Arc;

use super::questions::QuestionSpec;
use crate::database::{DocumentStore, InterviewTemplate};
use crate::error::{InterviewError, Result};

/// Persists generated interview scripts keyed by candidate id.
pub struct TemplateStore {
    store: Arc<dyn DocumentStore>,
}

impl TemplateStore {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Replace any previous script for the candidate.
    pub async fn store(
        &self,
        candidate_id: &str,
        greeting: &str,
        questions: &[QuestionSpec],
    ) -> Result<()> {
        let template = InterviewTemplate {
            candidate_id: candidate_id.to_string(),
            greeting: greeting.to_string(),
            questions: questions.to_vec(),
            updated_at: Utc::now(),
        };
        self.store.put_template(&template).await?;
        info!("Stored interview template for candidate {}", candidate_id);
        Ok(())
    }

    /// Fetch the stored script. An empty stored script is returned as-is.
    pub async fn fetch(&self, candidate_id: &str) -> Result<(String, Vec<QuestionSpec>)> {
        let template = self
            .store
            .get_template(candidate_id)
            .await?
            .ok_or_else(|| InterviewError::not_found("Interview template", candidate_id))?;
        Ok((template.greeting, template.questions))
    }
}
