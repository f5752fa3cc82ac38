use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use super::answers::{AnswerEvaluator, Evaluation};
use super::coding::CodeRunSimulator;
use super::follow_up::{needs_follow_up, FollowUpGenerator};
use super::profile::ProfileExtractor;
use super::questions::{InterviewScript, QuestionGenerator};
use super::results::{ResultSummary, ResultsAggregator};
use super::templates::TemplateStore;
use crate::database::{CandidateSummary, DocumentStore, NewInteraction};
use crate::error::Result;
use crate::llm::TextGenerator;

/// Result of scoring one submitted answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerOutcome {
    pub evaluation: Evaluation,
    pub needs_follow_up: bool,
    pub sequence: u64,
}

/// Request-level interview operations over an injected store and generator.
///
/// The engine holds no per-interview state; it is built once and shared
/// behind `Arc` by every request handler.
pub struct InterviewEngine {
    store: Arc<dyn DocumentStore>,
    profiles: ProfileExtractor,
    questions: QuestionGenerator,
    templates: TemplateStore,
    evaluator: AnswerEvaluator,
    follow_ups: FollowUpGenerator,
    results: ResultsAggregator,
    coding: CodeRunSimulator,
}

impl InterviewEngine {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        generator: Arc<dyn TextGenerator>,
        timeout: Duration,
    ) -> Self {
        info!(
            "Interview engine using generator '{}' with {:?} timeout",
            generator.name(),
            timeout
        );
        InterviewEngine {
            profiles: ProfileExtractor::new(store.clone()),
            questions: QuestionGenerator::new(generator.clone(), timeout),
            templates: TemplateStore::new(store.clone()),
            evaluator: AnswerEvaluator::new(generator.clone(), timeout),
            follow_ups: FollowUpGenerator::new(generator.clone(), timeout),
            results: ResultsAggregator::new(store.clone()),
            coding: CodeRunSimulator::new(generator, timeout),
            store,
        }
    }

    /// Extract the profile, generate a script and store it as the
    /// candidate's template.
    pub async fn prepare_interview(&self, candidate_id: &str) -> Result<InterviewScript> {
        info!("🎯 Preparing interview for candidate {}", candidate_id);
        let profile = self.profiles.extract(candidate_id).await?;
        let (script, _raw) = self.questions.generate(&profile).await?;
        self.templates
            .store(candidate_id, &script.greeting, &script.questions)
            .await?;
        Ok(script)
    }

    pub async fn interview_script(&self, candidate_id: &str) -> Result<InterviewScript> {
        let (greeting, questions) = self.templates.fetch(candidate_id).await?;
        Ok(InterviewScript {
            candidate_id: candidate_id.to_string(),
            greeting,
            questions,
        })
    }

    /// Score an answer and record it in the candidate's history.
    pub async fn submit_answer(
        &self,
        candidate_id: &str,
        question: &str,
        answer: &str,
    ) -> Result<AnswerOutcome> {
        let evaluation = self.evaluator.evaluate(question, answer).await?;
        let interaction = self
            .store
            .append_interaction(NewInteraction::new(candidate_id, evaluation))
            .await?;

        let needs_follow_up = needs_follow_up(&interaction.evaluation);
        info!(
            "📝 Recorded answer #{} for {} (score {}, follow-up: {})",
            interaction.sequence, candidate_id, interaction.evaluation.score, needs_follow_up
        );
        Ok(AnswerOutcome {
            evaluation: interaction.evaluation,
            needs_follow_up,
            sequence: interaction.sequence,
        })
    }

    /// Generate a follow-up and attach it to the latest matching interaction
    /// that does not have one yet.
    pub async fn follow_up(
        &self,
        candidate_id: &str,
        original_question: &str,
        previous_answer: &str,
    ) -> Result<String> {
        let text = self
            .follow_ups
            .generate_follow_up(original_question, previous_answer)
            .await?;

        let attached = self
            .store
            .attach_open_follow_up(candidate_id, original_question, previous_answer, &text)
            .await?;
        match attached {
            Some(sequence) => info!(
                "Attached follow-up to interaction #{} for {}",
                sequence, candidate_id
            ),
            None => warn!(
                "No open interaction for {} matches the follow-up request",
                candidate_id
            ),
        }
        Ok(text)
    }

    pub async fn results(&self, candidate_id: &str) -> Result<ResultSummary> {
        self.results.aggregate(candidate_id).await
    }

    pub async fn list_candidates(&self) -> Result<Vec<CandidateSummary>> {
        self.store.list_candidates().await
    }

    pub async fn run_code(&self, problem: &str, code: &str) -> Result<String> {
        self.coding.simulate(problem, code).await
    }
}
