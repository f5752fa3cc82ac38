use log::info;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::database::{DocumentStore, Interaction};
use crate::error::{InterviewError, Result};

/// Aggregate view of a candidate's interview, recomputed on every request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultSummary {
    pub candidate_id: String,
    pub average_score: f64,
    pub feedback: Vec<String>,
    pub interactions: Vec<Interaction>,
}

fn round_two_places(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Mean score over the interactions, rounded to two decimals.
pub fn average_score(interactions: &[Interaction]) -> Option<f64> {
    if interactions.is_empty() {
        return None;
    }
    let total: u32 = interactions.iter().map(|i| u32::from(i.evaluation.score)).sum();
    Some(round_two_places(f64::from(total) / interactions.len() as f64))
}

impl ResultSummary {
    pub fn from_interactions(candidate_id: &str, interactions: Vec<Interaction>) -> Result<Self> {
        let average_score = average_score(&interactions)
            .ok_or_else(|| InterviewError::NoInteractions(candidate_id.to_string()))?;
        let feedback = interactions
            .iter()
            .flat_map(|i| i.evaluation.feedback.iter().cloned())
            .collect();

        Ok(ResultSummary {
            candidate_id: candidate_id.to_string(),
            average_score,
            feedback,
            interactions,
        })
    }
}

/// Builds result summaries from recorded interactions.
pub struct ResultsAggregator {
    store: Arc<dyn DocumentStore>,
}

impl ResultsAggregator {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn aggregate(&self, candidate_id: &str) -> Result<ResultSummary> {
        let interactions = self.store.interactions_for(candidate_id).await?;
        let summary = ResultSummary::from_interactions(candidate_id, interactions)?;
        info!(
            "Candidate {} average score {:.2} over {} interactions",
            candidate_id,
            summary.average_score,
            summary.interactions.len()
        );
        Ok(summary)
    }
}
