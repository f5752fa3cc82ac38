use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::interview::{Evaluation, QuestionSpec};

/// Stored interview script for one candidate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterviewTemplate {
    pub candidate_id: String,
    pub greeting: String,
    pub questions: Vec<QuestionSpec>,
    pub updated_at: DateTime<Utc>,
}

/// One evaluated answer, the append-only unit of interview history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interaction {
    pub id: Uuid,
    /// Store-assigned, strictly increasing in append order
    pub sequence: u64,
    pub candidate_id: String,
    pub question: String,
    pub answer: String,
    pub evaluation: Evaluation,
    pub follow_up_question: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// Interaction fields supplied by the caller; the store fills in the rest
#[derive(Debug, Clone)]
pub struct NewInteraction {
    pub candidate_id: String,
    pub evaluation: Evaluation,
}

impl NewInteraction {
    pub fn new(candidate_id: impl Into<String>, evaluation: Evaluation) -> Self {
        Self {
            candidate_id: candidate_id.into(),
            evaluation,
        }
    }

    pub fn into_interaction(self, sequence: u64) -> Interaction {
        Interaction {
            id: Uuid::new_v4(),
            sequence,
            candidate_id: self.candidate_id,
            question: self.evaluation.question.clone(),
            answer: self.evaluation.answer.clone(),
            evaluation: self.evaluation,
            follow_up_question: None,
            timestamp: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateSummary {
    pub id: String,
    pub name: String,
}

/// Identifier of a raw candidate document: `_id` or `id`, as a string, a
/// number, or an extended-JSON `{"$oid": ...}` object.
pub fn document_id(document: &Value) -> Option<String> {
    let raw = document.get("_id").or_else(|| document.get("id"))?;
    match raw {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Object(map) => map
            .get("$oid")
            .and_then(Value::as_str)
            .map(|s| s.to_string()),
        _ => None,
    }
}
