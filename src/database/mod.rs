pub mod memory;
pub mod models;
pub mod postgres;

pub use memory::MemoryStore;
pub use models::{document_id, CandidateSummary, Interaction, InterviewTemplate, NewInteraction};
pub use postgres::PostgresStore;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;

/// Keyed document storage for candidate records, interview templates and
/// interaction history.
///
/// Implementations must give per-document read/write isolation and assign
/// interaction sequence numbers that strictly increase in append order.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Raw candidate record as stored by the intake side
    async fn find_candidate(&self, candidate_id: &str) -> Result<Option<Value>>;

    async fn put_candidate(&self, candidate_id: &str, document: Value) -> Result<()>;

    /// All candidates, ordered by id
    async fn list_candidates(&self) -> Result<Vec<CandidateSummary>>;

    /// Insert or wholesale replace the template for `template.candidate_id`
    async fn put_template(&self, template: &InterviewTemplate) -> Result<()>;

    async fn get_template(&self, candidate_id: &str) -> Result<Option<InterviewTemplate>>;

    async fn append_interaction(&self, interaction: NewInteraction) -> Result<Interaction>;

    /// Set the follow-up on the latest interaction matching `question` and
    /// `answer` whose follow-up is still empty, as one atomic step.
    /// Returns the sequence it was attached to, or `None` if nothing matched.
    async fn attach_open_follow_up(
        &self,
        candidate_id: &str,
        question: &str,
        answer: &str,
        follow_up_question: &str,
    ) -> Result<Option<u64>>;

    /// Interactions for one candidate in sequence order
    async fn interactions_for(&self, candidate_id: &str) -> Result<Vec<Interaction>>;
}
