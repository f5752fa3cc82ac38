pub mod answers;
pub mod coding;
pub mod engine;
pub mod follow_up;
pub mod profile;
pub mod prompts;
pub mod questions;
pub mod results;
pub mod shape;
pub mod templates;

pub use answers::{AnswerEvaluator, Evaluation};
pub use coding::CodeRunSimulator;
pub use engine::{AnswerOutcome, InterviewEngine};
pub use follow_up::{needs_follow_up, FollowUpGenerator, FOLLOW_UP_THRESHOLD};
pub use profile::{CandidateProfile, ProfileExtractor};
pub use questions::{Category, InterviewScript, QuestionGenerator, QuestionSpec, QUESTION_COUNT};
pub use results::{ResultSummary, ResultsAggregator};
pub use templates::TemplateStore;
