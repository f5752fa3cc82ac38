use log::{info, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;
use std::time::Duration;

use super::answers::Evaluation;
use super::prompts::follow_up_prompt;
use crate::error::{InterviewError, Result};
use crate::llm::{complete_within, TextGenerator};

/// Answers scoring below this get a follow-up question
pub const FOLLOW_UP_THRESHOLD: u8 = 6;

/// Longest follow-up accepted from the generator, in characters
pub const MAX_FOLLOW_UP_CHARS: usize = 1_000;

const SHAPE: &str = "follow-up question";

static LEADING_LABEL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*(?:\*\*)?\s*follow[\s-]?up(?:\s+question)?\s*(?:\*\*)?\s*:\s*(?:\*\*)?\s*")
        .expect("follow-up label pattern is valid")
});

pub fn needs_follow_up(evaluation: &Evaluation) -> bool {
    evaluation.score < FOLLOW_UP_THRESHOLD
}

/// Trim a freeform follow-up and enforce the non-empty and length bounds.
pub fn clean_follow_up(raw: &str) -> Result<String> {
    let text = LEADING_LABEL.replace(raw.trim(), "");
    let text = text.trim();
    let text = text
        .strip_prefix('"')
        .and_then(|t| t.strip_suffix('"'))
        .unwrap_or(text)
        .trim();

    if text.is_empty() {
        return Err(InterviewError::shape(SHAPE, "response is empty"));
    }
    let length = text.chars().count();
    if length > MAX_FOLLOW_UP_CHARS {
        return Err(InterviewError::shape(
            SHAPE,
            format!("response is {} characters, limit is {}", length, MAX_FOLLOW_UP_CHARS),
        ));
    }
    Ok(text.to_string())
}

/// Writes follow-up questions for weak answers.
pub struct FollowUpGenerator {
    generator: Arc<dyn TextGenerator>,
    timeout: Duration,
}

impl FollowUpGenerator {
    pub fn new(generator: Arc<dyn TextGenerator>, timeout: Duration) -> Self {
        Self { generator, timeout }
    }

    pub async fn generate_follow_up(
        &self,
        original_question: &str,
        previous_answer: &str,
    ) -> Result<String> {
        let prompt = follow_up_prompt(original_question, previous_answer);
        let raw = complete_within(self.generator.as_ref(), &prompt, self.timeout).await?;

        let follow_up = clean_follow_up(&raw).map_err(|e| {
            warn!("Rejected follow-up: {}", e);
            e
        })?;
        info!(
            "Generated follow-up: {}",
            follow_up.chars().take(50).collect::<String>()
        );
        Ok(follow_up)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::ScriptedGenerator;

    fn scored(score: u8) -> Evaluation {
        Evaluation {
            question: "Q".to_string(),
            answer: "A".to_string(),
            score,
            feedback: vec!["f".to_string()],
        }
    }

    #[test]
    fn test_threshold_boundary() {
        assert!(needs_follow_up(&scored(1)));
        assert!(needs_follow_up(&scored(5)));
        assert!(!needs_follow_up(&scored(6)));
        assert!(!needs_follow_up(&scored(10)));
    }

    #[test]
    fn test_clean_follow_up() {
        assert_eq!(
            clean_follow_up("  Follow-up question: \"What slowed you down most?\" \n").unwrap(),
            "What slowed you down most?"
        );
        assert_eq!(
            clean_follow_up("**Follow up:** How did you test it?").unwrap(),
            "How did you test it?"
        );
        assert_eq!(clean_follow_up("Plain question?").unwrap(), "Plain question?");
    }

    #[test]
    fn test_empty_and_oversized_are_rejected() {
        assert!(matches!(
            clean_follow_up("   \n"),
            Err(InterviewError::GenerationShape { .. })
        ));
        assert!(matches!(
            clean_follow_up("Follow-up: \"\""),
            Err(InterviewError::GenerationShape { .. })
        ));

        let long = "why ".repeat(300);
        let err = clean_follow_up(&long).unwrap_err();
        assert!(err.to_string().contains("limit is 1000"));
    }

    #[tokio::test]
    async fn test_generate_follow_up_uses_both_inputs() {
        let scripted = Arc::new(ScriptedGenerator::new(vec![
            "Great start! Which part of the migration was hardest?".to_string(),
        ]));
        let generator = FollowUpGenerator::new(scripted.clone(), Duration::from_secs(1));

        let text = generator
            .generate_follow_up("How did you migrate the database?", "We used dumps.")
            .await
            .unwrap();
        assert_eq!(text, "Great start! Which part of the migration was hardest?");

        let prompt = &scripted.prompts()[0];
        assert!(prompt.contains("How did you migrate the database?"));
        assert!(prompt.contains("We used dumps."));
    }
}
