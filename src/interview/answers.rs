use log::{info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

use super::prompts::evaluation_prompt;
use super::shape::parse_generated;
use crate::error::{InterviewError, Result};
use crate::llm::{complete_within, TextGenerator};

pub const MIN_SCORE: u8 = 1;
pub const MAX_SCORE: u8 = 10;

const SHAPE: &str = "evaluation";

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Evaluation {
    pub question: String,
    pub answer: String,
    pub score: u8, // 1-10
    pub feedback: Vec<String>,
}

#[derive(Deserialize)]
struct EvaluationEnvelope {
    evaluation: EvaluationPayload,
}

#[derive(Deserialize)]
struct EvaluationPayload {
    score: Value,
    #[serde(default)]
    feedback: Vec<String>,
}

fn validate_score(score: &Value) -> Result<u8> {
    let number = score
        .as_i64()
        .ok_or_else(|| InterviewError::shape(SHAPE, format!("score {} is not an integer", score)))?;

    if !(i64::from(MIN_SCORE)..=i64::from(MAX_SCORE)).contains(&number) {
        return Err(InterviewError::shape(
            SHAPE,
            format!("score {} outside {}..={}", number, MIN_SCORE, MAX_SCORE),
        ));
    }
    Ok(number as u8)
}

/// Parse and validate a generated evaluation for `question`/`answer`.
pub fn parse_evaluation(question: &str, answer: &str, raw: &str) -> Result<Evaluation> {
    let envelope: EvaluationEnvelope = parse_generated(raw, SHAPE)?;
    let score = validate_score(&envelope.evaluation.score)?;

    let feedback: Vec<String> = envelope
        .evaluation
        .feedback
        .into_iter()
        .map(|line| line.trim().to_string())
        .filter(|line| !line.is_empty())
        .collect();
    if feedback.is_empty() {
        return Err(InterviewError::shape(SHAPE, "feedback is empty"));
    }

    Ok(Evaluation {
        question: question.to_string(),
        answer: answer.to_string(),
        score,
        feedback,
    })
}

/// Scores answers with the fixed rubric.
pub struct AnswerEvaluator {
    generator: Arc<dyn TextGenerator>,
    timeout: Duration,
}

impl AnswerEvaluator {
    pub fn new(generator: Arc<dyn TextGenerator>, timeout: Duration) -> Self {
        Self { generator, timeout }
    }

    pub async fn evaluate(&self, question: &str, answer: &str) -> Result<Evaluation> {
        let prompt = evaluation_prompt(question, answer);
        let raw = complete_within(self.generator.as_ref(), &prompt, self.timeout).await?;

        let evaluation = parse_evaluation(question, answer, &raw).map_err(|e| {
            warn!("Rejected evaluation: {}", e);
            e
        })?;
        info!("Answer evaluated with score: {}/{}", evaluation.score, MAX_SCORE);
        Ok(evaluation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::ScriptedGenerator;

    #[test]
    fn test_parse_valid_evaluation() {
        let raw = r#"```json
{"evaluation": {"score": 8, "feedback": ["Clear explanation", "  ", "Add an example"]}}
```"#;
        let evaluation = parse_evaluation("Q", "A", raw).unwrap();
        assert_eq!(evaluation.score, 8);
        assert_eq!(evaluation.feedback, vec!["Clear explanation", "Add an example"]);
        assert_eq!(evaluation.question, "Q");
        assert_eq!(evaluation.answer, "A");
    }

    #[test]
    fn test_parse_ignores_braces_around_payload() {
        let trailing = "```json\n{\"evaluation\":{\"score\":7,\"feedback\":[\"ok\"]}}\n```\nNote: the score uses the {1-10} scale.";
        assert_eq!(parse_evaluation("Q", "A", trailing).unwrap().score, 7);

        let leading = "Scoring {rubric} applied:\n{\"evaluation\":{\"score\":3,\"feedback\":[\"thin\"]}}";
        let evaluation = parse_evaluation("Q", "A", leading).unwrap();
        assert_eq!(evaluation.score, 3);
        assert_eq!(evaluation.feedback, vec!["thin"]);
    }

    #[test]
    fn test_score_out_of_range() {
        for raw in [
            r#"{"evaluation": {"score": 11, "feedback": ["x"]}}"#,
            r#"{"evaluation": {"score": 0, "feedback": ["x"]}}"#,
            r#"{"evaluation": {"score": -3, "feedback": ["x"]}}"#,
        ] {
            let err = parse_evaluation("Q", "A", raw).unwrap_err();
            assert!(matches!(err, InterviewError::GenerationShape { what: "evaluation", .. }));
        }
    }

    #[test]
    fn test_score_must_be_integer() {
        for raw in [
            r#"{"evaluation": {"score": 7.5, "feedback": ["x"]}}"#,
            r#"{"evaluation": {"score": "8", "feedback": ["x"]}}"#,
            r#"{"evaluation": {"score": null, "feedback": ["x"]}}"#,
        ] {
            let err = parse_evaluation("Q", "A", raw).unwrap_err();
            assert!(err.to_string().contains("not an integer"), "{}", err);
        }
    }

    #[test]
    fn test_feedback_shape() {
        let missing = r#"{"evaluation": {"score": 5}}"#;
        assert!(parse_evaluation("Q", "A", missing)
            .unwrap_err()
            .to_string()
            .contains("feedback is empty"));

        let wrong_type = r#"{"evaluation": {"score": 5, "feedback": [1, 2]}}"#;
        assert!(matches!(
            parse_evaluation("Q", "A", wrong_type),
            Err(InterviewError::GenerationShape { .. })
        ));
    }

    #[tokio::test]
    async fn test_evaluate_boundaries() {
        let scripted = Arc::new(ScriptedGenerator::new(vec![
            r#"{"evaluation": {"score": 1, "feedback": ["Off topic"]}}"#.to_string(),
            r#"{"evaluation": {"score": 10, "feedback": ["Excellent"]}}"#.to_string(),
        ]));
        let evaluator = AnswerEvaluator::new(scripted.clone(), Duration::from_secs(1));

        assert_eq!(evaluator.evaluate("Q1", "A1").await.unwrap().score, 1);
        assert_eq!(evaluator.evaluate("Q2", "A2").await.unwrap().score, 10);
        assert!(scripted.prompts()[1].contains("Question: Q2"));
    }
}
