use log::{info, warn};
use std::sync::Arc;
use std::time::Duration;

use super::prompts::code_run_prompt;
use crate::error::{InterviewError, Result};
use crate::llm::{complete_within, TextGenerator};

const SHAPE: &str = "code output";

/// Drop a surrounding Markdown fence (with or without a language tag).
fn strip_code_fence(raw: &str) -> &str {
    let text = raw.trim();
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let body = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest,
    };
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

pub fn clean_output(raw: &str) -> Result<String> {
    let output = strip_code_fence(raw);
    if output.is_empty() {
        return Err(InterviewError::shape(SHAPE, "response is empty"));
    }
    Ok(output.to_string())
}

/// Simulated interpreter for the coding round.
pub struct CodeRunSimulator {
    generator: Arc<dyn TextGenerator>,
    timeout: Duration,
}

impl CodeRunSimulator {
    pub fn new(generator: Arc<dyn TextGenerator>, timeout: Duration) -> Self {
        Self { generator, timeout }
    }

    pub async fn simulate(&self, problem: &str, code: &str) -> Result<String> {
        if code.trim().is_empty() {
            return Err(InterviewError::Validation("code must not be blank".to_string()));
        }

        info!("🐍 Simulating code run ({} bytes)", code.len());
        let prompt = code_run_prompt(problem, code);
        let raw = complete_within(self.generator.as_ref(), &prompt, self.timeout).await?;

        clean_output(&raw).map_err(|e| {
            warn!("Rejected code output: {}", e);
            e
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::ScriptedGenerator;

    #[test]
    fn test_clean_output() {
        assert_eq!(clean_output("```\n1\n4\n9\n```").unwrap(), "1\n4\n9");
        assert_eq!(clean_output("```text\nhello\n```\n").unwrap(), "hello");
        assert_eq!(clean_output("  42 \n").unwrap(), "42");
        assert!(matches!(
            clean_output("```\n```"),
            Err(InterviewError::GenerationShape { .. })
        ));
    }

    #[tokio::test]
    async fn test_blank_code_skips_generator() {
        let scripted = Arc::new(ScriptedGenerator::new(vec!["unused".to_string()]));
        let simulator = CodeRunSimulator::new(scripted.clone(), Duration::from_secs(1));

        let err = simulator.simulate("Print 1", "  \n").await.unwrap_err();
        assert!(matches!(err, InterviewError::Validation(_)));
        assert_eq!(scripted.remaining(), 1);
        assert!(scripted.prompts().is_empty());
    }

    #[tokio::test]
    async fn test_simulate_returns_traceback() {
        let traceback = "Traceback (most recent call last):\n  File \"<stdin>\", line 1, in <module>\nNameError: name 'x' is not defined";
        let scripted = Arc::new(ScriptedGenerator::new(vec![format!("```\n{}\n```", traceback)]));
        let simulator = CodeRunSimulator::new(scripted.clone(), Duration::from_secs(1));

        let output = simulator.simulate("Print x", "print(x)").await.unwrap();
        assert_eq!(output, traceback);
        assert!(scripted.prompts()[0].contains("print(x)"));
    }
}
