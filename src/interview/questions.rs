use log::{info, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use super::profile::CandidateProfile;
use super::prompts::question_set_prompt;
use super::shape::{normalize_whitespace, parse_generated};
use crate::error::{InterviewError, Result};
use crate::llm::{complete_within, TextGenerator};

/// Number of questions in every interview script
pub const QUESTION_COUNT: usize = 10;

const SHAPE: &str = "question set";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Basic,
    Intermediate,
    Advanced,
    ThoughtProcess,
    Situational,
    PersonalSkills,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Basic,
        Category::Intermediate,
        Category::Advanced,
        Category::ThoughtProcess,
        Category::Situational,
        Category::PersonalSkills,
    ];

    /// How many questions of this category a script must contain
    pub fn expected_count(self) -> usize {
        match self {
            Category::Basic => 3,
            Category::Intermediate | Category::Advanced => 2,
            Category::ThoughtProcess | Category::Situational | Category::PersonalSkills => 1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Basic => "basic",
            Category::Intermediate => "intermediate",
            Category::Advanced => "advanced",
            Category::ThoughtProcess => "thought_process",
            Category::Situational => "situational",
            Category::PersonalSkills => "personal_skills",
        }
    }

    /// Lenient match on a free-form label such as "thought process" or "Personal-Skills"
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.to_lowercase().replace(['_', '-'], " ");
        let label = normalize_whitespace(&label);
        match label.as_str() {
            "basic" => Some(Category::Basic),
            "intermediate" => Some(Category::Intermediate),
            "advanced" => Some(Category::Advanced),
            "thought process" => Some(Category::ThoughtProcess),
            "situational" | "situation based" | "situational based" => Some(Category::Situational),
            "personal skills" | "personal skill" | "personal" => Some(Category::PersonalSkills),
            _ => None,
        }
    }

    /// Category of the question at `index` in the canonical ordering
    pub fn for_position(index: usize) -> Option<Self> {
        match index {
            0..=2 => Some(Category::Basic),
            3 | 4 => Some(Category::Intermediate),
            5 | 6 => Some(Category::Advanced),
            7 => Some(Category::ThoughtProcess),
            8 => Some(Category::Situational),
            9 => Some(Category::PersonalSkills),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionSpec {
    pub text: String,
    pub category: Category,
}

impl QuestionSpec {
    pub fn new(text: impl Into<String>, category: Category) -> Self {
        Self {
            text: text.into(),
            category,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterviewScript {
    pub candidate_id: String,
    pub greeting: String,
    pub questions: Vec<QuestionSpec>,
}

impl InterviewScript {
    /// Check the greeting, question count and category distribution.
    pub fn validate(&self) -> Result<()> {
        if self.greeting.trim().is_empty() {
            return Err(InterviewError::shape(SHAPE, "greeting is empty"));
        }
        if self.questions.len() != QUESTION_COUNT {
            return Err(InterviewError::shape(
                SHAPE,
                format!(
                    "expected {} questions, got {}",
                    QUESTION_COUNT,
                    self.questions.len()
                ),
            ));
        }
        if let Some(position) = self.questions.iter().position(|q| q.text.trim().is_empty()) {
            return Err(InterviewError::shape(
                SHAPE,
                format!("question {} is empty", position + 1),
            ));
        }

        let mut counts: BTreeMap<Category, usize> = BTreeMap::new();
        for question in &self.questions {
            *counts.entry(question.category).or_default() += 1;
        }
        for category in Category::ALL {
            let found = counts.get(&category).copied().unwrap_or(0);
            if found != category.expected_count() {
                return Err(InterviewError::shape(
                    SHAPE,
                    format!(
                        "expected {} {} questions, got {}",
                        category.expected_count(),
                        category.as_str(),
                        found
                    ),
                ));
            }
        }
        Ok(())
    }
}

#[derive(Deserialize)]
struct ScriptEnvelope {
    interview: ScriptPayload,
}

#[derive(Deserialize)]
struct ScriptPayload {
    #[serde(alias = "greeting")]
    greeting_script: String,
    questions: Vec<RawQuestion>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawQuestion {
    Tagged { category: String, text: String },
    Labelled(String),
}

// "Question 8 (thought process): ..." / "Q3. ..."
static QUESTION_LABEL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*q(?:uestion)?\s*\d+\s*(?:\(([^)]*)\))?\s*[:.)\-]\s*")
        .expect("question label pattern is valid")
});

fn repair_question(index: usize, raw: RawQuestion) -> Result<QuestionSpec> {
    match raw {
        RawQuestion::Tagged { category, text } => {
            let category = Category::from_label(&category).ok_or_else(|| {
                InterviewError::shape(
                    SHAPE,
                    format!("question {} has unknown category '{}'", index + 1, category),
                )
            })?;
            Ok(QuestionSpec::new(normalize_whitespace(&text), category))
        }
        RawQuestion::Labelled(line) => {
            let (label, body) = match QUESTION_LABEL.captures(&line) {
                Some(caps) => {
                    let label = caps.get(1).map(|m| m.as_str().to_string());
                    let end = caps.get(0).map(|m| m.end()).unwrap_or(0);
                    (label, &line[end..])
                }
                None => (None, line.as_str()),
            };
            let category = label
                .as_deref()
                .and_then(Category::from_label)
                .or_else(|| Category::for_position(index))
                .ok_or_else(|| {
                    InterviewError::shape(SHAPE, format!("no category for question {}", index + 1))
                })?;
            Ok(QuestionSpec::new(normalize_whitespace(body), category))
        }
    }
}

/// Parse and validate a generated question-set response.
pub fn parse_script(candidate_id: &str, raw: &str) -> Result<InterviewScript> {
    let envelope: ScriptEnvelope = parse_generated(raw, SHAPE)?;

    let questions = envelope
        .interview
        .questions
        .into_iter()
        .enumerate()
        .map(|(index, question)| repair_question(index, question))
        .collect::<Result<Vec<_>>>()?;

    let script = InterviewScript {
        candidate_id: candidate_id.to_string(),
        greeting: normalize_whitespace(&envelope.interview.greeting_script),
        questions,
    };
    script.validate()?;
    Ok(script)
}

/// Produces interview scripts from candidate profiles.
pub struct QuestionGenerator {
    generator: Arc<dyn TextGenerator>,
    timeout: Duration,
}

impl QuestionGenerator {
    pub fn new(generator: Arc<dyn TextGenerator>, timeout: Duration) -> Self {
        Self { generator, timeout }
    }

    /// Generate a validated script and return it with the raw response.
    pub async fn generate(&self, profile: &CandidateProfile) -> Result<(InterviewScript, String)> {
        let profile_json = serde_json::to_string_pretty(profile)
            .map_err(|e| InterviewError::Generation(format!("Failed to encode profile: {}", e)))?;
        let prompt = question_set_prompt(&profile_json);

        info!("Generating interview questions for {}", profile.candidate_id);
        let raw = complete_within(self.generator.as_ref(), &prompt, self.timeout).await?;

        match parse_script(&profile.candidate_id, &raw) {
            Ok(script) => {
                info!(
                    "Generated {} questions for {}",
                    script.questions.len(),
                    profile.candidate_id
                );
                Ok((script, raw))
            }
            Err(e) => {
                warn!("Rejected question set for {}: {}", profile.candidate_id, e);
                Err(e)
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::llm::ScriptedGenerator;
    use serde_json::json;

    /// Well-formed tagged response in canonical order
    pub(crate) fn tagged_response() -> String {
        let questions: Vec<_> = (0..QUESTION_COUNT)
            .map(|i| {
                json!({
                    "category": Category::for_position(i).unwrap().as_str(),
                    "text": format!("Question text {}", i + 1),
                })
            })
            .collect();
        json!({
            "interview": {
                "greeting_script": "Hi Asha, your NLP work stood out.",
                "questions": questions,
            }
        })
        .to_string()
    }

    #[test]
    fn test_parse_tagged_script() {
        let script = parse_script("cand-1", &tagged_response()).unwrap();
        assert_eq!(script.candidate_id, "cand-1");
        assert_eq!(script.questions.len(), 10);
        assert_eq!(script.questions[0].text, "Question text 1");
        assert_eq!(script.questions[7].category, Category::ThoughtProcess);
        assert_eq!(script.questions[9].category, Category::PersonalSkills);
    }

    #[test]
    fn test_parse_labelled_strings_in_fences() {
        let raw = r#"```json
{
  "interview": {
    "greeting_script": "Welcome Ravi!",
    "questions": [
      "Question 1: What is a list?",
      "Question 2: What is a dict?",
      "Question 3: What is a tuple?",
      "Question 4: Explain generators.",
      "Question 5: Explain decorators.",
      "Question 6: Explain the GIL.",
      "Question 7: Explain metaclasses.",
      "Question 8 (thought process): How would you debug a memory leak?",
      "Question 9 (situational): A deadline slips. What do you do?",
      "Question 10 (personal skills): How do you give feedback?"
    ]
  }
}
```"#;
        let script = parse_script("cand-2", raw).unwrap();
        assert_eq!(script.questions[0].text, "What is a list?");
        assert_eq!(script.questions[0].category, Category::Basic);
        assert_eq!(script.questions[4].category, Category::Intermediate);
        assert_eq!(script.questions[7].text, "How would you debug a memory leak?");
        assert_eq!(script.questions[8].category, Category::Situational);
    }

    #[test]
    fn test_wrong_count_is_shape_error() {
        let mut value: serde_json::Value = serde_json::from_str(&tagged_response()).unwrap();
        value["interview"]["questions"].as_array_mut().unwrap().pop();

        let err = parse_script("c", &value.to_string()).unwrap_err();
        assert!(matches!(err, InterviewError::GenerationShape { .. }));
        assert!(err.to_string().contains("expected 10 questions, got 9"));
    }

    #[test]
    fn test_wrong_distribution_is_shape_error() {
        let mut value: serde_json::Value = serde_json::from_str(&tagged_response()).unwrap();
        value["interview"]["questions"][9]["category"] = json!("basic");

        let err = parse_script("c", &value.to_string()).unwrap_err();
        assert!(err.to_string().contains("expected 3 basic questions, got 4"));
    }

    #[test]
    fn test_unknown_category_and_malformed_json() {
        let mut value: serde_json::Value = serde_json::from_str(&tagged_response()).unwrap();
        value["interview"]["questions"][0]["category"] = json!("trivia");
        assert!(matches!(
            parse_script("c", &value.to_string()),
            Err(InterviewError::GenerationShape { .. })
        ));

        assert!(matches!(
            parse_script("c", "{\"interview\": {\"questions\": [}"),
            Err(InterviewError::GenerationShape { .. })
        ));
    }

    #[test]
    fn test_empty_greeting_is_rejected() {
        let mut value: serde_json::Value = serde_json::from_str(&tagged_response()).unwrap();
        value["interview"]["greeting_script"] = json!("   ");
        let err = parse_script("c", &value.to_string()).unwrap_err();
        assert!(err.to_string().contains("greeting is empty"));
    }

    #[test]
    fn test_category_labels() {
        assert_eq!(Category::from_label("Thought-Process"), Some(Category::ThoughtProcess));
        assert_eq!(Category::from_label("personal_skills"), Some(Category::PersonalSkills));
        assert_eq!(Category::from_label("technical"), None);
        assert_eq!(Category::for_position(10), None);

        let total: usize = Category::ALL.iter().map(|c| c.expected_count()).sum();
        assert_eq!(total, QUESTION_COUNT);
    }

    #[tokio::test]
    async fn test_generate_embeds_profile_and_returns_raw() {
        let scripted = Arc::new(ScriptedGenerator::new(vec![tagged_response()]));
        let generator = QuestionGenerator::new(scripted.clone(), Duration::from_secs(1));
        let profile = CandidateProfile {
            candidate_id: "cand-1".to_string(),
            name: "Asha Rao".to_string(),
            ..CandidateProfile::default()
        };

        let (script, raw) = generator.generate(&profile).await.unwrap();
        assert_eq!(script.questions.len(), QUESTION_COUNT);
        assert_eq!(raw, tagged_response());
        assert!(scripted.prompts()[0].contains("Asha Rao"));
    }
}
