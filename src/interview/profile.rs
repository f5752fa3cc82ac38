//! Candidate profile extraction.
//!
//! Raw candidate records come from resume parsing and vary a lot in shape.
//! Extraction never fails on a missing or oddly typed field; it substitutes
//! an empty value and moves on.

use log::{debug, info};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use super::shape::normalize_whitespace;
use crate::database::DocumentStore;
use crate::error::{InterviewError, Result};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExperienceEntry {
    pub company: String,
    pub role: String,
    pub duration: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EducationEntry {
    pub institution: String,
    pub degree: String,
    pub year: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectEntry {
    pub name: String,
    pub description: String,
    pub technologies: Vec<String>,
}

/// Canonical, whitespace-normalized view of a candidate record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CandidateProfile {
    pub candidate_id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    pub summary: String,
    pub target_role: String,
    pub skills: Vec<String>,
    pub experience: Vec<ExperienceEntry>,
    pub education: Vec<EducationEntry>,
    pub projects: Vec<ProjectEntry>,
    pub certifications: Vec<String>,
    /// Every other scalar field, keyed by dotted path
    pub attributes: BTreeMap<String, String>,
}

const NAME_PATHS: &[&str] = &["name", "full_name", "personal_information.name"];
const EMAIL_PATHS: &[&str] = &["personal_information.email", "email", "contact.email"];
const PHONE_PATHS: &[&str] = &["personal_information.phone", "phone", "contact.phone"];
const LOCATION_PATHS: &[&str] = &["personal_information.location", "location", "contact.location"];
const SUMMARY_PATHS: &[&str] = &["summary", "professional_summary", "objective", "profile.summary"];
const ROLE_PATHS: &[&str] = &[
    "role_target",
    "target_role",
    "desired_role",
    "applied_role",
    "job_preferences.desired_role",
    "position",
];

/// Top-level keys whose content lands in a structured field
const STRUCTURED_KEYS: &[&str] = &[
    "_id",
    "id",
    "skills",
    "technical_skills",
    "experience",
    "work_experience",
    "professional_experience",
    "education",
    "projects",
    "certifications",
    "certificates",
];

fn lookup<'a>(record: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(record, |node, key| node.get(key))
}

fn scalar_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => normalize_whitespace(s),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

fn first_text(record: &Value, paths: &[&str]) -> String {
    paths
        .iter()
        .find_map(|path| lookup(record, path).and_then(scalar_text))
        .unwrap_or_default()
}

fn field(object: &Map<String, Value>, keys: &[&str]) -> String {
    keys.iter()
        .find_map(|key| object.get(*key).and_then(text_or_joined))
        .unwrap_or_default()
}

/// Scalar text, or the entries of a string array joined with "; "
fn text_or_joined(value: &Value) -> Option<String> {
    match value {
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().filter_map(scalar_text).collect();
            (!parts.is_empty()).then(|| parts.join("; "))
        }
        other => scalar_text(other),
    }
}

fn array_of_objects<'a>(record: &'a Value, keys: &[&str]) -> Vec<&'a Map<String, Value>> {
    keys.iter()
        .find_map(|key| record.get(*key).and_then(Value::as_array))
        .map(|items| items.iter().filter_map(Value::as_object).collect())
        .unwrap_or_default()
}

/// Flatten a skills value of any common shape into individual names.
fn collect_names(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::String(s) => out.extend(
            s.split([',', ';', '\n'])
                .map(normalize_whitespace)
                .filter(|s| !s.is_empty()),
        ),
        Value::Array(items) => items.iter().for_each(|item| collect_names(item, out)),
        Value::Object(map) => {
            let named = ["name", "skill", "title"]
                .iter()
                .find_map(|key| map.get(*key).and_then(scalar_text));
            match named {
                Some(name) => out.push(name),
                None => map.values().for_each(|v| collect_names(v, out)),
            }
        }
        _ => {}
    }
}

fn dedup_case_insensitive(items: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.to_lowercase()))
        .collect()
}

fn names_under(record: &Value, keys: &[&str]) -> Vec<String> {
    let mut names = Vec::new();
    for key in keys {
        if let Some(value) = record.get(*key) {
            collect_names(value, &mut names);
        }
    }
    dedup_case_insensitive(names)
}

fn flatten_into(prefix: &str, value: &Value, out: &mut BTreeMap<String, String>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                let path = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{}.{}", prefix, key)
                };
                flatten_into(&path, child, out);
            }
        }
        Value::Array(items) => {
            for (index, child) in items.iter().enumerate() {
                flatten_into(&format!("{}.{}", prefix, index), child, out);
            }
        }
        scalar => {
            if let Some(text) = scalar_text(scalar) {
                out.insert(prefix.to_string(), text);
            }
        }
    }
}

fn full_name(record: &Value) -> String {
    let first = first_text(record, &["personal_information.first_name", "first_name"]);
    let last = first_text(record, &["personal_information.last_name", "last_name"]);
    match (first.is_empty(), last.is_empty()) {
        (false, false) => format!("{} {}", first, last),
        (false, true) => first,
        (true, false) => last,
        (true, true) => first_text(record, NAME_PATHS),
    }
}

/// Display name used when listing candidates
pub fn first_name(record: &Value) -> Option<String> {
    let first = first_text(record, &["personal_information.first_name", "first_name"]);
    if !first.is_empty() {
        return Some(first);
    }
    let name = first_text(record, NAME_PATHS);
    name.split_whitespace().next().map(str::to_string)
}

impl CandidateProfile {
    pub fn from_record(candidate_id: &str, record: &Value) -> Self {
        let experience = array_of_objects(
            record,
            &["experience", "work_experience", "professional_experience"],
        )
        .into_iter()
        .map(|item| {
            let mut duration = field(item, &["duration", "period", "dates"]);
            if duration.is_empty() {
                let start = field(item, &["start_date", "from"]);
                let end = field(item, &["end_date", "to"]);
                if !start.is_empty() {
                    let end = if end.is_empty() { "Present".to_string() } else { end };
                    duration = format!("{} - {}", start, end);
                }
            }
            ExperienceEntry {
                company: field(item, &["company", "organization", "employer"]),
                role: field(item, &["role", "title", "position", "designation"]),
                duration,
                description: field(item, &["description", "summary", "responsibilities"]),
            }
        })
        .collect();

        let education = array_of_objects(record, &["education"])
            .into_iter()
            .map(|item| EducationEntry {
                institution: field(item, &["institution", "school", "university", "college"]),
                degree: field(item, &["degree", "qualification", "field_of_study"]),
                year: field(item, &["year", "graduation_year", "end_date"]),
            })
            .collect();

        let projects = array_of_objects(record, &["projects"])
            .into_iter()
            .map(|item| {
                let mut technologies = Vec::new();
                for key in ["technologies", "tech_stack", "skills"] {
                    if let Some(value) = item.get(key) {
                        collect_names(value, &mut technologies);
                    }
                }
                ProjectEntry {
                    name: field(item, &["name", "title"]),
                    description: field(item, &["description", "summary"]),
                    technologies: dedup_case_insensitive(technologies),
                }
            })
            .collect();

        let consumed: HashSet<&str> = [
            "personal_information.first_name",
            "personal_information.last_name",
            "first_name",
            "last_name",
        ]
        .into_iter()
        .chain(NAME_PATHS.iter().copied())
        .chain(EMAIL_PATHS.iter().copied())
        .chain(PHONE_PATHS.iter().copied())
        .chain(LOCATION_PATHS.iter().copied())
        .chain(SUMMARY_PATHS.iter().copied())
        .chain(ROLE_PATHS.iter().copied())
        .collect();

        let mut attributes = BTreeMap::new();
        if let Some(map) = record.as_object() {
            for (key, value) in map {
                if !STRUCTURED_KEYS.contains(&key.as_str()) {
                    flatten_into(key, value, &mut attributes);
                }
            }
        }
        attributes.retain(|path, _| !consumed.contains(path.as_str()));

        CandidateProfile {
            candidate_id: candidate_id.to_string(),
            name: full_name(record),
            email: first_text(record, EMAIL_PATHS),
            phone: first_text(record, PHONE_PATHS),
            location: first_text(record, LOCATION_PATHS),
            summary: first_text(record, SUMMARY_PATHS),
            target_role: first_text(record, ROLE_PATHS),
            skills: names_under(record, &["skills", "technical_skills"]),
            experience,
            education,
            projects,
            certifications: names_under(record, &["certifications", "certificates"]),
            attributes,
        }
    }
}

/// Reads candidate records and normalizes them into profiles.
pub struct ProfileExtractor {
    store: Arc<dyn DocumentStore>,
}

impl ProfileExtractor {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn extract(&self, candidate_id: &str) -> Result<CandidateProfile> {
        let record = self
            .store
            .find_candidate(candidate_id)
            .await?
            .ok_or_else(|| InterviewError::not_found("Candidate", candidate_id))?;

        let profile = CandidateProfile::from_record(candidate_id, &record);
        info!(
            "Extracted profile for {}: {} skills, {} roles",
            candidate_id,
            profile.skills.len(),
            profile.experience.len()
        );
        debug!("Profile attributes: {:?}", profile.attributes.keys().collect::<Vec<_>>());
        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;
    use serde_json::json;

    fn resume() -> Value {
        json!({
            "_id": "cand-7",
            "personal_information": {
                "first_name": "  Asha ",
                "last_name": "Rao",
                "email": "asha@example.com",
                "linkedin": "linkedin.com/in/asha"
            },
            "summary": "Data scientist   with\n five years in NLP.",
            "job_preferences": {"desired_role": "ML Engineer"},
            "skills": {"languages": ["Python", "SQL"], "ml": "PyTorch, scikit-learn, python"},
            "experience": [
                {"company": "Acme", "title": "Data Scientist", "start_date": "2021", "responsibilities": ["Built models", "Led reviews"]},
                {"organization": "Globex"}
            ],
            "education": [{"university": "IIT Madras", "degree": "B.Tech", "graduation_year": 2019}],
            "projects": [{"title": "Churn model", "tech_stack": "XGBoost, Pandas"}],
            "certifications": [{"name": "AWS ML Specialty"}, "TensorFlow Developer"],
            "years_of_experience": 5
        })
    }

    #[test]
    fn test_from_record_normalizes_fields() {
        let profile = CandidateProfile::from_record("cand-7", &resume());

        assert_eq!(profile.name, "Asha Rao");
        assert_eq!(profile.email, "asha@example.com");
        assert_eq!(profile.summary, "Data scientist with five years in NLP.");
        assert_eq!(profile.target_role, "ML Engineer");
        assert_eq!(profile.skills, vec!["Python", "SQL", "PyTorch", "scikit-learn"]);
        assert_eq!(profile.experience[0].role, "Data Scientist");
        assert_eq!(profile.experience[0].duration, "2021 - Present");
        assert_eq!(profile.experience[0].description, "Built models; Led reviews");
        assert_eq!(profile.experience[1].company, "Globex");
        assert_eq!(profile.experience[1].role, "");
        assert_eq!(profile.education[0].year, "2019");
        assert_eq!(profile.projects[0].technologies, vec!["XGBoost", "Pandas"]);
        assert_eq!(profile.certifications, vec!["AWS ML Specialty", "TensorFlow Developer"]);
    }

    #[test]
    fn test_unmapped_fields_become_attributes() {
        let profile = CandidateProfile::from_record("cand-7", &resume());

        assert_eq!(
            profile.attributes.get("personal_information.linkedin").map(String::as_str),
            Some("linkedin.com/in/asha")
        );
        assert_eq!(profile.attributes.get("years_of_experience").map(String::as_str), Some("5"));
        assert!(!profile.attributes.contains_key("personal_information.email"));
        assert!(!profile.attributes.contains_key("job_preferences.desired_role"));
        assert!(!profile.attributes.keys().any(|k| k.starts_with("skills")));
    }

    #[test]
    fn test_sparse_record_yields_defaults() {
        let profile = CandidateProfile::from_record("x", &json!({"skills": 12, "experience": "n/a"}));
        assert_eq!(profile.candidate_id, "x");
        assert!(profile.name.is_empty());
        assert!(profile.skills.is_empty());
        assert!(profile.experience.is_empty());
    }

    #[test]
    fn test_last_name_only_is_kept() {
        let record = json!({"personal_information": {"last_name": "Iyer"}, "name": "ignored"});
        assert_eq!(CandidateProfile::from_record("x", &record).name, "Iyer");
    }

    #[test]
    fn test_first_name_fallbacks() {
        assert_eq!(first_name(&resume()), Some("Asha".to_string()));
        assert_eq!(first_name(&json!({"name": "Ravi Kumar"})), Some("Ravi".to_string()));
        assert_eq!(first_name(&json!({})), None);
    }

    #[tokio::test]
    async fn test_extract_missing_candidate_is_not_found() {
        let store = Arc::new(MemoryStore::new());
        let extractor = ProfileExtractor::new(store);

        let err = extractor.extract("ghost").await.unwrap_err();
        assert!(matches!(err, InterviewError::NotFound { kind: "Candidate", .. }));
    }

    #[tokio::test]
    async fn test_extract_reads_store() {
        let store = Arc::new(MemoryStore::new());
        store.put_candidate("cand-7", resume()).await.unwrap();

        let profile = ProfileExtractor::new(store).extract("cand-7").await.unwrap();
        assert_eq!(profile.name, "Asha Rao");
    }
}
