use async_trait::async_trait;
use log::info;
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use super::models::{document_id, CandidateSummary, Interaction, InterviewTemplate, NewInteraction};
use super::DocumentStore;
use crate::error::{InterviewError, Result};
use crate::interview::profile::first_name;

#[derive(Default)]
struct MemoryState {
    candidates: BTreeMap<String, Value>,
    templates: HashMap<String, InterviewTemplate>,
    interactions: Vec<Interaction>,
    last_sequence: u64,
}

/// Process-local document store.
#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load candidate documents from a JSON file holding either an array of
    /// documents or `{"candidates": [...]}`.
    pub fn seeded_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            InterviewError::Store(format!("Failed to read seed file {}: {}", path.display(), e))
        })?;
        let parsed: Value = serde_json::from_str(&contents).map_err(|e| {
            InterviewError::Store(format!("Seed file {} is not valid JSON: {}", path.display(), e))
        })?;

        let documents = match parsed {
            Value::Array(items) => items,
            Value::Object(mut map) => match map.remove("candidates") {
                Some(Value::Array(items)) => items,
                _ => {
                    return Err(InterviewError::Store(
                        "Seed file must hold an array of candidates".to_string(),
                    ))
                }
            },
            _ => {
                return Err(InterviewError::Store(
                    "Seed file must hold an array of candidates".to_string(),
                ))
            }
        };

        let store = Self::new();
        {
            let mut state = store.state.write();
            for document in documents {
                let id = document_id(&document).ok_or_else(|| {
                    InterviewError::Store("Seed candidate without _id or id".to_string())
                })?;
                state.candidates.insert(id, document);
            }
            info!("Seeded {} candidates from {}", state.candidates.len(), path.display());
        }
        Ok(store)
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn find_candidate(&self, candidate_id: &str) -> Result<Option<Value>> {
        Ok(self.state.read().candidates.get(candidate_id).cloned())
    }

    async fn put_candidate(&self, candidate_id: &str, document: Value) -> Result<()> {
        self.state
            .write()
            .candidates
            .insert(candidate_id.to_string(), document);
        Ok(())
    }

    async fn list_candidates(&self) -> Result<Vec<CandidateSummary>> {
        let state = self.state.read();
        Ok(state
            .candidates
            .iter()
            .map(|(id, document)| CandidateSummary {
                id: id.clone(),
                name: first_name(document).unwrap_or_else(|| "Unknown".to_string()),
            })
            .collect())
    }

    async fn put_template(&self, template: &InterviewTemplate) -> Result<()> {
        self.state
            .write()
            .templates
            .insert(template.candidate_id.clone(), template.clone());
        Ok(())
    }

    async fn get_template(&self, candidate_id: &str) -> Result<Option<InterviewTemplate>> {
        Ok(self.state.read().templates.get(candidate_id).cloned())
    }

    async fn append_interaction(&self, interaction: NewInteraction) -> Result<Interaction> {
        let mut state = self.state.write();
        state.last_sequence += 1;
        let stored = interaction.into_interaction(state.last_sequence);
        state.interactions.push(stored.clone());
        Ok(stored)
    }

    async fn attach_open_follow_up(
        &self,
        candidate_id: &str,
        question: &str,
        answer: &str,
        follow_up_question: &str,
    ) -> Result<Option<u64>> {
        let mut state = self.state.write();
        let open = state.interactions.iter_mut().rev().find(|i| {
            i.candidate_id == candidate_id
                && i.follow_up_question.is_none()
                && i.question == question
                && i.answer == answer
        });
        Ok(open.map(|interaction| {
            interaction.follow_up_question = Some(follow_up_question.to_string());
            interaction.sequence
        }))
    }

    async fn interactions_for(&self, candidate_id: &str) -> Result<Vec<Interaction>> {
        Ok(self
            .state
            .read()
            .interactions
            .iter()
            .filter(|i| i.candidate_id == candidate_id)
            .cloned()
            .collect())
    }
}
