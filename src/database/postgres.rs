use async_trait::async_trait;
use chrono::{DateTime, Utc};
use deadpool_postgres::{Config, ManagerConfig, Pool, PoolConfig, RecyclingMethod, Runtime};
use log::{error, info};
use serde_json::Value;
use tokio_postgres::{NoTls, Row};
use uuid::Uuid;

use super::models::{CandidateSummary, Interaction, InterviewTemplate, NewInteraction};
use super::DocumentStore;
use crate::config::DatabaseConfig;
use crate::error::{InterviewError, Result};
use crate::interview::profile::first_name;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS candidates (
    id          TEXT PRIMARY KEY,
    document    JSONB NOT NULL,
    updated_at  TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE TABLE IF NOT EXISTS interview_templates (
    candidate_id  TEXT PRIMARY KEY,
    greeting      TEXT NOT NULL,
    questions     JSONB NOT NULL,
    updated_at    TIMESTAMPTZ NOT NULL
);

CREATE TABLE IF NOT EXISTS interactions (
    sequence            BIGSERIAL PRIMARY KEY,
    id                  UUID NOT NULL UNIQUE,
    candidate_id        TEXT NOT NULL,
    question            TEXT NOT NULL,
    answer              TEXT NOT NULL,
    evaluation          JSONB NOT NULL,
    follow_up_question  TEXT,
    created_at          TIMESTAMPTZ NOT NULL
);

CREATE INDEX IF NOT EXISTS interactions_candidate_sequence_idx
    ON interactions (candidate_id, sequence);
"#;

/// PostgreSQL-backed document store. Documents live in JSONB columns.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: Pool,
}

impl PostgresStore {
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        info!(
            "Connecting to database: {}@{}:{}/{}",
            config.user, config.host, config.port, config.dbname
        );

        let mut cfg = Config::new();
        cfg.host = Some(config.host.clone());
        cfg.port = Some(config.port);
        cfg.dbname = Some(config.dbname.clone());
        cfg.user = Some(config.user.clone());
        cfg.password = Some(config.password.clone());
        cfg.manager = Some(ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        });
        cfg.pool = Some(PoolConfig::new(config.pool_size));

        let pool = cfg
            .create_pool(Some(Runtime::Tokio1), NoTls)
            .map_err(|e| InterviewError::Store(format!("Pool creation failed: {}", e)))?;

        // Test connection
        let _client = pool.get().await?;

        info!("Database connection established successfully");

        Ok(PostgresStore { pool })
    }

    pub async fn initialize_schema(&self) -> Result<()> {
        let client = self.pool.get().await?;
        client.batch_execute(SCHEMA).await.map_err(|e| {
            error!("Failed to initialize schema: {}", e);
            InterviewError::Store(format!("Failed to initialize schema: {}", e))
        })?;
        info!("Database schema ready");
        Ok(())
    }

    fn interaction_from_row(row: &Row) -> Result<Interaction> {
        let sequence: i64 = row.get("sequence");
        let evaluation: Value = row.get("evaluation");
        Ok(Interaction {
            id: row.get("id"),
            sequence: sequence as u64,
            candidate_id: row.get("candidate_id"),
            question: row.get("question"),
            answer: row.get("answer"),
            evaluation: serde_json::from_value(evaluation).map_err(|e| {
                InterviewError::Store(format!("Corrupt evaluation document: {}", e))
            })?,
            follow_up_question: row.get("follow_up_question"),
            timestamp: row.get("created_at"),
        })
    }
}

#[async_trait]
impl DocumentStore for PostgresStore {
    async fn find_candidate(&self, candidate_id: &str) -> Result<Option<Value>> {
        let client = self.pool.get().await?;
        let row = client
            .query_opt("SELECT document FROM candidates WHERE id = $1", &[&candidate_id])
            .await
            .map_err(|e| {
                error!("Failed to fetch candidate {}: {}", candidate_id, e);
                InterviewError::Store(format!("Failed to fetch candidate: {}", e))
            })?;
        Ok(row.map(|row| row.get(0)))
    }

    async fn put_candidate(&self, candidate_id: &str, document: Value) -> Result<()> {
        let client = self.pool.get().await?;
        client
            .execute(
                r#"
                INSERT INTO candidates (id, document, updated_at)
                VALUES ($1, $2, NOW())
                ON CONFLICT (id) DO UPDATE
                SET document = EXCLUDED.document, updated_at = EXCLUDED.updated_at
                "#,
                &[&candidate_id, &document],
            )
            .await?;
        Ok(())
    }

    async fn list_candidates(&self) -> Result<Vec<CandidateSummary>> {
        let client = self.pool.get().await?;
        let rows = client
            .query("SELECT id, document FROM candidates ORDER BY id", &[])
            .await?;

        Ok(rows
            .iter()
            .map(|row| {
                let document: Value = row.get(1);
                CandidateSummary {
                    id: row.get(0),
                    name: first_name(&document).unwrap_or_else(|| "Unknown".to_string()),
                }
            })
            .collect())
    }

    async fn put_template(&self, template: &InterviewTemplate) -> Result<()> {
        let client = self.pool.get().await?;
        let questions = serde_json::to_value(&template.questions)
            .map_err(|e| InterviewError::Store(format!("Failed to encode questions: {}", e)))?;

        client
            .execute(
                r#"
                INSERT INTO interview_templates (candidate_id, greeting, questions, updated_at)
                VALUES ($1, $2, $3, $4)
                ON CONFLICT (candidate_id) DO UPDATE
                SET greeting = EXCLUDED.greeting,
                    questions = EXCLUDED.questions,
                    updated_at = EXCLUDED.updated_at
                "#,
                &[
                    &template.candidate_id,
                    &template.greeting,
                    &questions,
                    &template.updated_at,
                ],
            )
            .await
            .map_err(|e| {
                error!("Failed to store interview template: {}", e);
                InterviewError::Store(format!("Failed to store interview template: {}", e))
            })?;

        Ok(())
    }

    async fn get_template(&self, candidate_id: &str) -> Result<Option<InterviewTemplate>> {
        let client = self.pool.get().await?;
        let row = client
            .query_opt(
                r#"
                SELECT greeting, questions, updated_at
                FROM interview_templates
                WHERE candidate_id = $1
                "#,
                &[&candidate_id],
            )
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let questions: Value = row.get(1);
        let updated_at: DateTime<Utc> = row.get(2);
        Ok(Some(InterviewTemplate {
            candidate_id: candidate_id.to_string(),
            greeting: row.get(0),
            questions: serde_json::from_value(questions).map_err(|e| {
                InterviewError::Store(format!("Corrupt question document: {}", e))
            })?,
            updated_at,
        }))
    }

    async fn append_interaction(&self, interaction: NewInteraction) -> Result<Interaction> {
        let client = self.pool.get().await?;
        let id = Uuid::new_v4();
        let now = Utc::now();
        let evaluation = serde_json::to_value(&interaction.evaluation)
            .map_err(|e| InterviewError::Store(format!("Failed to encode evaluation: {}", e)))?;

        let row = client
            .query_one(
                r#"
                INSERT INTO interactions
                (id, candidate_id, question, answer, evaluation, created_at)
                VALUES ($1, $2, $3, $4, $5, $6)
                RETURNING sequence
                "#,
                &[
                    &id,
                    &interaction.candidate_id,
                    &interaction.evaluation.question,
                    &interaction.evaluation.answer,
                    &evaluation,
                    &now,
                ],
            )
            .await
            .map_err(|e| {
                error!("Failed to insert interaction: {}", e);
                InterviewError::Store(format!("Failed to insert interaction: {}", e))
            })?;

        let sequence: i64 = row.get(0);
        info!(
            "Recorded interaction {} (#{}) for candidate {}",
            id, sequence, interaction.candidate_id
        );

        Ok(Interaction {
            id,
            sequence: sequence as u64,
            candidate_id: interaction.candidate_id,
            question: interaction.evaluation.question.clone(),
            answer: interaction.evaluation.answer.clone(),
            evaluation: interaction.evaluation,
            follow_up_question: None,
            timestamp: now,
        })
    }

    async fn attach_open_follow_up(
        &self,
        candidate_id: &str,
        question: &str,
        answer: &str,
        follow_up_question: &str,
    ) -> Result<Option<u64>> {
        let client = self.pool.get().await?;
        let row = client
            .query_opt(
                r#"
                UPDATE interactions
                SET follow_up_question = $1
                WHERE sequence = (
                    SELECT sequence FROM interactions
                    WHERE candidate_id = $2 AND question = $3 AND answer = $4
                      AND follow_up_question IS NULL
                    ORDER BY sequence DESC
                    LIMIT 1
                    FOR UPDATE SKIP LOCKED
                )
                AND follow_up_question IS NULL
                RETURNING sequence
                "#,
                &[&follow_up_question, &candidate_id, &question, &answer],
            )
            .await
            .map_err(|e| {
                error!("Failed to attach follow-up: {}", e);
                InterviewError::Store(format!("Failed to attach follow-up: {}", e))
            })?;

        Ok(row.map(|row| row.get::<_, i64>(0) as u64))
    }

    async fn interactions_for(&self, candidate_id: &str) -> Result<Vec<Interaction>> {
        let client = self.pool.get().await?;
        let rows = client
            .query(
                r#"
                SELECT sequence, id, candidate_id, question, answer, evaluation,
                       follow_up_question, created_at
                FROM interactions
                WHERE candidate_id = $1
                ORDER BY sequence
                "#,
                &[&candidate_id],
            )
            .await?;

        rows.iter().map(Self::interaction_from_row).collect()
    }
}
