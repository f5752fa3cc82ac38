/// Configuration management for the interviewer service
///
/// Values are layered: built-in defaults, then an optional `rupadi.toml`
/// (or the file named by `RUPADI_CONFIG`), then `RUPADI__SECTION__KEY`
/// environment variables. The legacy `OPENAI_API_KEY` and `DB_*` variables
/// are honoured as defaults.
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{InterviewError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub llm: LlmConfig,
    pub store: StoreConfig,
    pub database: DatabaseConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Text-generation collaborator settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    pub base_url: String,
    pub model: String,
    #[serde(default)]
    pub api_key: Option<String>,
    pub temperature: f64,
    pub max_tokens: u32,
    /// Upper bound for a single generation call
    pub timeout_secs: u64,
}

impl LlmConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Memory,
    Postgres,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    /// JSON file of candidate documents loaded into the memory backend
    #[serde(default)]
    pub seed_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub dbname: String,
    pub user: String,
    #[serde(default)]
    pub password: String,
    pub pool_size: usize,
}

impl AppConfig {
    /// Load configuration from defaults, the optional config file and the environment
    pub fn load() -> Result<Self> {
        let file = env::var("RUPADI_CONFIG").unwrap_or_else(|_| "rupadi".to_string());

        let mut builder = Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8000)?
            .set_default("llm.base_url", "https://api.openai.com/v1")?
            .set_default("llm.model", "gpt-4o-mini")?
            .set_default("llm.temperature", 0.7)?
            .set_default("llm.max_tokens", 1500)?
            .set_default("llm.timeout_secs", 60)?
            .set_default("store.backend", "memory")?
            .set_default("database.host", "localhost")?
            .set_default("database.port", 5432)?
            .set_default("database.dbname", "rupadi_db")?
            .set_default("database.user", "rupadi_user")?
            .set_default("database.password", "")?
            .set_default("database.pool_size", 16)?;

        // Legacy variable names, same as the web backend
        let legacy = [
            ("OPENAI_API_KEY", "llm.api_key"),
            ("DB_HOST", "database.host"),
            ("DB_PORT", "database.port"),
            ("DB_NAME", "database.dbname"),
            ("DB_USER", "database.user"),
            ("DB_PASSWORD", "database.password"),
        ];
        for (var, key) in legacy {
            if let Ok(value) = env::var(var) {
                builder = builder.set_default(key, value)?;
            }
        }

        let config = builder
            .add_source(File::with_name(&file).required(false))
            .add_source(
                Environment::with_prefix("RUPADI")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?;

        let app: AppConfig = config.try_deserialize()?;
        app.validate()?;
        Ok(app)
    }

    pub fn validate(&self) -> Result<()> {
        if self.llm.timeout_secs == 0 {
            return Err(InterviewError::Config(
                "llm.timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.database.pool_size == 0 {
            return Err(InterviewError::Config(
                "database.pool_size must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn bind_address(&self) -> (String, u16) {
        (self.server.host.clone(), self.server.port)
    }
}
