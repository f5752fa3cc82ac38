use async_trait::async_trait;
use log::{debug, error, info};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::TextGenerator;
use crate::config::LlmConfig;
use crate::error::{InterviewError, Result};

#[derive(Debug, Clone, PartialEq)]
pub enum OpenAIModel {
    GPT4o,
    GPT4oMini,
    GPT4Turbo,
    GPT35Turbo,
    Custom(String),
}

impl OpenAIModel {
    pub fn as_str(&self) -> &str {
        match self {
            OpenAIModel::GPT4o => "gpt-4o",
            OpenAIModel::GPT4oMini => "gpt-4o-mini",
            OpenAIModel::GPT4Turbo => "gpt-4-turbo",
            OpenAIModel::GPT35Turbo => "gpt-3.5-turbo",
            OpenAIModel::Custom(name) => name.as_str(),
        }
    }

    /// Unknown names pass through untouched so compatible gateways keep working
    pub fn from_name(s: &str) -> Self {
        match s {
            "gpt-4o" | "GPT-4o" => OpenAIModel::GPT4o,
            "gpt-4o-mini" | "GPT-4o Mini" => OpenAIModel::GPT4oMini,
            "gpt-4-turbo" | "GPT-4 Turbo" => OpenAIModel::GPT4Turbo,
            "gpt-3.5-turbo" | "GPT-3.5 Turbo" => OpenAIModel::GPT35Turbo,
            other => OpenAIModel::Custom(other.to_string()),
        }
    }
}

#[derive(Serialize, Deserialize)]
struct OpenAIMessage {
    role: String,
    content: String,
}

#[derive(Serialize)]
struct OpenAIRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
    max_tokens: u32,
    temperature: f64,
    stream: bool,
}

#[derive(Deserialize)]
struct OpenAIChoice {
    message: OpenAIMessage,
}

#[derive(Deserialize)]
struct OpenAIResponse {
    choices: Vec<OpenAIChoice>,
    usage: Option<OpenAIUsage>,
}

#[derive(Deserialize)]
struct OpenAIUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

const SYSTEM_PROMPT: &str = "You are Rupadi, an AI technical interviewer. Follow the output format requested in each instruction exactly and do not add commentary outside it.";

/// Chat-completions client for OpenAI and API-compatible gateways.
#[derive(Clone)]
pub struct OpenAIClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: OpenAIModel,
    max_tokens: u32,
    temperature: f64,
}

impl OpenAIClient {
    pub fn new(api_key: String, model: OpenAIModel) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url: "https://api.openai.com/v1".to_string(),
            model,
            max_tokens: 1500,
            temperature: 0.7,
        }
    }

    pub fn from_config(config: &LlmConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                InterviewError::Config(
                    "llm.api_key (or OPENAI_API_KEY) must be set".to_string(),
                )
            })?;

        let client = Client::builder()
            .connect_timeout(std::time::Duration::from_secs(10))
            .build()
            .map_err(|e| InterviewError::Config(format!("HTTP client setup failed: {}", e)))?;

        Ok(Self {
            client,
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: OpenAIModel::from_name(&config.model),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        })
    }

    pub fn model(&self) -> &OpenAIModel {
        &self.model
    }

    fn build_request(&self, prompt: &str) -> OpenAIRequest {
        OpenAIRequest {
            model: self.model.as_str().to_string(),
            messages: vec![
                OpenAIMessage {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                OpenAIMessage {
                    role: "user".to_string(),
                    content: prompt.to_string(),
                },
            ],
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            stream: false,
        }
    }

    async fn send(&self, prompt: &str) -> anyhow::Result<String> {
        let request = self.build_request(prompt);

        debug!("Sending request to OpenAI with model: {}", self.model.as_str());

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            error!("OpenAI API error {}: {}", status, error_text);
            return Err(anyhow::anyhow!("OpenAI API error {}: {}", status, error_text));
        }

        let openai_response: OpenAIResponse = response.json().await?;

        if let Some(usage) = &openai_response.usage {
            info!(
                "Token usage - Prompt: {}, Completion: {}, Total: {}",
                usage.prompt_tokens, usage.completion_tokens, usage.total_tokens
            );
        }

        openai_response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| anyhow::anyhow!("No response choices from OpenAI"))
    }
}

#[async_trait]
impl TextGenerator for OpenAIClient {
    fn name(&self) -> &str {
        "openai"
    }

    async fn complete(&self, prompt: &str) -> Result<String> {
        self.send(prompt)
            .await
            .map_err(|e| InterviewError::Generation(e.to_string()))
    }
}
