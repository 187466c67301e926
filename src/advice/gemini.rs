//! Gemini `generateContent` client.

use crate::advice::prompt::{build_prompt, system_instruction};
use crate::advice::{AdviceError, AdviceGenerator};
use crate::config::AdviceConfig;
use crate::models::{GlobalMetrics, WealthRecord};
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Resolved settings for one advisor.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub model: String,
    pub api_base_url: String,
    /// `None` when the credential is missing or blank.
    pub api_key: Option<String>,
    pub language: String,
    pub temperature: f32,
    pub timeout_seconds: u64,
}

impl GeminiConfig {
    /// Build from the `[advice]` section, reading the key from the
    /// environment variable it names.
    pub fn from_config(advice: &AdviceConfig) -> Self {
        Self::from_config_with(advice, |name| std::env::var(name).ok())
    }

    /// Like [`GeminiConfig::from_config`], with the variable lookup supplied
    /// by the caller.
    pub fn from_config_with<F>(advice: &AdviceConfig, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup(&advice.api_key_env).filter(|key| !key.trim().is_empty());

        if api_key.is_none() {
            debug!("Environment variable {} is not set", advice.api_key_env);
        }

        Self {
            model: advice.model.clone(),
            api_base_url: advice.api_base_url.clone(),
            api_key,
            language: advice.language.clone(),
            temperature: advice.temperature,
            timeout_seconds: advice.timeout_seconds,
        }
    }
}

/// Request body for `generateContent`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    system_instruction: Content,
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize, Default)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
}

/// Response body; only the fields read are modelled.
#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Content,
}

/// Advice generator backed by the Gemini API.
pub struct GeminiAdvisor {
    config: GeminiConfig,
    http_client: reqwest::Client,
}

impl GeminiAdvisor {
    pub fn new(config: GeminiConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            config,
            http_client,
        })
    }

    /// One request, with every failure classified.
    pub async fn try_advice(
        &self,
        record: &WealthRecord,
        metrics: &GlobalMetrics,
    ) -> Result<String, AdviceError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(AdviceError::MissingApiKey)?;

        let url = format!(
            "{}/models/{}:generateContent",
            self.config.api_base_url.trim_end_matches('/'),
            self.config.model
        );

        let request = GenerateRequest {
            system_instruction: Content {
                role: None,
                parts: vec![Part {
                    text: system_instruction(&self.config.language),
                }],
            },
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: build_prompt(record, metrics),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: self.config.temperature,
            },
        };

        info!("Requesting advice for {} from {}", record.id, self.config.model);

        let response = self
            .http_client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AdviceError::Timeout(self.config.timeout_seconds)
                } else if e.is_connect() {
                    AdviceError::Connect(self.config.api_base_url.clone())
                } else {
                    AdviceError::Request(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(AdviceError::Api { status, body });
        }

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| AdviceError::Parse(e.to_string()))?;

        let text: String = body
            .candidates
            .into_iter()
            .next()
            .map(|candidate| {
                candidate
                    .content
                    .parts
                    .into_iter()
                    .map(|part| part.text)
                    .collect()
            })
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(AdviceError::EmptyResponse);
        }

        debug!("Received {} characters of advice", text.len());
        Ok(text)
    }
}

#[async_trait]
impl AdviceGenerator for GeminiAdvisor {
    async fn get_advice(&self, record: &WealthRecord, metrics: &GlobalMetrics) -> String {
        match self.try_advice(record, metrics).await {
            Ok(text) => text,
            Err(e) => {
                if !matches!(e, AdviceError::MissingApiKey) {
                    warn!("Advice request failed: {}", e);
                }
                e.fallback_message().to_string()
            }
        }
    }
}
