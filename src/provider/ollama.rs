// src/provider/ollama.rs - Ollama local generation client

use async_trait::async_trait;

use super::{Generator, GENERATION_ERROR_PREFIX, NO_RESPONSE};
use crate::infra::config::GenerationConfig;
use crate::infra::errors::QaError;

/// Issues one non-streaming `/api/generate` request per prompt. No retries.
pub struct OllamaClient {
    url: String,
    model: String,
    client: reqwest::Client,
}

impl OllamaClient {
    pub fn new(config: &GenerationConfig) -> Result<Self, QaError> {
        Self::with_client(config, reqwest::Client::new())
    }

    pub fn with_client(config: &GenerationConfig, client: reqwest::Client) -> Result<Self, QaError> {
        url::Url::parse(&config.url)
            .map_err(|e| QaError::Config(format!("invalid generation url '{}': {}", config.url, e)))?;
        Ok(Self {
            url: config.url.clone(),
            model: config.model.clone(),
            client,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Single request; errors are returned rather than folded into text.
    pub async fn try_generate(&self, prompt: &str) -> Result<String, QaError> {
        let body = serde_json::json!({
            "model": self.model,
            "prompt": prompt,
            "stream": false,
        });

        let response = self.client.post(&self.url).json(&body).send().await?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(QaError::Transport(format!("HTTP {}: {}", status, error_body)));
        }

        let resp: serde_json::Value = response
            .json()
            .await
            .map_err(|e| QaError::Transport(format!("Failed to parse response: {}", e)))?;

        Ok(resp["response"].as_str().unwrap_or(NO_RESPONSE).to_string())
    }
}

#[async_trait]
impl Generator for OllamaClient {
    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str) -> String {
        match self.try_generate(prompt).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(model = %self.model, "Generation failed: {}", e);
                format!("{}{}", GENERATION_ERROR_PREFIX, e.detail())
            }
        }
    }
}
