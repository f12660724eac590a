// src/provider/mod.rs - Model clients: local generation and remote judge

pub mod ollama;
pub mod openai;

use async_trait::async_trait;

/// Prefix of a response recorded in place of a failed generation.
pub const GENERATION_ERROR_PREFIX: &str = "Error: ";

/// Recorded when the endpoint answers without a `response` field.
pub const NO_RESPONSE: &str = "No response received.";

/// Prefix of the reason recorded when a judge call fails.
pub const JUDGE_FAILURE_PREFIX: &str = "Validation failed: ";

/// Produces one completion per prompt.
///
/// Implementations never fail: transport and HTTP errors come back as a
/// response string starting with [`GENERATION_ERROR_PREFIX`], so a run always
/// has one result per context.
#[async_trait]
pub trait Generator: Send + Sync {
    fn model(&self) -> &str;

    async fn generate(&self, prompt: &str) -> String;
}

/// Grades one (context, response) pair.
///
/// Like [`Generator`], failures are data: a verdict with `status = false` and
/// a reason starting with [`JUDGE_FAILURE_PREFIX`].
#[async_trait]
pub trait Judge: Send + Sync {
    fn model(&self) -> &str;

    async fn judge(&self, context: &str, prompt: &str, response: &str) -> JudgeVerdict;
}

#[derive(Debug, Clone, PartialEq)]
pub struct JudgeVerdict {
    pub status: bool,
    pub reason: String,
    pub model: String,
    /// Raw judge message content; `None` when the call failed.
    pub raw_response: Option<String>,
}

impl JudgeVerdict {
    pub fn failed(model: impl Into<String>, cause: impl std::fmt::Display) -> Self {
        Self {
            status: false,
            reason: format!("{JUDGE_FAILURE_PREFIX}{cause}"),
            model: model.into(),
            raw_response: None,
        }
    }

    pub fn is_failure(&self) -> bool {
        self.raw_response.is_none() && self.reason.starts_with(JUDGE_FAILURE_PREFIX)
    }
}

/// Prompt sent to the generation model for one context.
pub fn generation_prompt(prompt_text: &str, context: &str) -> String {
    format!("{prompt_text}\n\nContext:\n{context}")
}
