// src/provider/openai.rs - OpenAI-compatible chat-completion judge

use async_trait::async_trait;
use serde::Deserialize;

use super::{Judge, JudgeVerdict};
use crate::infra::config::JudgeConfig;
use crate::infra::errors::QaError;

/// Built-in evaluation instruction. `[judge].prompt` replaces it.
pub const DEFAULT_JUDGE_PROMPT: &str = "You are a validation assistant. Your task is to validate if the model's \
response is the correct output.\n\n\
Evaluate whether the model's response is correct. You do not need to worry about punctuation or \
capitalization, however otherwise the answer must be in the requested format.\n\
Respond with a JSON object containing:\n\
- reason: brief explanation of your assessment\n\
- valid: boolean indicating if the response is valid\n\
- format_fail: boolean indicating if there was a formatting issue\n\
Example:\n\
{\n  \"reason\": \"The response is correct because the addresses shown are likely a match, since the \
non-matching elements are unimportant, and the response given was Yes,\",\n  \"valid\": true,\n  \
\"format_fail\": false\n}\n";

/// Structured verdict the judge model is instructed to return.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct JudgeReply {
    pub reason: String,
    pub valid: bool,
    #[serde(default)]
    pub format_fail: bool,
}

/// Parse the judge's message content, tolerating a Markdown code fence.
pub fn parse_judge_reply(content: &str) -> Result<JudgeReply, QaError> {
    serde_json::from_str(strip_code_fence(content))
        .map_err(|e| QaError::Format(format!("judge reply is not valid verdict JSON: {}", e)))
}

fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string ("json") on the opening fence line.
    let body = match rest.find('\n') {
        Some(pos) => &rest[pos + 1..],
        None => rest,
    };
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

/// One chat-completion request per (context, response) pair. No retries;
/// concurrency belongs to the caller.
pub struct OpenAiJudge {
    api_key: String,
    model: String,
    base_url: String,
    system_prompt: String,
    client: reqwest::Client,
}

impl OpenAiJudge {
    pub fn new(config: JudgeConfig) -> Result<Self, QaError> {
        Self::with_client(config, reqwest::Client::new())
    }

    pub fn with_client(config: JudgeConfig, client: reqwest::Client) -> Result<Self, QaError> {
        if !config.has_api_key() {
            return Err(QaError::Config(
                "judge API key not set; add [judge].api_key to config.toml or set OPENAI_API_KEY"
                    .into(),
            ));
        }
        url::Url::parse(&config.base_url).map_err(|e| {
            QaError::Config(format!("invalid judge base_url '{}': {}", config.base_url, e))
        })?;

        Ok(Self {
            api_key: config.api_key,
            model: config.model,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            system_prompt: config
                .prompt
                .unwrap_or_else(|| DEFAULT_JUDGE_PROMPT.to_string()),
            client,
        })
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    fn user_message(context: &str, prompt: &str, response: &str) -> String {
        format!("Prompt:\n{prompt}\n{context}\n\n\nResponse to validate:\n{response}")
    }

    /// Single request. Returns the parsed verdict and the raw message content.
    pub async fn try_judge(
        &self,
        context: &str,
        prompt: &str,
        response: &str,
    ) -> Result<(JudgeReply, String), QaError> {
        let body = serde_json::json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": self.system_prompt},
                {"role": "user", "content": Self::user_message(context, prompt, response)},
            ],
        });

        let http_response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await?;

        let status = http_response.status();
        if !status.is_success() {
            let error_body = http_response.text().await.unwrap_or_default();
            return Err(QaError::Transport(format!("HTTP {}: {}", status, error_body)));
        }

        let completion: serde_json::Value = http_response
            .json()
            .await
            .map_err(|e| QaError::Transport(format!("Failed to parse response: {}", e)))?;

        let content = completion["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| QaError::Format("completion has no message content".into()))?
            .to_string();

        let reply = parse_judge_reply(&content)?;
        Ok((reply, content))
    }
}

#[async_trait]
impl Judge for OpenAiJudge {
    fn model(&self) -> &str {
        &self.model
    }

    async fn judge(&self, context: &str, prompt: &str, response: &str) -> JudgeVerdict {
        match self.try_judge(context, prompt, response).await {
            Ok((reply, raw)) => {
                if reply.format_fail {
                    tracing::debug!(model = %self.model, "Judge flagged a format failure");
                }
                JudgeVerdict {
                    status: reply.valid,
                    reason: reply.reason,
                    model: self.model.clone(),
                    raw_response: Some(raw),
                }
            }
            Err(e) => {
                tracing::warn!(model = %self.model, "Judge call failed: {}", e);
                JudgeVerdict::failed(self.model.clone(), e.detail())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_key(key: &str) -> JudgeConfig {
        JudgeConfig {
            api_key: key.into(),
            ..JudgeConfig::default()
        }
    }

    #[test]
    fn test_parse_plain_reply() {
        let r = parse_judge_reply(r#"{"reason":"ok","valid":true,"format_fail":false}"#).unwrap();
        assert_eq!(r.reason, "ok");
        assert!(r.valid);
        assert!(!r.format_fail);
    }

    #[test]
    fn test_parse_fenced_reply() {
        let content = "```json\n{\"reason\": \"wrong city\", \"valid\": false}\n```";
        let r = parse_judge_reply(content).unwrap();
        assert_eq!(r.reason, "wrong city");
        assert!(!r.valid);
    }

    #[test]
    fn test_parse_missing_valid_field() {
        let err = parse_judge_reply(r#"{"reason":"ok"}"#).unwrap_err();
        assert!(matches!(err, QaError::Format(_)));
    }

    #[test]
    fn test_parse_non_json() {
        assert!(parse_judge_reply("Looks right to me!").is_err());
    }

    #[test]
    fn test_empty_key_is_config_error() {
        let err = OpenAiJudge::new(config_with_key("  ")).err().unwrap();
        assert!(matches!(err, QaError::Config(_)));
    }

    #[test]
    fn test_prompt_override() {
        let mut cfg = config_with_key("sk-test");
        let judge = OpenAiJudge::new(cfg.clone()).unwrap();
        assert_eq!(judge.system_prompt(), DEFAULT_JUDGE_PROMPT);

        cfg.prompt = Some("Be strict.".into());
        let judge = OpenAiJudge::new(cfg).unwrap();
        assert_eq!(judge.system_prompt(), "Be strict.");
    }

    #[test]
    fn test_user_message_layout() {
        let msg = OpenAiJudge::user_message("ctx", "Is it valid?", "Yes");
        assert_eq!(msg, "Prompt:\nIs it valid?\nctx\n\n\nResponse to validate:\nYes");
    }
}
