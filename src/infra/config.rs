// src/infra/config.rs - Configuration loading (TOML)

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::infra::errors::QaError;
use crate::infra::paths;

pub const DEFAULT_GENERATE_URL: &str = "http://localhost:11434/api/generate";
pub const DEFAULT_GENERATE_MODEL: &str = "llama3.2";
pub const DEFAULT_JUDGE_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_JUDGE_MODEL: &str = "gpt-4o-mini";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub generation: GenerationConfig,

    #[serde(default)]
    pub judge: JudgeConfig,

    #[serde(default)]
    pub storage: StorageConfig,
}

/// Local generation endpoint (Ollama-compatible `/api/generate`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    #[serde(default = "default_generate_url")]
    pub url: String,
    #[serde(default = "default_generate_model")]
    pub model: String,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            url: default_generate_url(),
            model: default_generate_model(),
        }
    }
}

/// Remote chat-completion judge. An empty `api_key` disables judging only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JudgeConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_judge_model")]
    pub model: String,
    #[serde(default = "default_judge_base_url")]
    pub base_url: String,
    /// Replaces the built-in evaluation instruction.
    #[serde(default)]
    pub prompt: Option<String>,
}

impl Default for JudgeConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: default_judge_model(),
            base_url: default_judge_base_url(),
            prompt: None,
        }
    }
}

impl JudgeConfig {
    pub fn has_api_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    pub data_dir: Option<PathBuf>,
}

impl StorageConfig {
    pub fn resolve_data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(paths::data_dir)
    }
}

fn default_generate_url() -> String {
    DEFAULT_GENERATE_URL.into()
}

fn default_generate_model() -> String {
    DEFAULT_GENERATE_MODEL.into()
}

fn default_judge_model() -> String {
    DEFAULT_JUDGE_MODEL.into()
}

fn default_judge_base_url() -> String {
    DEFAULT_JUDGE_BASE_URL.into()
}

impl Config {
    /// Load config from the default location, falling back to defaults.
    pub fn load() -> Result<Self, QaError> {
        let path = paths::config_file_path();
        if path.exists() {
            return Self::load_from(&path);
        }
        let mut config = Self::default();
        config.fill_api_key(std::env::var("OPENAI_API_KEY").ok());
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self, QaError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| QaError::Config(format!("cannot read {}: {}", path.display(), e)))?;
        let mut config: Config = toml::from_str(&content)
            .map_err(|e| QaError::Config(format!("{}: {}", path.display(), e)))?;
        config.fill_api_key(std::env::var("OPENAI_API_KEY").ok());
        Ok(config)
    }

    /// Use `key` for the judge when the file left `api_key` empty.
    pub fn fill_api_key(&mut self, key: Option<String>) {
        if self.judge.has_api_key() {
            return;
        }
        if let Some(key) = key.filter(|k| !k.trim().is_empty()) {
            self.judge.api_key = key;
        }
    }
}
