// src/core/types.rs - Test run records and validation channels

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::timestamp;
use crate::infra::errors::QaError;
use crate::provider::GENERATION_ERROR_PREFIX;

/// One execution of a prompt over every context of a data source.
///
/// `results` keeps context order for the lifetime of the run; validations are
/// written into existing entries, entries are never added or removed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestRun {
    pub run_id: String,
    pub project_name: String,
    pub prompt_id: String,
    /// Snapshot of the prompt wording when the run was created. `None` only
    /// for files written before the snapshot was stored; empty text is valid.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_text: Option<String>,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub timestamp: DateTime<Utc>,
    pub results: Vec<RunResult>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunResult {
    pub context: String,
    pub model_response: String,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub validations: Validations,
}

/// Independent validation slots. Absence of a slot means "not yet judged".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Validations {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manual: Option<ManualValidation>,
    /// Automated judge channel. The on-disk key predates provider choice.
    #[serde(rename = "openai", default, skip_serializing_if = "Option::is_none")]
    pub judge: Option<JudgeValidation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManualValidation {
    pub status: ManualStatus,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JudgeValidation {
    pub status: bool,
    pub reason: String,
    pub model: String,
    /// Raw judge reply; absent when the judge call itself failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub timestamp: DateTime<Utc>,
}

/// Human verdict: stored as `true`, `false` or `"skipped"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManualStatus {
    Success,
    Failure,
    Skipped,
}

impl Serialize for ManualStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ManualStatus::Success => serializer.serialize_bool(true),
            ManualStatus::Failure => serializer.serialize_bool(false),
            ManualStatus::Skipped => serializer.serialize_str("skipped"),
        }
    }
}

impl<'de> Deserialize<'de> for ManualStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Bool(bool),
            Str(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Bool(true) => Ok(ManualStatus::Success),
            Raw::Bool(false) => Ok(ManualStatus::Failure),
            Raw::Str(s) if s == "skipped" => Ok(ManualStatus::Skipped),
            Raw::Str(s) => Err(serde::de::Error::custom(format!(
                "invalid manual status: {s}"
            ))),
        }
    }
}

impl std::str::FromStr for ManualStatus {
    type Err = QaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "success" | "pass" | "true" | "yes" => Ok(ManualStatus::Success),
            "fail" | "failure" | "false" | "no" => Ok(ManualStatus::Failure),
            "skip" | "skipped" => Ok(ManualStatus::Skipped),
            other => Err(QaError::Format(format!("unknown manual status '{other}'"))),
        }
    }
}

impl std::fmt::Display for ManualStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ManualStatus::Success => write!(f, "success"),
            ManualStatus::Failure => write!(f, "fail"),
            ManualStatus::Skipped => write!(f, "skipped"),
        }
    }
}

/// Completion count reported while a fan-out is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressEvent {
    pub done: usize,
    pub total: usize,
}

impl ProgressEvent {
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            100.0
        } else {
            self.done as f64 / self.total as f64 * 100.0
        }
    }
}

/// Progress callback. Invoked on the orchestrating task, in completion order.
pub type ProgressFn<'a> = &'a (dyn Fn(ProgressEvent) + Sync);

impl RunResult {
    pub fn new(context: String, model_response: String) -> Self {
        Self {
            context,
            model_response,
            timestamp: Utc::now(),
            validations: Validations::default(),
        }
    }

    pub fn is_judged(&self) -> bool {
        self.validations.judge.is_some()
    }

    /// True when generation failed and the response holds the error text.
    pub fn is_generation_error(&self) -> bool {
        self.model_response.starts_with(GENERATION_ERROR_PREFIX)
    }
}

impl TestRun {
    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Indices of results at or after `start` that lack a judge verdict.
    pub fn unjudged_indices(&self, start: usize) -> Vec<usize> {
        self.results
            .iter()
            .enumerate()
            .skip(start)
            .filter(|(_, r)| !r.is_judged())
            .map(|(i, _)| i)
            .collect()
    }

    pub fn unjudged_count(&self) -> usize {
        self.results.iter().filter(|r| !r.is_judged()).count()
    }

    /// Record a human verdict on one result. The judge slot is left alone.
    pub fn record_manual(&mut self, index: usize, status: ManualStatus) -> Result<(), QaError> {
        let len = self.results.len();
        let result = self.results.get_mut(index).ok_or_else(|| {
            QaError::not_found("result", format!("#{index} of {len} in {}", self.run_id))
        })?;
        result.validations.manual = Some(ManualValidation {
            status,
            timestamp: Utc::now(),
        });
        Ok(())
    }

    /// Next result at or after `from` without a manual verdict.
    pub fn next_unvalidated_manual(&self, from: usize) -> Option<usize> {
        self.results
            .iter()
            .enumerate()
            .skip(from)
            .find(|(_, r)| r.validations.manual.is_none())
            .map(|(i, _)| i)
    }

    pub fn generation_error_count(&self) -> usize {
        self.results
            .iter()
            .filter(|r| r.is_generation_error())
            .count()
    }
}
