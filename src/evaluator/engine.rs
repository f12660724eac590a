// src/evaluator/engine.rs - Concurrent judge fan-out over a test run

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::task::JoinSet;

use crate::core::types::{JudgeValidation, ProgressEvent, ProgressFn, TestRun};
use crate::infra::errors::QaError;
use crate::provider::{Judge, JudgeVerdict};

/// Outcome of one `validate_batch` call. Covers only the items judged in
/// this batch, not the whole run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchStats {
    pub total: usize,
    pub validated: usize,
    pub success: usize,
    pub failed: usize,
    pub success_rate: f64,
}

impl BatchStats {
    fn tally(total: usize, verdicts: impl Iterator<Item = bool>) -> Self {
        let mut stats = Self {
            total,
            ..Default::default()
        };
        for ok in verdicts {
            stats.validated += 1;
            if ok {
                stats.success += 1;
            }
        }
        stats.failed = stats.validated - stats.success;
        if stats.validated > 0 {
            stats.success_rate = stats.success as f64 / stats.validated as f64 * 100.0;
        }
        stats
    }
}

/// Runs the judge over unjudged results and writes verdicts into the run.
/// Persisting the run afterwards is up to the caller.
pub struct ValidationEngine {
    judge: Arc<dyn Judge>,
}

impl ValidationEngine {
    pub fn new(judge: Arc<dyn Judge>) -> Self {
        Self { judge }
    }

    pub fn model(&self) -> &str {
        self.judge.model()
    }

    pub async fn validate_batch(
        &self,
        run: &mut TestRun,
        count: usize,
        progress: Option<ProgressFn<'_>>,
    ) -> Result<BatchStats, QaError> {
        self.validate_batch_from(run, 0, count, progress).await
    }

    /// Judge up to `count` unjudged results at index `start` or later.
    ///
    /// Results already carrying a judge verdict are never re-judged. A count
    /// larger than what is available just processes what is there.
    pub async fn validate_batch_from(
        &self,
        run: &mut TestRun,
        start: usize,
        count: usize,
        progress: Option<ProgressFn<'_>>,
    ) -> Result<BatchStats, QaError> {
        let Some(prompt_text) = run.prompt_text.clone() else {
            return Err(QaError::Format(format!(
                "run {} was saved without its prompt text",
                run.run_id
            )));
        };

        let selected: Vec<usize> = run.unjudged_indices(start).into_iter().take(count).collect();
        let total = selected.len();
        if total == 0 {
            return Ok(BatchStats::default());
        }

        tracing::info!(
            run_id = %run.run_id,
            total,
            model = self.judge.model(),
            "Starting judge batch"
        );

        let mut join_set = JoinSet::new();
        for idx in selected {
            let judge = Arc::clone(&self.judge);
            let prompt = prompt_text.clone();
            let context = run.results[idx].context.clone();
            let response = run.results[idx].model_response.clone();
            join_set.spawn(async move {
                let verdict = judge.judge(&context, &prompt, &response).await;
                (idx, verdict)
            });
        }

        let mut verdicts = Vec::with_capacity(total);
        while let Some(joined) = join_set.join_next().await {
            let (idx, verdict): (usize, JudgeVerdict) =
                joined.map_err(|e| QaError::Task(format!("judge task: {}", e)))?;

            if verdict.is_failure() {
                tracing::debug!(index = idx, reason = %verdict.reason, "Judge call failed");
            }
            verdicts.push(verdict.status);
            run.results[idx].validations.judge = Some(JudgeValidation {
                status: verdict.status,
                reason: verdict.reason,
                model: verdict.model,
                response: verdict.raw_response,
                timestamp: Utc::now(),
            });

            if let Some(report) = progress {
                report(ProgressEvent {
                    done: verdicts.len(),
                    total,
                });
            }
        }

        let stats = BatchStats::tally(total, verdicts.into_iter());
        tracing::info!(
            run_id = %run.run_id,
            validated = stats.validated,
            success = stats.success,
            "Judge batch finished"
        );
        Ok(stats)
    }
}
