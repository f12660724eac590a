// src/core/executor.rs - Test run execution: one generation per context

use std::sync::Arc;

use chrono::Utc;
use tokio::task::JoinSet;

use super::run_id::new_run_id;
use super::types::{ProgressEvent, ProgressFn, RunResult, TestRun};
use crate::infra::errors::QaError;
use crate::provider::{generation_prompt, Generator};
use crate::store::ResultStore;

/// Fans a prompt out over every context and persists the resulting run.
pub struct TestRunExecutor {
    generator: Arc<dyn Generator>,
    store: ResultStore,
}

impl TestRunExecutor {
    pub fn new(generator: Arc<dyn Generator>, store: ResultStore) -> Self {
        Self { generator, store }
    }

    pub fn store(&self) -> &ResultStore {
        &self.store
    }

    /// Generate a response for every context concurrently, then save the run.
    ///
    /// `results[i]` always belongs to `contexts[i]`, whatever order the calls
    /// finish in. Generation failures are recorded as response text, so the
    /// only errors here are storage failures and panicked tasks.
    pub async fn run_test(
        &self,
        project: &str,
        prompt_id: &str,
        prompt_text: &str,
        contexts: Vec<String>,
        progress: Option<ProgressFn<'_>>,
    ) -> Result<TestRun, QaError> {
        let run_id = self.fresh_run_id(project)?;
        let total = contexts.len();
        tracing::info!(
            %run_id,
            project,
            prompt_id,
            contexts = total,
            model = self.generator.model(),
            "Starting test run"
        );

        let mut join_set = JoinSet::new();
        for (idx, context) in contexts.iter().enumerate() {
            let generator = Arc::clone(&self.generator);
            let prompt = generation_prompt(prompt_text, context);
            join_set.spawn(async move {
                let response = generator.generate(&prompt).await;
                (idx, response, Utc::now())
            });
        }

        let mut slots: Vec<Option<RunResult>> = vec![None; total];
        let mut done = 0;
        while let Some(joined) = join_set.join_next().await {
            let (idx, response, at) =
                joined.map_err(|e| QaError::Task(format!("generation task: {}", e)))?;
            let mut result = RunResult::new(contexts[idx].clone(), response);
            result.timestamp = at;
            slots[idx] = Some(result);

            done += 1;
            if let Some(report) = progress {
                report(ProgressEvent { done, total });
            }
        }

        let results = slots
            .into_iter()
            .enumerate()
            .map(|(idx, slot)| {
                slot.ok_or_else(|| QaError::Task(format!("no generation result for context {idx}")))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let run = TestRun {
            run_id,
            project_name: project.to_string(),
            prompt_id: prompt_id.to_string(),
            prompt_text: Some(prompt_text.to_string()),
            timestamp: Utc::now(),
            results,
        };

        self.store.save(&run)?;
        let errors = run.generation_error_count();
        if errors > 0 {
            tracing::warn!(run_id = %run.run_id, errors, "Some generations failed");
        }
        tracing::info!(run_id = %run.run_id, results = run.len(), "Test run saved");
        Ok(run)
    }

    fn fresh_run_id(&self, project: &str) -> Result<String, QaError> {
        // Validates the project name before any model call is made.
        self.store.project_dir(project)?;
        let mut id = new_run_id();
        while self.store.exists(project, &id) {
            id = new_run_id();
        }
        Ok(id)
    }
}
