// tests/executor_test.rs - Integration test: test run execution with a mock generator

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use tempfile::TempDir;

use promptqa::core::types::ProgressEvent;
use promptqa::core::TestRunExecutor;
use promptqa::provider::{Generator, GENERATION_ERROR_PREFIX};
use promptqa::store::ResultStore;

/// Echoes the context back. Earlier contexts sleep longer, so calls finish
/// in reverse order of issue.
struct EchoGenerator {
    total: u64,
    calls: AtomicUsize,
}

impl EchoGenerator {
    fn new(total: usize) -> Self {
        Self {
            total: total as u64,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl Generator for EchoGenerator {
    fn model(&self) -> &str {
        "echo"
    }

    async fn generate(&self, prompt: &str) -> String {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let context = prompt.rsplit("Context:\n").next().unwrap_or_default();
        let n: u64 = context.trim_start_matches('c').parse().unwrap_or(0);
        tokio::time::sleep(Duration::from_millis((self.total - n) * 10)).await;
        format!("echo:{context}")
    }
}

/// Always fails the way a real client reports an unreachable server.
struct DownGenerator;

#[async_trait]
impl Generator for DownGenerator {
    fn model(&self) -> &str {
        "down"
    }

    async fn generate(&self, _prompt: &str) -> String {
        format!("{GENERATION_ERROR_PREFIX}connection refused")
    }
}

fn contexts(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("c{i}")).collect()
}

#[tokio::test]
async fn test_results_follow_context_order() {
    let dir = TempDir::new().unwrap();
    let executor = TestRunExecutor::new(
        Arc::new(EchoGenerator::new(5)),
        ResultStore::new(dir.path()),
    );

    let run = executor
        .run_test("addr", "prompt_1", "Is this valid?", contexts(5), None)
        .await
        .unwrap();

    assert_eq!(run.len(), 5);
    for (i, result) in run.results.iter().enumerate() {
        assert_eq!(result.context, format!("c{i}"));
        assert_eq!(result.model_response, format!("echo:c{i}"));
        assert!(result.validations.manual.is_none());
        assert!(result.validations.judge.is_none());
    }
    assert_eq!(run.project_name, "addr");
    assert_eq!(run.prompt_id, "prompt_1");
    assert_eq!(run.prompt_text.as_deref(), Some("Is this valid?"));
    assert!(run.run_id.starts_with("run_"));
}

#[tokio::test]
async fn test_run_is_persisted_before_return() {
    let dir = TempDir::new().unwrap();
    let store = ResultStore::new(dir.path());
    let executor = TestRunExecutor::new(Arc::new(EchoGenerator::new(3)), store.clone());

    let run = executor
        .run_test("addr", "prompt_1", "P", contexts(3), None)
        .await
        .unwrap();

    let loaded = store.load("addr", &run.run_id).unwrap();
    assert_eq!(loaded, run);
}

#[tokio::test]
async fn test_progress_reports_every_completion() {
    let dir = TempDir::new().unwrap();
    let executor = TestRunExecutor::new(
        Arc::new(EchoGenerator::new(4)),
        ResultStore::new(dir.path()),
    );
    let events = Mutex::new(Vec::new());
    let record = |e: ProgressEvent| events.lock().unwrap().push(e);

    executor
        .run_test("addr", "prompt_1", "P", contexts(4), Some(&record))
        .await
        .unwrap();

    let events = events.into_inner().unwrap();
    let done: Vec<usize> = events.iter().map(|e| e.done).collect();
    assert_eq!(done, vec![1, 2, 3, 4]);
    assert!(events.iter().all(|e| e.total == 4));
}

#[tokio::test]
async fn test_failed_generations_are_recorded_as_text() {
    let dir = TempDir::new().unwrap();
    let executor = TestRunExecutor::new(Arc::new(DownGenerator), ResultStore::new(dir.path()));

    let run = executor
        .run_test("addr", "prompt_1", "P", contexts(3), None)
        .await
        .unwrap();

    assert_eq!(run.len(), 3);
    assert_eq!(run.generation_error_count(), 3);
    assert!(run.results[0].model_response.starts_with("Error: "));
}

#[tokio::test]
async fn test_empty_context_list() {
    let dir = TempDir::new().unwrap();
    let store = ResultStore::new(dir.path());
    let executor = TestRunExecutor::new(Arc::new(EchoGenerator::new(0)), store.clone());

    let run = executor
        .run_test("addr", "prompt_1", "P", Vec::new(), None)
        .await
        .unwrap();

    assert!(run.is_empty());
    assert!(store.exists("addr", &run.run_id));
}

#[tokio::test]
async fn test_invalid_project_fails_before_generating() {
    let dir = TempDir::new().unwrap();
    let generator = Arc::new(EchoGenerator::new(2));
    let executor = TestRunExecutor::new(generator.clone(), ResultStore::new(dir.path()));

    let err = executor
        .run_test("../escape", "prompt_1", "P", contexts(2), None)
        .await
        .unwrap_err();

    assert!(matches!(err, promptqa::infra::errors::QaError::Format(_)));
    assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_back_to_back_runs_get_distinct_ids() {
    let dir = TempDir::new().unwrap();
    let store = ResultStore::new(dir.path());
    let executor = TestRunExecutor::new(Arc::new(EchoGenerator::new(1)), store.clone());

    let a = executor
        .run_test("addr", "prompt_1", "P", contexts(1), None)
        .await
        .unwrap();
    let b = executor
        .run_test("addr", "prompt_1", "P", contexts(1), None)
        .await
        .unwrap();

    assert_ne!(a.run_id, b.run_id);
    assert_eq!(store.list("addr").unwrap().len(), 2);
}
