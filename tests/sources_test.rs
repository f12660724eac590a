// tests/sources_test.rs - Integration test: context files feeding a test run

use std::sync::Arc;

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use tempfile::TempDir;

use promptqa::core::TestRunExecutor;
use promptqa::infra::errors::QaError;
use promptqa::provider::Generator;
use promptqa::sources;
use promptqa::sources::spreadsheet::SpreadsheetSource;
use promptqa::sources::ContextSource;
use promptqa::store::ResultStore;

struct UpperGenerator;

#[async_trait]
impl Generator for UpperGenerator {
    fn model(&self) -> &str {
        "upper"
    }

    async fn generate(&self, prompt: &str) -> String {
        prompt.to_uppercase()
    }
}

#[tokio::test]
async fn test_json_contexts_drive_a_run() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("contexts.json");
    std::fs::write(&file, r#"{"contexts": ["a", "b", "c"]}"#).unwrap();

    let contexts = sources::load_contexts(&file).unwrap();
    let executor = TestRunExecutor::new(
        Arc::new(UpperGenerator),
        ResultStore::new(dir.path().join("results")),
    );
    let run = executor
        .run_test("p", "prompt_1", "check", contexts, None)
        .await
        .unwrap();

    let got: Vec<(&str, &str)> = run
        .results
        .iter()
        .map(|r| (r.context.as_str(), r.model_response.as_str()))
        .collect();
    assert_eq!(
        got,
        vec![
            ("a", "CHECK\n\nCONTEXT:\nA"),
            ("b", "CHECK\n\nCONTEXT:\nB"),
            ("c", "CHECK\n\nCONTEXT:\nC"),
        ]
    );
}

fn fixture(name: &str) -> std::path::PathBuf {
    std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

#[test]
fn test_xlsx_column_a_after_header() {
    let contexts = SpreadsheetSource.parse(&fixture("contexts.xlsx")).unwrap();

    // A3 is numeric, A4 is blank while B4 holds text.
    assert_eq!(contexts, vec!["12 Main St", "42", "", "last"]);
}

#[test]
fn test_xlsx_loads_through_registry() {
    let contexts = sources::load_contexts(&fixture("contexts.xlsx")).unwrap();
    assert_eq!(contexts.len(), 4);
    assert!(!contexts.contains(&"context".to_string()));
}

#[test]
fn test_documents_shape() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("docs.JSON");
    std::fs::write(
        &file,
        r#"{"documents": [{"content": "first"}, {"content": "second", "id": 7}]}"#,
    )
    .unwrap();

    assert_eq!(
        sources::load_contexts(&file).unwrap(),
        vec!["first", "second"]
    );
}

#[test]
fn test_unsupported_extension_is_checked_first() {
    let err = sources::load_contexts(std::path::Path::new("/missing/contexts.csv")).unwrap_err();
    assert!(matches!(err, QaError::UnsupportedType(_)));
}

#[test]
fn test_missing_file_is_not_found() {
    let err = sources::load_contexts(std::path::Path::new("/missing/contexts.json")).unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn test_malformed_json_is_format_error() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("bad.json");
    std::fs::write(&file, r#"{"contexts": ["ok", 3]}"#).unwrap();
    assert!(matches!(
        sources::load_contexts(&file),
        Err(QaError::Format(_))
    ));
}

#[test]
fn test_registered_extensions() {
    let exts: Vec<&str> = sources::supported_extensions().collect();
    for ext in ["json", "xlsx", "xlsm", "xls", "ods"] {
        assert!(exts.contains(&ext), "{ext} not registered");
    }
}
