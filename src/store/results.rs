// src/store/results.rs - Test run documents, one JSON file per run
//
// Layout: <root>/<project>/<runId>.json. Every write replaces the whole
// document; nothing is appended or patched in place.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::stats::{self, RunStats};
use super::{check_component, write_json_atomic};
use crate::core::types::TestRun;
use crate::infra::errors::QaError;
use crate::infra::paths;

/// One row of a project's run listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub run_id: String,
    pub timestamp: DateTime<Utc>,
    pub prompt_id: String,
    pub stats: RunStats,
}

#[derive(Debug, Clone)]
pub struct ResultStore {
    root: PathBuf,
}

impl ResultStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Store rooted at `<data_dir>/results`.
    pub fn in_data_dir(data_dir: &Path) -> Self {
        Self::new(paths::results_dir(data_dir))
    }

    pub fn project_dir(&self, project: &str) -> Result<PathBuf, QaError> {
        check_component("project", project)?;
        Ok(self.root.join(project))
    }

    pub fn run_path(&self, project: &str, run_id: &str) -> Result<PathBuf, QaError> {
        check_component("run", run_id)?;
        Ok(self.project_dir(project)?.join(format!("{run_id}.json")))
    }

    pub fn exists(&self, project: &str, run_id: &str) -> bool {
        self.run_path(project, run_id)
            .map(|p| p.is_file())
            .unwrap_or(false)
    }

    /// Write `run` to its canonical location, replacing any previous version.
    pub fn save(&self, run: &TestRun) -> Result<PathBuf, QaError> {
        let path = self.run_path(&run.project_name, &run.run_id)?;
        write_json_atomic(&path, run)?;
        tracing::debug!(
            run_id = %run.run_id,
            results = run.results.len(),
            "Saved test run to {}",
            path.display()
        );
        Ok(path)
    }

    pub fn load(&self, project: &str, run_id: &str) -> Result<TestRun, QaError> {
        let path = self.run_path(project, run_id)?;
        read_run(&path).map_err(|e| match e {
            QaError::NotFound { .. } => QaError::not_found("test run", format!("{project}/{run_id}")),
            other => other,
        })
    }

    /// Runs of `project`, newest first, with statistics computed from the
    /// stored results. Unreadable files are logged and left out.
    pub fn list(&self, project: &str) -> Result<Vec<RunSummary>, QaError> {
        let mut summaries: Vec<RunSummary> = self
            .run_files(project)?
            .into_iter()
            .filter_map(|path| match read_run(&path) {
                Ok(run) => Some(RunSummary {
                    stats: stats::compute(&run.results),
                    run_id: run.run_id,
                    timestamp: run.timestamp,
                    prompt_id: run.prompt_id,
                }),
                Err(e) => {
                    tracing::warn!("Skipping unreadable run file {}: {}", path.display(), e);
                    None
                }
            })
            .collect();

        summaries.sort_by(|a, b| {
            b.timestamp
                .cmp(&a.timestamp)
                .then_with(|| b.run_id.cmp(&a.run_id))
        });
        Ok(summaries)
    }

    /// Persist validations into an existing run. Never creates a run file.
    pub fn save_validation(&self, project: &str, run_id: &str, run: &TestRun) -> Result<(), QaError> {
        if run.project_name != project || run.run_id != run_id {
            return Err(QaError::Format(format!(
                "run {}/{} does not match target {project}/{run_id}",
                run.project_name, run.run_id
            )));
        }
        let path = self.run_path(project, run_id)?;
        if !path.is_file() {
            return Err(QaError::not_found("test run", format!("{project}/{run_id}")));
        }
        write_json_atomic(&path, run)?;
        tracing::debug!(%run_id, "Saved validations to {}", path.display());
        Ok(())
    }

    pub fn delete(&self, project: &str, run_id: &str) -> Result<(), QaError> {
        let path = self.run_path(project, run_id)?;
        std::fs::remove_file(&path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => {
                QaError::not_found("test run", format!("{project}/{run_id}"))
            }
            _ => QaError::storage(&path, e),
        })
    }

    /// Remove every run of `project` and then its directory. Returns the
    /// number of run files removed; a project without runs is not an error.
    pub fn delete_all_for_project(&self, project: &str) -> Result<usize, QaError> {
        let dir = self.project_dir(project)?;
        if !dir.exists() {
            return Ok(0);
        }

        let entries = std::fs::read_dir(&dir).map_err(|e| QaError::storage(&dir, e))?;
        let mut removed = 0;
        for entry in entries {
            let entry = entry.map_err(|e| QaError::storage(&dir, e))?;
            let path = entry.path();
            if path.is_file() {
                std::fs::remove_file(&path).map_err(|e| QaError::storage(&path, e))?;
                if path.extension().is_some_and(|ext| ext == "json") {
                    removed += 1;
                }
            }
        }
        std::fs::remove_dir(&dir).map_err(|e| QaError::storage(&dir, e))?;
        tracing::info!(project, removed, "Deleted all test runs");
        Ok(removed)
    }

    fn run_files(&self, project: &str) -> Result<Vec<PathBuf>, QaError> {
        let dir = self.project_dir(project)?;
        let entries = match std::fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(QaError::storage(&dir, e)),
        };

        let mut files = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| QaError::storage(&dir, e))?.path();
            let hidden = path
                .file_name()
                .is_some_and(|n| n.to_string_lossy().starts_with('.'));
            if !hidden && path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
                files.push(path);
            }
        }
        Ok(files)
    }
}

fn read_run(path: &Path) -> Result<TestRun, QaError> {
    let raw = std::fs::read_to_string(path).map_err(|e| QaError::from_io("file", path, e))?;
    serde_json::from_str(&raw)
        .map_err(|e| QaError::Format(format!("{} is not a valid test run: {}", path.display(), e)))
}
