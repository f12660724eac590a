// src/store/projects.rs - Project registry (projects.json)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::results::ResultStore;
use super::{check_component, write_json_atomic};
use crate::core::timestamp;
use crate::infra::errors::QaError;
use crate::infra::paths;
use crate::sources;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub name: String,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub created: DateTime<Utc>,
    #[serde(default)]
    pub prompts: Vec<Prompt>,
    #[serde(default)]
    pub data_sources: Vec<DataSourceRef>,
    /// Next prompt number to hand out. Only grows, so ids are never reused.
    #[serde(default)]
    pub next_prompt_seq: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prompt {
    pub id: String,
    pub text: String,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub created: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataSourceRef {
    pub path: String,
    /// Lowercase file extension without the dot.
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub last_used: DateTime<Utc>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct ProjectsFile {
    #[serde(default)]
    projects: Vec<Project>,
}

const PROMPT_ID_PREFIX: &str = "prompt_";

impl Project {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            created: Utc::now(),
            prompts: Vec::new(),
            data_sources: Vec::new(),
            next_prompt_seq: 1,
        }
    }

    pub fn prompt(&self, id: &str) -> Option<&Prompt> {
        self.prompts.iter().find(|p| p.id == id)
    }

    fn allocate_prompt_id(&mut self) -> String {
        let highest_existing = self
            .prompts
            .iter()
            .filter_map(|p| p.id.strip_prefix(PROMPT_ID_PREFIX)?.parse::<u64>().ok())
            .max()
            .unwrap_or(0);
        let seq = self.next_prompt_seq.max(highest_existing + 1).max(1);
        self.next_prompt_seq = seq + 1;
        format!("{PROMPT_ID_PREFIX}{seq}")
    }
}

/// All projects live in one JSON document; each mutation rewrites it.
#[derive(Debug, Clone)]
pub struct ProjectRegistry {
    path: PathBuf,
}

impl ProjectRegistry {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn in_data_dir(data_dir: &Path) -> Self {
        Self::new(paths::projects_file(data_dir))
    }

    pub fn load_projects(&self) -> Result<Vec<Project>, QaError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(QaError::storage(&self.path, e)),
        };
        let file: ProjectsFile = serde_json::from_str(&raw).map_err(|e| {
            QaError::Format(format!("{} is not a valid projects file: {}", self.path.display(), e))
        })?;
        Ok(file.projects)
    }

    fn save_projects(&self, projects: Vec<Project>) -> Result<(), QaError> {
        write_json_atomic(&self.path, &ProjectsFile { projects })
    }

    /// Load, mutate one project, save.
    fn update<T>(
        &self,
        name: &str,
        f: impl FnOnce(&mut Project) -> Result<T, QaError>,
    ) -> Result<T, QaError> {
        let mut projects = self.load_projects()?;
        let project = projects
            .iter_mut()
            .find(|p| p.name == name)
            .ok_or_else(|| QaError::not_found("project", name))?;
        let out = f(project)?;
        self.save_projects(projects)?;
        Ok(out)
    }

    pub fn get_project(&self, name: &str) -> Result<Project, QaError> {
        self.load_projects()?
            .into_iter()
            .find(|p| p.name == name)
            .ok_or_else(|| QaError::not_found("project", name))
    }

    pub fn create_project(&self, name: &str) -> Result<Project, QaError> {
        let name = name.trim();
        check_component("project", name)?;

        let mut projects = self.load_projects()?;
        if projects.iter().any(|p| p.name == name) {
            return Err(QaError::AlreadyExists {
                what: "project",
                name: name.to_string(),
            });
        }
        let project = Project::new(name);
        projects.push(project.clone());
        self.save_projects(projects)?;
        tracing::info!(project = name, "Created project");
        Ok(project)
    }

    pub fn add_prompt(&self, project: &str, text: &str) -> Result<Prompt, QaError> {
        self.update(project, |p| {
            let prompt = Prompt {
                id: p.allocate_prompt_id(),
                text: text.to_string(),
                created: Utc::now(),
            };
            p.prompts.push(prompt.clone());
            Ok(prompt)
        })
    }

    /// Edit prompt wording. Runs already made keep their own snapshot.
    pub fn update_prompt(&self, project: &str, prompt_id: &str, text: &str) -> Result<(), QaError> {
        self.update(project, |p| {
            let prompt = p
                .prompts
                .iter_mut()
                .find(|pr| pr.id == prompt_id)
                .ok_or_else(|| QaError::not_found("prompt", prompt_id))?;
            prompt.text = text.to_string();
            Ok(())
        })
    }

    pub fn delete_prompt(&self, project: &str, prompt_id: &str) -> Result<Prompt, QaError> {
        self.update(project, |p| {
            let pos = p
                .prompts
                .iter()
                .position(|pr| pr.id == prompt_id)
                .ok_or_else(|| QaError::not_found("prompt", prompt_id))?;
            Ok(p.prompts.remove(pos))
        })
    }

    /// Register a data source file. Re-adding a known path refreshes `lastUsed`.
    pub fn add_data_source(&self, project: &str, path: &Path) -> Result<DataSourceRef, QaError> {
        sources::source_for(path)?;
        let kind = sources::extension_of(path).unwrap_or_default();
        let path_str = path.display().to_string();

        self.update(project, |p| {
            if let Some(existing) = p.data_sources.iter_mut().find(|s| s.path == path_str) {
                existing.last_used = Utc::now();
                return Ok(existing.clone());
            }
            let source = DataSourceRef {
                path: path_str.clone(),
                kind,
                last_used: Utc::now(),
            };
            p.data_sources.push(source.clone());
            Ok(source)
        })
    }

    pub fn touch_data_source(&self, project: &str, path: &Path) -> Result<(), QaError> {
        let path_str = path.display().to_string();
        self.update(project, |p| {
            let source = p
                .data_sources
                .iter_mut()
                .find(|s| s.path == path_str)
                .ok_or_else(|| QaError::not_found("data source", path_str.clone()))?;
            source.last_used = Utc::now();
            Ok(())
        })
    }

    /// Remove the project and every test run stored for it.
    /// Returns the number of run files deleted.
    pub fn delete_project(&self, name: &str, results: &ResultStore) -> Result<usize, QaError> {
        let mut projects = self.load_projects()?;
        let before = projects.len();
        projects.retain(|p| p.name != name);
        if projects.len() == before {
            return Err(QaError::not_found("project", name));
        }
        self.save_projects(projects)?;
        let removed = results.delete_all_for_project(name)?;
        tracing::info!(project = name, runs = removed, "Deleted project");
        Ok(removed)
    }
}
