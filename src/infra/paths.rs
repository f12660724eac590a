// src/infra/paths.rs - Config and data directory resolution
//
// All paths respect the PROMPTQA_HOME environment variable for isolation.
// When PROMPTQA_HOME is set, config lives in that directory and data under
// its `data/` child. When unset, config uses ~/.promptqa/ and data uses the
// platform data directory (XDG_DATA_HOME/promptqa on Linux).

use directories::{BaseDirs, ProjectDirs};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

static PROJECT_DIRS: OnceLock<Option<ProjectDirs>> = OnceLock::new();

fn project_dirs() -> Option<&'static ProjectDirs> {
    PROJECT_DIRS
        .get_or_init(|| ProjectDirs::from("", "", "promptqa"))
        .as_ref()
}

/// Returns the PROMPTQA_HOME override, if set.
fn promptqa_home() -> Option<PathBuf> {
    std::env::var_os("PROMPTQA_HOME").map(PathBuf::from)
}

/// Configuration directory: $PROMPTQA_HOME/ or ~/.promptqa/
pub fn config_dir() -> PathBuf {
    if let Some(home) = promptqa_home() {
        return home;
    }
    match BaseDirs::new() {
        Some(base) => base.home_dir().join(".promptqa"),
        None => PathBuf::from(".promptqa"),
    }
}

/// Default data directory: $PROMPTQA_HOME/data/ or the platform data dir.
pub fn data_dir() -> PathBuf {
    if let Some(home) = promptqa_home() {
        return home.join("data");
    }
    match project_dirs() {
        Some(dirs) => dirs.data_local_dir().to_path_buf(),
        None => PathBuf::from("data"),
    }
}

/// Config file path
pub fn config_file_path() -> PathBuf {
    config_dir().join("config.toml")
}

/// One directory per project, one JSON document per run.
pub fn results_dir(data_dir: &Path) -> PathBuf {
    data_dir.join("results")
}

pub fn projects_file(data_dir: &Path) -> PathBuf {
    data_dir.join("projects.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_under_data_dir() {
        let data = Path::new("/srv/qa");
        assert_eq!(results_dir(data), PathBuf::from("/srv/qa/results"));
        assert_eq!(projects_file(data), PathBuf::from("/srv/qa/projects.json"));
    }

    #[test]
    fn test_config_file_is_toml() {
        assert!(config_file_path().ends_with("config.toml"));
    }
}
