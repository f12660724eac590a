// src/store/mod.rs - JSON document persistence

pub mod projects;
pub mod results;
pub mod stats;

use serde::Serialize;
use std::io::Write;
use std::path::Path;

use crate::infra::errors::QaError;

pub use projects::ProjectRegistry;
pub use results::{ResultStore, RunSummary};
pub use stats::{ChannelStats, RunStats};

/// Names used as single path components (project names, run ids).
pub(crate) fn check_component(what: &'static str, name: &str) -> Result<(), QaError> {
    let bad = name.trim().is_empty()
        || name == "."
        || name == ".."
        || name.contains(['/', '\\', '\0']);
    if bad {
        return Err(QaError::Format(format!("invalid {what} name '{name}'")));
    }
    Ok(())
}

/// Write `value` as pretty JSON to `path` via a sibling temp file + rename,
/// so readers only ever see a complete previous or complete new document.
pub(crate) fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<(), QaError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| QaError::Format(format!("cannot serialize {}: {}", path.display(), e)))?;

    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(dir).map_err(|e| QaError::storage(dir, e))?;

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let tmp = dir.join(format!(".{file_name}.tmp"));

    let write = || -> std::io::Result<()> {
        let mut f = std::fs::File::create(&tmp)?;
        f.write_all(json.as_bytes())?;
        f.flush()?;
        f.sync_all()?;
        std::fs::rename(&tmp, path)
    };
    write().map_err(|e| {
        let _ = std::fs::remove_file(&tmp);
        QaError::storage(path, e)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_component() {
        assert!(check_component("project", "addresses").is_ok());
        assert!(check_component("project", "Q3 eval (v2)").is_ok());
        for bad in ["", "  ", ".", "..", "a/b", "a\\b", "../x"] {
            assert!(check_component("project", bad).is_err(), "{bad:?} accepted");
        }
    }

    #[test]
    fn test_atomic_write_replaces_and_leaves_no_temp() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("nested").join("doc.json");

        write_json_atomic(&path, &serde_json::json!({"v": 1})).unwrap();
        write_json_atomic(&path, &serde_json::json!({"v": 2})).unwrap();

        let v: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(v["v"], 2);

        let names: Vec<_> = std::fs::read_dir(path.parent().unwrap())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names.len(), 1);
    }
}
