// src/sources/mod.rs - Context sources: files that expand into a list of contexts
//
// A source is chosen by file extension from a static registry. Adding a
// format means writing a `ContextSource` and adding a row to `REGISTRY`.

pub mod json;
pub mod spreadsheet;

use std::path::Path;

use crate::infra::errors::QaError;

/// Turns an input file into an ordered list of context strings.
pub trait ContextSource: Sync {
    /// Human-readable format name.
    fn name(&self) -> &'static str;

    /// Parse `path`. `NotFound` if the file is missing, `Format` if the
    /// content is not shaped as expected.
    fn parse(&self, path: &Path) -> Result<Vec<String>, QaError>;
}

static JSON: json::JsonSource = json::JsonSource;
static SPREADSHEET: spreadsheet::SpreadsheetSource = spreadsheet::SpreadsheetSource;

/// Lowercase extension (without the dot) to parser.
static REGISTRY: &[(&str, &dyn ContextSource)] = &[
    ("json", &JSON),
    ("xlsx", &SPREADSHEET),
    ("xlsm", &SPREADSHEET),
    ("xls", &SPREADSHEET),
    ("ods", &SPREADSHEET),
];

/// Lowercase extension of `path`, without the dot.
pub fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

pub fn supported_extensions() -> impl Iterator<Item = &'static str> {
    REGISTRY.iter().map(|(ext, _)| *ext)
}

/// Registered parser for `path`'s extension.
pub fn source_for(path: &Path) -> Result<&'static dyn ContextSource, QaError> {
    let ext = extension_of(path).unwrap_or_default();
    REGISTRY
        .iter()
        .find(|(e, _)| *e == ext)
        .map(|(_, source)| *source)
        .ok_or_else(|| {
            if ext.is_empty() {
                QaError::UnsupportedType(format!("{} has no file extension", path.display()))
            } else {
                QaError::UnsupportedType(format!(".{ext}"))
            }
        })
}

/// Load contexts from `path` with the parser registered for its extension.
pub fn load_contexts(path: &Path) -> Result<Vec<String>, QaError> {
    let source = source_for(path)?;
    if !path.exists() {
        return Err(QaError::not_found("data source", path.display().to_string()));
    }
    let contexts = source.parse(path)?;
    tracing::debug!(
        source = source.name(),
        count = contexts.len(),
        "Loaded contexts from {}",
        path.display()
    );
    Ok(contexts)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_lookup_is_case_insensitive() {
        assert_eq!(source_for(Path::new("a.JSON")).unwrap().name(), "JSON");
        assert_eq!(
            source_for(Path::new("sheet.Xlsx")).unwrap().name(),
            "Spreadsheet"
        );
        assert_eq!(source_for(Path::new("old.xls")).unwrap().name(), "Spreadsheet");
    }

    #[test]
    fn test_unknown_extension() {
        let err = source_for(Path::new("notes.txt")).err().unwrap();
        assert!(matches!(err, QaError::UnsupportedType(ref s) if s == ".txt"));

        let err = source_for(Path::new("Makefile")).err().unwrap();
        assert!(matches!(err, QaError::UnsupportedType(_)));
    }

    #[test]
    fn test_unsupported_checked_before_existence() {
        let err = load_contexts(Path::new("/definitely/missing.csv")).unwrap_err();
        assert!(matches!(err, QaError::UnsupportedType(_)));
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let err = load_contexts(Path::new("/definitely/missing.json")).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_supported_extensions_listed() {
        let exts: Vec<_> = supported_extensions().collect();
        assert!(exts.contains(&"json"));
        assert!(exts.contains(&"xlsx"));
    }
}
