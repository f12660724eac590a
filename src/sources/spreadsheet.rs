// src/sources/spreadsheet.rs - Spreadsheet context files (xlsx, xlsm, xls, ods)
//
// Reads column A of the first sheet. Row 1 is a header and is skipped;
// every following cell becomes one context in its display form. Positions
// are absolute sheet coordinates, so a sheet whose used area starts at B3
// still reads column A from row 2.

use std::path::Path;

use calamine::{open_workbook_auto, Data, Range, Reader};

use super::ContextSource;
use crate::infra::errors::QaError;

pub struct SpreadsheetSource;

impl ContextSource for SpreadsheetSource {
    fn name(&self) -> &'static str {
        "Spreadsheet"
    }

    fn parse(&self, path: &Path) -> Result<Vec<String>, QaError> {
        if !path.exists() {
            return Err(QaError::not_found("file", path.display().to_string()));
        }

        let mut workbook = open_workbook_auto(path)
            .map_err(|e| QaError::Format(format!("cannot open spreadsheet: {}", e)))?;

        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| QaError::Format("spreadsheet has no worksheets".into()))?
            .map_err(|e| QaError::Format(format!("cannot read first worksheet: {}", e)))?;

        first_column(&range)
    }
}

/// Column A of every sheet row after the header, up to the last used row.
fn first_column(range: &Range<Data>) -> Result<Vec<String>, QaError> {
    let Some((last_row, _)) = range.end() else {
        return Err(QaError::Format("spreadsheet has no data rows".into()));
    };

    let contexts: Vec<String> = (1..=last_row)
        .map(|row| range.get_value((row, 0)).map(cell_text).unwrap_or_default())
        .collect();

    if contexts.is_empty() {
        return Err(QaError::Format("spreadsheet has no data rows".into()));
    }
    Ok(contexts)
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        other => other.to_string(),
    }
}
