use crate::error::{ProcessingError, Result};
use crate::models::RawTable;
use calamine::{open_workbook_auto, Data, Reader};
use std::path::Path;
use tracing::debug;

/// Loads a lab export saved as a spreadsheet. The first worksheet is read,
/// its first row taken as the header.
pub struct WorkbookReader;

impl WorkbookReader {
    pub fn new() -> Self {
        Self
    }

    pub fn read_table(&self, path: &Path) -> Result<RawTable> {
        let mut workbook = open_workbook_auto(path)?;
        let range = workbook.worksheet_range_at(0).ok_or_else(|| {
            ProcessingError::InvalidFormat(format!("{} has no worksheets", path.display()))
        })??;

        let mut rows = range.rows();
        let Some(header_row) = rows.next() else {
            return Ok(RawTable::new(Vec::new()));
        };
        let headers = header_row
            .iter()
            .map(|cell| cell_text(cell).unwrap_or_default())
            .collect();
        let mut table = RawTable::new(headers);

        for row in rows {
            let row: Vec<Option<String>> = row.iter().map(cell_text).collect();
            if row.iter().all(Option::is_none) {
                continue;
            }
            table.push_row(row)?;
        }

        debug!(
            "Loaded {} rows from the first worksheet of {}",
            table.len(),
            path.display()
        );
        Ok(table)
    }
}

impl Default for WorkbookReader {
    fn default() -> Self {
        Self::new()
    }
}

/// Cell contents as the text a delimited export would carry; error cells count as missing
fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty | Data::Error(_) => None,
        Data::String(s) => (!s.is_empty()).then(|| s.clone()),
        Data::Float(f) => Some(f.to_string()),
        Data::Int(i) => Some(i.to_string()),
        Data::Bool(b) => Some(b.to_string()),
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(|dt| dt.format("%Y-%m-%dT%H:%M:%S").to_string()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Some(s.clone()),
    }
}
