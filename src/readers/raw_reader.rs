use crate::error::{ProcessingError, Result};
use crate::models::RawTable;
use crate::readers::WorkbookReader;
use encoding_rs::{UTF_8, WINDOWS_1252};
use std::borrow::Cow;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Upload kinds, told apart by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadFormat {
    Delimited,
    Workbook,
}

impl UploadFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        match extension.as_deref() {
            Some("csv" | "tsv" | "txt") => Ok(Self::Delimited),
            Some("xlsx" | "xlsm" | "xls") => Ok(Self::Workbook),
            _ => Err(ProcessingError::InvalidFormat(format!(
                "Unsupported file format: {}. Please upload Excel or CSV file",
                path.display()
            ))),
        }
    }
}

/// Loads long-format lab exports from delimited text or spreadsheet files
pub struct RawReader {
    delimiter: u8,
}

impl RawReader {
    pub fn new() -> Self {
        Self { delimiter: b',' }
    }

    pub fn with_delimiter(delimiter: u8) -> Self {
        Self { delimiter }
    }

    /// Read a raw table from a file on disk, dispatching on its extension
    pub fn read_table(&self, path: &Path) -> Result<RawTable> {
        let table = match UploadFormat::from_path(path)? {
            UploadFormat::Delimited => self.read_bytes(&fs::read(path)?)?,
            UploadFormat::Workbook => WorkbookReader::new().read_table(path)?,
        };
        debug!(
            "Loaded {} rows with columns {:?} from {}",
            table.len(),
            table.headers(),
            path.display()
        );
        Ok(table)
    }

    /// Read a raw table from an in-memory export
    pub fn read_bytes(&self, bytes: &[u8]) -> Result<RawTable> {
        let text = decode_export(bytes);

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .flexible(true)
            .from_reader(text.as_bytes());

        let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        let mut table = RawTable::new(headers);

        for record in reader.records() {
            let record = record?;
            // Blank lines carry no fields at all
            if record.iter().all(str::is_empty) && record.len() <= 1 {
                continue;
            }
            let row = record
                .iter()
                .map(|field| (!field.is_empty()).then(|| field.to_string()))
                .collect();
            table.push_row(row)?;
        }

        Ok(table)
    }
}

impl Default for RawReader {
    fn default() -> Self {
        Self::new()
    }
}

/// Lab exports arrive as UTF-8 (with or without BOM) or Windows-1252
fn decode_export(bytes: &[u8]) -> Cow<'_, str> {
    let (text, had_errors) = UTF_8.decode_with_bom_removal(bytes);
    if !had_errors {
        return text;
    }

    debug!("Input is not valid UTF-8, decoding as Windows-1252");
    let (text, _, _) = WINDOWS_1252.decode(bytes);
    text
}
