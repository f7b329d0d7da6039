use crate::error::Result;
use crate::models::ReportTable;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::debug;

/// Delimited-text export of a report: header row, then one line per row,
/// null slots as empty fields
pub struct CsvExporter {
    delimiter: u8,
}

impl CsvExporter {
    pub fn new() -> Self {
        Self { delimiter: b',' }
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn write<W: Write>(&self, table: &ReportTable, writer: W) -> Result<()> {
        let mut csv_writer = csv::WriterBuilder::new()
            .delimiter(self.delimiter)
            .from_writer(writer);

        csv_writer.write_record(table.columns())?;
        for row in table.rows() {
            let mut record = Vec::with_capacity(row.values().len() + 2);
            record.push(row.station().to_string());
            record.push(row.dates().to_string());
            record.extend(
                row.values()
                    .iter()
                    .map(|v| v.map(|v| v.to_string()).unwrap_or_default()),
            );
            csv_writer.write_record(&record)?;
        }

        csv_writer.flush()?;
        Ok(())
    }

    pub fn write_to_path(&self, table: &ReportTable, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        self.write(table, BufWriter::new(File::create(path)?))?;
        debug!("Exported {} rows to {}", table.len(), path.display());
        Ok(())
    }

    pub fn to_bytes(&self, table: &ReportTable) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        self.write(table, &mut buffer)?;
        Ok(buffer)
    }
}

impl Default for CsvExporter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ReportTableRow;
    use crate::readers::RawReader;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn table() -> ReportTable {
        let date = NaiveDate::from_ymd_opt(2021, 1, 5).unwrap();
        ReportTable::new(
            3,
            vec![
                ReportTableRow::new("CT", date, vec![Some(12.0), Some(5.5), None]),
                ReportTableRow::new("CT", date.succ_opt().unwrap(), vec![None, None, Some(0.125)]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_export_layout() {
        let bytes = CsvExporter::new().to_bytes(&table()).unwrap();
        let text = String::from_utf8(bytes).unwrap();

        assert_eq!(
            text,
            "Station,Dates,Data 1,Data 2,Data 3\n\
             CT,2021-01-05,12,5.5,\n\
             CT,2021-01-06,,,0.125\n"
        );
    }

    #[test]
    fn test_export_reads_back_losslessly() {
        let bytes = CsvExporter::new().to_bytes(&table()).unwrap();
        let raw = RawReader::new().read_bytes(&bytes).unwrap();

        assert_eq!(raw.headers(), table().columns());
        assert_eq!(raw.len(), 2);
        assert_eq!(raw.value(0, 2), Some("12"));
        assert_eq!(raw.value(0, 4), None);
        assert_eq!(raw.value(1, 4), Some("0.125"));
    }

    #[test]
    fn test_write_to_path() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("exports/CT_filtered_data_2021-01-01_2021-12-31.csv");

        CsvExporter::new().with_delimiter(b';').write_to_path(&table(), &path)?;

        let text = std::fs::read_to_string(&path)?;
        assert!(text.starts_with("Station;Dates;Data 1;Data 2;Data 3\n"));
        Ok(())
    }
}
