use crate::error::{ProcessingError, Result};
use crate::models::ReportTable;
use crate::utils::constants::EXPORT_SHEET_NAME;
use rust_xlsxwriter::{ColNum, RowNum, Workbook};
use std::path::Path;
use tracing::debug;

/// Excel export of a report on a single `Data` sheet: the same layout as the
/// CSV export, with slot values as numeric cells and null slots left blank
pub struct XlsxExporter {
    sheet_name: String,
}

impl XlsxExporter {
    pub fn new() -> Self {
        Self {
            sheet_name: EXPORT_SHEET_NAME.to_string(),
        }
    }

    pub fn write_to_path(&self, table: &ReportTable, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        self.workbook(table)?.save(path)?;
        debug!("Exported {} rows to {}", table.len(), path.display());
        Ok(())
    }

    pub fn to_bytes(&self, table: &ReportTable) -> Result<Vec<u8>> {
        Ok(self.workbook(table)?.save_to_buffer()?)
    }

    fn workbook(&self, table: &ReportTable) -> Result<Workbook> {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.set_name(self.sheet_name.as_str())?;

        for (col, name) in table.columns().iter().enumerate() {
            sheet.write_string(0, col_num(col)?, name.as_str())?;
        }

        for (i, row) in table.rows().iter().enumerate() {
            let r = row_num(i + 1)?;
            sheet.write_string(r, 0, row.station())?;
            sheet.write_string(r, 1, row.dates())?;
            for (slot, value) in row.values().iter().enumerate() {
                if let Some(value) = value {
                    sheet.write_number(r, col_num(slot + 2)?, *value)?;
                }
            }
        }

        Ok(workbook)
    }
}

impl Default for XlsxExporter {
    fn default() -> Self {
        Self::new()
    }
}

fn row_num(index: usize) -> Result<RowNum> {
    RowNum::try_from(index)
        .map_err(|_| ProcessingError::InvalidFormat(format!("Row {} exceeds the sheet", index)))
}

fn col_num(index: usize) -> Result<ColNum> {
    ColNum::try_from(index)
        .map_err(|_| ProcessingError::InvalidFormat(format!("Column {} exceeds the sheet", index)))
}
