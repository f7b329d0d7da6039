use crate::error::Result;
use crate::models::{ReportRow, ReportTable, ReportTableRow};

/// Turns pivoted rows into the fixed-layout report consumed downstream
pub struct ReportAssembler {
    slot_count: usize,
}

impl ReportAssembler {
    pub fn new(slot_count: usize) -> Self {
        Self { slot_count }
    }

    /// Sort by date (station breaks ties), canonicalise dates, fix column order.
    /// The input rows are left untouched.
    pub fn assemble(&self, rows: &[ReportRow]) -> Result<ReportTable> {
        let mut ordered: Vec<&ReportRow> = rows.iter().collect();
        ordered.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.station.cmp(&b.station)));

        let table_rows = ordered
            .into_iter()
            .map(|row| ReportTableRow::new(&row.station, row.date, row.slots().to_vec()))
            .collect();

        ReportTable::new(self.slot_count, table_rows)
    }
}
