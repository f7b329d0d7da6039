use crate::error::{ProcessingError, Result};
use crate::models::catalog::slot_column_name;
use crate::utils::constants::{DATES_COLUMN, STATION_COLUMN};
use crate::utils::dates::{format_report_date, parse_report_date};
use chrono::NaiveDate;
use serde::Serialize;

/// One pivoted (station, date) row with a fixed number of parameter slots
#[derive(Debug, Clone, PartialEq)]
pub struct ReportRow {
    pub station: String,
    pub date: NaiveDate,
    slots: Vec<Option<f64>>,
}

impl ReportRow {
    pub fn empty(station: &str, date: NaiveDate, width: usize) -> Self {
        Self {
            station: station.to_string(),
            date,
            slots: vec![None; width],
        }
    }

    pub fn width(&self) -> usize {
        self.slots.len()
    }

    /// Value at a 1-based slot
    pub fn slot(&self, slot: usize) -> Option<f64> {
        slot.checked_sub(1)
            .and_then(|i| self.slots.get(i))
            .copied()
            .flatten()
    }

    pub fn slots(&self) -> &[Option<f64>] {
        &self.slots
    }

    pub(crate) fn set_slot(&mut self, slot: usize, value: Option<f64>) {
        if let Some(cell) = slot.checked_sub(1).and_then(|i| self.slots.get_mut(i)) {
            *cell = value;
        }
    }

    pub fn is_blank(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }
}

/// Row of an assembled report: station, canonical date text, slot values
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportTableRow {
    station: String,
    dates: String,
    values: Vec<Option<f64>>,
}

impl ReportTableRow {
    pub fn new(station: &str, date: NaiveDate, values: Vec<Option<f64>>) -> Self {
        Self {
            station: station.to_string(),
            dates: format_report_date(date),
            values,
        }
    }

    pub fn station(&self) -> &str {
        &self.station
    }

    /// Canonical `YYYY-MM-DD` date
    pub fn dates(&self) -> &str {
        &self.dates
    }

    pub fn date(&self) -> Result<NaiveDate> {
        parse_report_date(&self.dates)
    }

    pub fn values(&self) -> &[Option<f64>] {
        &self.values
    }

    pub fn value(&self, slot: usize) -> Option<f64> {
        slot.checked_sub(1)
            .and_then(|i| self.values.get(i))
            .copied()
            .flatten()
    }
}

/// Read-only wide table with the fixed `Station, Dates, Data 1..Data N` layout
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportTable {
    columns: Vec<String>,
    rows: Vec<ReportTableRow>,
}

impl ReportTable {
    pub fn new(slot_count: usize, rows: Vec<ReportTableRow>) -> Result<Self> {
        if let Some(bad) = rows.iter().find(|r| r.values.len() != slot_count) {
            return Err(ProcessingError::InvalidFormat(format!(
                "Row for {} on {} has {} slots, expected {}",
                bad.station,
                bad.dates,
                bad.values.len(),
                slot_count
            )));
        }

        let mut columns = vec![STATION_COLUMN.to_string(), DATES_COLUMN.to_string()];
        columns.extend((1..=slot_count).map(slot_column_name));

        Ok(Self { columns, rows })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[ReportTableRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn slot_count(&self) -> usize {
        self.columns.len() - 2
    }

    /// Slot columns (`Data 1..Data N`), the numeric part of the table
    pub fn numeric_columns(&self) -> &[String] {
        &self.columns[2..]
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    /// 1-based slot behind a `Data i` column name
    pub fn slot_for_column(&self, name: &str) -> Option<usize> {
        self.numeric_columns()
            .iter()
            .position(|c| c == name)
            .map(|i| i + 1)
    }

    pub fn column_values(&self, name: &str) -> Option<Vec<Option<f64>>> {
        let slot = self.slot_for_column(name)?;
        Some(self.rows.iter().map(|r| r.value(slot)).collect())
    }

    pub fn dates(&self) -> Vec<&str> {
        self.rows.iter().map(|r| r.dates()).collect()
    }

    /// Rows dated within `[start, end]`, order preserved
    pub fn filter_by_date_range(&self, start: NaiveDate, end: NaiveDate) -> Result<ReportTable> {
        let mut rows = Vec::new();
        for row in &self.rows {
            let date = row.date()?;
            if date >= start && date <= end {
                rows.push(row.clone());
            }
        }
        ReportTable::new(self.slot_count(), rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_report_row_slots() {
        let mut row = ReportRow::empty("CT", ymd(2021, 1, 5), 3);
        assert!(row.is_blank());

        row.set_slot(2, Some(5.0));
        row.set_slot(9, Some(1.0));
        assert_eq!(row.slot(2), Some(5.0));
        assert_eq!(row.slot(1), None);
        assert_eq!(row.slot(0), None);
        assert_eq!(row.width(), 3);
        assert!(!row.is_blank());
    }

    #[test]
    fn test_table_layout() {
        let table = ReportTable::new(
            2,
            vec![ReportTableRow::new("CT", ymd(2021, 1, 5), vec![Some(1.0), None])],
        )
        .unwrap();

        assert_eq!(table.columns(), &["Station", "Dates", "Data 1", "Data 2"]);
        assert_eq!(table.numeric_columns(), &["Data 1", "Data 2"]);
        assert_eq!(table.slot_for_column("Data 2"), Some(2));
        assert_eq!(table.column_values("Data 1"), Some(vec![Some(1.0)]));
        assert_eq!(table.column_values("Dates"), None);
        assert_eq!(table.dates(), vec!["2021-01-05"]);
    }

    #[test]
    fn test_mismatched_width_rejected() {
        let rows = vec![ReportTableRow::new("CT", ymd(2021, 1, 5), vec![Some(1.0)])];
        assert!(ReportTable::new(2, rows).is_err());
    }

    #[test]
    fn test_filter_by_date_range_is_inclusive() {
        let rows = (1..=5)
            .map(|d| ReportTableRow::new("CT", ymd(2021, 1, d), vec![Some(d as f64)]))
            .collect();
        let table = ReportTable::new(1, rows).unwrap();

        let filtered = table
            .filter_by_date_range(ymd(2021, 1, 2), ymd(2021, 1, 4))
            .unwrap();
        assert_eq!(filtered.dates(), vec!["2021-01-02", "2021-01-03", "2021-01-04"]);
    }
}
