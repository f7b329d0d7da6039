use crate::error::{ProcessingError, Result};

/// Long-format input table exactly as loaded: header names plus nullable cells
///
/// Every row remembers its position in the originally loaded table so that
/// diagnostics can point back at the uploaded data after filtering.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawTable {
    headers: Vec<String>,
    rows: Vec<Vec<Option<String>>>,
    origins: Vec<usize>,
}

impl RawTable {
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
            origins: Vec::new(),
        }
    }

    /// Build a table from string cells; empty cells become nulls
    pub fn from_str_rows(headers: &[&str], rows: &[&[&str]]) -> Result<Self> {
        let mut table = Self::new(headers.iter().map(|h| h.to_string()).collect());
        for row in rows {
            table.push_row(
                row.iter()
                    .map(|cell| (!cell.is_empty()).then(|| cell.to_string()))
                    .collect(),
            )?;
        }
        Ok(table)
    }

    /// Append a row; short rows are padded with nulls, long rows are rejected
    pub fn push_row(&mut self, mut row: Vec<Option<String>>) -> Result<()> {
        if row.len() > self.headers.len() {
            return Err(ProcessingError::InvalidFormat(format!(
                "Row {} has {} fields but the header declares {}",
                self.rows.len() + 1,
                row.len(),
                self.headers.len()
            )));
        }
        row.resize(self.headers.len(), None);
        let origin = self.origins.last().map_or(self.rows.len(), |last| last + 1);
        self.rows.push(row);
        self.origins.push(origin);
        Ok(())
    }

    pub(crate) fn from_parts(
        headers: Vec<String>,
        rows: Vec<Vec<Option<String>>>,
        origins: Vec<usize>,
    ) -> Self {
        debug_assert_eq!(rows.len(), origins.len());
        Self {
            headers,
            rows,
            origins,
        }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<Option<String>>] {
        &self.rows
    }

    pub fn origins(&self) -> &[usize] {
        &self.origins
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn value(&self, row: usize, column: usize) -> Option<&str> {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .and_then(|cell| cell.as_deref())
    }

    /// Non-null values of a column in order of first appearance
    pub fn distinct_values(&self, column: &str) -> Vec<String> {
        let Some(index) = self.column_index(column) else {
            return Vec::new();
        };

        let mut seen = std::collections::HashSet::new();
        self.rows
            .iter()
            .filter_map(|row| row[index].as_deref())
            .filter(|value| seen.insert(value.to_string()))
            .map(str::to_string)
            .collect()
    }

    /// Rows whose `column` equals `value` exactly; a missing column yields an empty table
    pub fn filter_by_value(&self, column: &str, value: &str) -> RawTable {
        let Some(index) = self.column_index(column) else {
            return RawTable::new(self.headers.clone());
        };

        let (rows, origins): (Vec<_>, Vec<_>) = self
            .rows
            .iter()
            .zip(&self.origins)
            .filter(|(row, _)| row[index].as_deref() == Some(value))
            .map(|(row, origin)| (row.clone(), *origin))
            .unzip();

        RawTable::from_parts(self.headers.clone(), rows, origins)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> RawTable {
        RawTable::from_str_rows(
            &["Station_ID", "PCode", "Result"],
            &[
                &["CT", "FLOW, IN", "10"],
                &["TUS", "BOD, IN", ""],
                &["CT", "BOD, IN", "4"],
                &["XYZ", "", ""],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_empty_cells_become_nulls() {
        let table = sample();
        assert_eq!(table.value(1, 2), None);
        assert_eq!(table.value(0, 2), Some("10"));
    }

    #[test]
    fn test_short_rows_padded_long_rows_rejected() {
        let mut table = RawTable::new(vec!["A".to_string(), "B".to_string()]);
        table.push_row(vec![Some("1".to_string())]).unwrap();
        assert_eq!(table.rows()[0], vec![Some("1".to_string()), None]);

        let err = table.push_row(vec![None, None, None]);
        assert!(err.is_err());
    }

    #[test]
    fn test_distinct_values_keep_first_appearance_order() {
        assert_eq!(sample().distinct_values("Station_ID"), vec!["CT", "TUS", "XYZ"]);
        assert!(sample().distinct_values("Missing").is_empty());
    }

    #[test]
    fn test_filter_keeps_origins() {
        let filtered = sample().filter_by_value("Station_ID", "CT");
        assert_eq!(filtered.len(), 2);
        assert_eq!(filtered.origins(), &[0, 2]);
        assert!(sample().filter_by_value("Nope", "CT").is_empty());
    }
}
