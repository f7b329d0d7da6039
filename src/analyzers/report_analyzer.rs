use crate::error::{ProcessingError, Result};
use crate::models::{ParameterCatalog, ReportTable};
use chrono::NaiveDate;
use serde::Serialize;

/// Headline metrics of a stored report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportSummary {
    pub total_records: usize,
    pub date_range: Option<(NaiveDate, NaiveDate)>,
    pub parameter_count: usize,
    /// Slots holding at least one value
    pub populated_parameters: usize,
}

impl ReportSummary {
    pub fn detailed_summary(&self) -> String {
        let range = match self.date_range {
            Some((start, end)) => format!("{} to {}", start, end),
            None => "n/a".to_string(),
        };
        format!(
            "Report Summary:\n\
            - Total Records: {}\n\
            - Date Range: {}\n\
            - Parameters: {} ({} with data)",
            self.total_records, range, self.parameter_count, self.populated_parameters
        )
    }
}

/// Descriptive statistics of one `Data i` column; empty cells are not counted
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnStatistics {
    pub column: String,
    pub parameter: Option<String>,
    pub count: usize,
    pub mean: Option<f64>,
    /// Sample standard deviation
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub q25: Option<f64>,
    pub median: Option<f64>,
    pub q75: Option<f64>,
    pub max: Option<f64>,
}

impl ColumnStatistics {
    fn from_values(column: &str, parameter: Option<String>, values: &[f64]) -> Self {
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);

        let count = sorted.len();
        let mean = (count > 0).then(|| sorted.iter().sum::<f64>() / count as f64);
        let std = mean.filter(|_| count > 1).map(|mean| {
            let squares: f64 = sorted.iter().map(|v| (v - mean).powi(2)).sum();
            (squares / (count - 1) as f64).sqrt()
        });

        Self {
            column: column.to_string(),
            parameter,
            count,
            mean,
            std,
            min: sorted.first().copied(),
            q25: quantile(&sorted, 0.25),
            median: quantile(&sorted, 0.5),
            q75: quantile(&sorted, 0.75),
            max: sorted.last().copied(),
        }
    }

    pub fn summary_line(&self) -> String {
        let fmt = |v: Option<f64>| v.map_or_else(|| "-".to_string(), |v| format!("{:.3}", v));
        let label = match &self.parameter {
            Some(parameter) => format!("{} ({})", self.column, parameter),
            None => self.column.clone(),
        };
        format!(
            "{:<22} count={:<5} mean={:<10} std={:<10} min={:<10} 25%={:<10} 50%={:<10} 75%={:<10} max={}",
            label,
            self.count,
            fmt(self.mean),
            fmt(self.std),
            fmt(self.min),
            fmt(self.q25),
            fmt(self.median),
            fmt(self.q75),
            fmt(self.max)
        )
    }
}

/// Linear interpolation between closest ranks over sorted values
fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let position = q * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let weight = position - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * weight)
}

pub struct ReportAnalyzer<'a> {
    catalog: Option<&'a ParameterCatalog>,
}

impl<'a> ReportAnalyzer<'a> {
    pub fn new() -> Self {
        Self { catalog: None }
    }

    /// Label `Data i` columns with the parameter code they hold
    pub fn with_catalog(mut self, catalog: &'a ParameterCatalog) -> Self {
        self.catalog = Some(catalog);
        self
    }

    pub fn summarize(&self, table: &ReportTable) -> Result<ReportSummary> {
        let date_range = match (table.rows().first(), table.rows().last()) {
            (Some(first), Some(last)) => Some((first.date()?, last.date()?)),
            _ => None,
        };
        let populated_parameters = (1..=table.slot_count())
            .filter(|&slot| table.rows().iter().any(|r| r.value(slot).is_some()))
            .count();

        Ok(ReportSummary {
            total_records: table.len(),
            date_range,
            parameter_count: table.slot_count(),
            populated_parameters,
        })
    }

    /// Statistics for the given columns, or every `Data i` column when none are named
    pub fn describe(&self, table: &ReportTable, columns: &[String]) -> Result<Vec<ColumnStatistics>> {
        let selected = if columns.is_empty() {
            table.numeric_columns()
        } else {
            columns
        };

        selected
            .iter()
            .map(|column| {
                let slot = table.slot_for_column(column).ok_or_else(|| {
                    ProcessingError::InvalidFormat(format!("'{}' is not a numeric column", column))
                })?;
                let values: Vec<f64> = table.rows().iter().filter_map(|r| r.value(slot)).collect();
                let parameter = self
                    .catalog
                    .and_then(|c| c.code_at(slot))
                    .map(str::to_string);
                Ok(ColumnStatistics::from_values(column, parameter, &values))
            })
            .collect()
    }
}

impl Default for ReportAnalyzer<'_> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ReportTableRow;

    fn table() -> ReportTable {
        let rows = [Some(1.0), Some(2.0), None, Some(3.0), Some(4.0)]
            .into_iter()
            .enumerate()
            .map(|(i, v)| {
                let date = NaiveDate::from_ymd_opt(2021, 1, i as u32 + 1).unwrap();
                ReportTableRow::new("CT", date, vec![v, None])
            })
            .collect();
        ReportTable::new(2, rows).unwrap()
    }

    #[test]
    fn test_summary() {
        let summary = ReportAnalyzer::new().summarize(&table()).unwrap();

        assert_eq!(summary.total_records, 5);
        assert_eq!(
            summary.date_range,
            Some((
                NaiveDate::from_ymd_opt(2021, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(2021, 1, 5).unwrap()
            ))
        );
        assert_eq!(summary.parameter_count, 2);
        assert_eq!(summary.populated_parameters, 1);
        assert!(summary.detailed_summary().contains("2021-01-01 to 2021-01-05"));
    }

    #[test]
    fn test_describe_skips_empty_cells() {
        let stats = ReportAnalyzer::new()
            .describe(&table(), &["Data 1".to_string()])
            .unwrap();
        let s = &stats[0];

        assert_eq!(s.count, 4);
        assert_eq!(s.mean, Some(2.5));
        assert!((s.std.unwrap() - 1.290_994_448_735_805_6).abs() < 1e-12);
        assert_eq!(s.min, Some(1.0));
        assert_eq!(s.q25, Some(1.75));
        assert_eq!(s.median, Some(2.5));
        assert_eq!(s.q75, Some(3.25));
        assert_eq!(s.max, Some(4.0));
    }

    #[test]
    fn test_describe_all_columns_with_catalog() {
        let catalog = ParameterCatalog::new("CT", ["FLOW, IN", "BOD, IN"]).unwrap();
        let stats = ReportAnalyzer::new()
            .with_catalog(&catalog)
            .describe(&table(), &[])
            .unwrap();

        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].parameter.as_deref(), Some("FLOW, IN"));
        assert_eq!(stats[1].count, 0);
        assert_eq!(stats[1].mean, None);
        assert!(stats[1].summary_line().contains("BOD, IN"));
    }

    #[test]
    fn test_describe_rejects_non_numeric_column() {
        assert!(ReportAnalyzer::new()
            .describe(&table(), &["Dates".to_string()])
            .is_err());
    }

    #[test]
    fn test_single_value_has_no_std() {
        let s = ColumnStatistics::from_values("Data 1", None, &[7.0]);
        assert_eq!(s.std, None);
        assert_eq!(s.q25, Some(7.0));
    }
}
