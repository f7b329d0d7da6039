use crate::error::{ProcessingError, Result};
use crate::models::ReportTable;
use crate::utils::constants::{DATES_COLUMN, DEFAULT_X_AXIS_TITLE, DEFAULT_Y_AXIS_TITLE};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Line,
    Scatter,
    Bar,
    Area,
}

impl ChartKind {
    pub const ALL: [ChartKind; 4] = [
        ChartKind::Line,
        ChartKind::Scatter,
        ChartKind::Bar,
        ChartKind::Area,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ChartKind::Line => "Line Chart",
            ChartKind::Scatter => "Scatter Plot",
            ChartKind::Bar => "Bar Chart",
            ChartKind::Area => "Area Chart",
        }
    }

    /// Scatter and bar charts plot only the first selected column
    pub fn supports_multiple_series(&self) -> bool {
        matches!(self, ChartKind::Line | ChartKind::Area)
    }

    fn mode(&self) -> SeriesMode {
        match self {
            ChartKind::Line => SeriesMode::LinesMarkers,
            ChartKind::Scatter => SeriesMode::Markers,
            ChartKind::Bar => SeriesMode::Bars,
            ChartKind::Area => SeriesMode::Lines,
        }
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Accepts the display labels as well as the short names (`line`, `scatter`, `bar`, `area`)
impl FromStr for ChartKind {
    type Err = ProcessingError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim();
        ChartKind::ALL
            .into_iter()
            .find(|kind| {
                kind.label().eq_ignore_ascii_case(wanted)
                    || kind.label()
                        .split_whitespace()
                        .next()
                        .is_some_and(|short| short.eq_ignore_ascii_case(wanted))
            })
            .ok_or_else(|| ProcessingError::UnsupportedChart(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesMode {
    LinesMarkers,
    Markers,
    Lines,
    Bars,
}

/// Area fill, named the way plotting front ends expect it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Fill {
    #[serde(rename = "tozeroy")]
    ToZeroY,
    #[serde(rename = "tonexty")]
    ToNextY,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub name: String,
    pub mode: SeriesMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill: Option<Fill>,
    pub y: Vec<Option<f64>>,
}

/// Renderer-neutral description of a chart
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartData {
    pub kind: ChartKind,
    pub title: String,
    pub x_axis_title: String,
    pub y_axis_title: String,
    pub x: Vec<String>,
    pub series: Vec<Series>,
}

impl ChartData {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

pub struct ChartBuilder {
    kind: ChartKind,
    title: String,
    x_axis_title: String,
    y_axis_title: String,
}

impl ChartBuilder {
    pub fn new(kind: ChartKind) -> Self {
        Self {
            kind,
            title: String::new(),
            x_axis_title: DEFAULT_X_AXIS_TITLE.to_string(),
            y_axis_title: DEFAULT_Y_AXIS_TITLE.to_string(),
        }
    }

    pub fn with_title(mut self, title: &str) -> Self {
        self.title = title.to_string();
        self
    }

    pub fn with_axis_titles(mut self, x: &str, y: &str) -> Self {
        self.x_axis_title = x.to_string();
        self.y_axis_title = y.to_string();
        self
    }

    pub fn build(&self, table: &ReportTable, columns: &[String]) -> Result<ChartData> {
        self.validate(table, columns)?;

        let plotted = if self.kind.supports_multiple_series() {
            columns
        } else {
            &columns[..1]
        };

        let series = plotted
            .iter()
            .enumerate()
            .map(|(i, column)| {
                let fill = (self.kind == ChartKind::Area).then_some(if i == 0 {
                    Fill::ToZeroY
                } else {
                    Fill::ToNextY
                });
                Ok(Series {
                    name: column.clone(),
                    mode: self.kind.mode(),
                    fill,
                    y: table.column_values(column).ok_or_else(|| {
                        ProcessingError::InvalidFormat(format!("Missing columns: [{}]", column))
                    })?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(ChartData {
            kind: self.kind,
            title: self.title.clone(),
            x_axis_title: self.x_axis_title.clone(),
            y_axis_title: self.y_axis_title.clone(),
            x: table.dates().into_iter().map(str::to_string).collect(),
            series,
        })
    }

    fn validate(&self, table: &ReportTable, columns: &[String]) -> Result<()> {
        if table.is_empty() {
            return Err(ProcessingError::InvalidFormat(
                "No data to chart".to_string(),
            ));
        }
        if columns.is_empty() {
            return Err(ProcessingError::InvalidFormat(
                "Select at least one column to chart".to_string(),
            ));
        }

        let missing: Vec<&str> = columns
            .iter()
            .filter(|c| table.slot_for_column(c).is_none())
            .map(String::as_str)
            .collect();
        if !missing.is_empty() {
            return Err(ProcessingError::InvalidFormat(format!(
                "Missing columns: {:?}",
                missing
            )));
        }

        if !table.has_column(DATES_COLUMN) {
            return Err(ProcessingError::InvalidFormat(format!(
                "Chart data must have a '{}' column",
                DATES_COLUMN
            )));
        }
        Ok(())
    }
}
