use crate::error::Result;
use crate::utils::constants::REPORT_DATE_FORMAT;
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};

/// Smallest year accepted from a parse; `%Y` also reads one to three digit years
const MIN_PLAUSIBLE_YEAR: i32 = 1000;

const OFFSET_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f%z", "%Y-%m-%d %H:%M:%S%.f%z"];

// Two-digit-year US forms come before the `%Y` forms
const DATE_TIME_FORMATS: [&str; 16] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%m/%d/%y %H:%M:%S",
    "%m/%d/%y %H:%M",
    "%m/%d/%y %I:%M:%S %p",
    "%m/%d/%y %I:%M %p",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %I:%M %p",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%d-%b-%Y %H:%M:%S",
    "%d-%b-%Y %H:%M",
];

const DATE_FORMATS: [&str; 5] = ["%Y-%m-%d", "%m/%d/%y", "%m/%d/%Y", "%Y/%m/%d", "%d-%b-%Y"];

/// Parse a lab timestamp into its calendar date, discarding the time of day
///
/// # Examples
/// ```
/// use wq_processor::utils::parse_sample_date;
///
/// let date = parse_sample_date("2021-01-05T14:00").unwrap();
/// assert_eq!(date.to_string(), "2021-01-05");
/// ```
pub fn parse_sample_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    // Offsets are dropped: the local calendar date is what the lab recorded
    let with_offset = DateTime::parse_from_rfc3339(trimmed).ok().or_else(|| {
        OFFSET_FORMATS
            .iter()
            .find_map(|format| DateTime::parse_from_str(trimmed, format).ok())
    });
    let mut candidates = with_offset
        .map(|dt| dt.naive_local().date())
        .into_iter()
        .chain(
            DATE_TIME_FORMATS
                .iter()
                .filter_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
                .map(|dt| dt.date()),
        )
        .chain(
            DATE_FORMATS
                .iter()
                .filter_map(|format| NaiveDate::parse_from_str(trimmed, format).ok()),
        );

    // A short year that `%Y` read literally is a misparse, never a lab date
    candidates.find(|date| date.year() >= MIN_PLAUSIBLE_YEAR)
}

/// Render a date in the canonical report form (`YYYY-MM-DD`)
pub fn format_report_date(date: NaiveDate) -> String {
    date.format(REPORT_DATE_FORMAT).to_string()
}

/// Parse a canonical report date back into a calendar date
pub fn parse_report_date(value: &str) -> Result<NaiveDate> {
    Ok(NaiveDate::parse_from_str(value, REPORT_DATE_FORMAT)?)
}
