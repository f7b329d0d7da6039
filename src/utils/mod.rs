pub mod constants;
pub mod dates;
pub mod filename;
pub mod progress;

pub use constants::*;
pub use dates::{format_report_date, parse_report_date, parse_sample_date};
pub use filename::{generate_default_export_filename, table_file_path, table_id_for_station};
pub use progress::{ProgressAwareWriter, ProgressReporter};
