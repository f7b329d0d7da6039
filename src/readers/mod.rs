pub mod raw_reader;
pub mod workbook_reader;

pub use raw_reader::{RawReader, UploadFormat};
pub use workbook_reader::WorkbookReader;
