//! Spreadsheet export of any table the dashboard shows.

pub mod clean;
pub mod tabular;
pub mod xlsx;

pub use clean::strip_illegal_chars;
pub use tabular::{Cell, TabularRecord};
pub use xlsx::{export_file_name, sheet_name, write_xlsx, ExportError, XLSX_CONTENT_TYPE};
