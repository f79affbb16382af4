//! `.xlsx` serialization of displayed tables.

use chrono::NaiveDate;
use rust_xlsxwriter::{Format, Workbook, XlsxError};
use thiserror::Error;

use crate::clean::strip_illegal_chars;
use crate::tabular::{Cell, TabularRecord};

pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

const DEFAULT_SHEET_NAME: &str = "Export";
const MAX_SHEET_NAME_CHARS: usize = 31;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("xlsx writer error: {0}")]
    Xlsx(#[from] XlsxError),

    #[error("table has too many rows for one worksheet: {0}")]
    TooManyRows(usize),
}

/// A worksheet name Excel accepts: no `[]:*?/\`, at most 31 characters,
/// never blank.
#[must_use]
pub fn sheet_name(raw: &str) -> String {
    let cleaned: String = strip_illegal_chars(raw)
        .chars()
        .filter(|c| !matches!(c, '[' | ']' | ':' | '*' | '?' | '/' | '\\'))
        .take(MAX_SHEET_NAME_CHARS)
        .collect();
    let trimmed = cleaned.trim().trim_matches('\'');
    if trimmed.is_empty() {
        DEFAULT_SHEET_NAME.to_owned()
    } else {
        trimmed.to_owned()
    }
}

/// Export file name: `{prefix}_{subject}_{YYYY-MM-DD}.xlsx`, or
/// `{prefix}_{YYYY-MM-DD}.xlsx` without a subject. Path separators in the
/// subject become `-`.
#[must_use]
pub fn export_file_name(prefix: &str, subject: Option<&str>, date: NaiveDate) -> String {
    let date = date.format("%Y-%m-%d");
    match subject.map(str::trim).filter(|s| !s.is_empty()) {
        Some(subject) => {
            let subject: String = strip_illegal_chars(subject)
                .chars()
                .map(|c| if matches!(c, '/' | '\\') { '-' } else { c })
                .collect();
            format!("{prefix}_{subject}_{date}.xlsx")
        }
        None => format!("{prefix}_{date}.xlsx"),
    }
}

/// Writes `rows` to a one-sheet workbook: a bold header row then one row per
/// record. Text cells are stripped of illegal control characters.
///
/// # Errors
///
/// - [`ExportError::TooManyRows`] if `rows` does not fit in a worksheet.
/// - [`ExportError::Xlsx`] if the workbook cannot be built.
pub fn write_xlsx<T: TabularRecord>(rows: &[T], sheet: &str) -> Result<Vec<u8>, ExportError> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet_name(sheet))?;

    for (col, header) in (0u16..).zip(T::headers()) {
        worksheet.write_string_with_format(0, col, *header, &header_format)?;
    }

    for (index, record) in rows.iter().enumerate() {
        let row = u32::try_from(index + 1).map_err(|_| ExportError::TooManyRows(rows.len()))?;
        for (col, cell) in (0u16..).zip(record.cells()) {
            match cell {
                Cell::Text(text) => {
                    worksheet.write_string(row, col, strip_illegal_chars(&text))?;
                }
                Cell::Number(value) => {
                    worksheet.write_number(row, col, value)?;
                }
                Cell::Empty => {}
            }
        }
    }

    let bytes = workbook.save_to_buffer()?;
    tracing::debug!(rows = rows.len(), bytes = bytes.len(), sheet, "xlsx export written");
    Ok(bytes)
}
