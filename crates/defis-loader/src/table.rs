//! Untyped tab-separated table with cleaned headers.

use crate::decode::clean_column_name;
use crate::error::LoadError;

/// A parsed tab-separated file: cleaned headers plus rows of optional cells.
///
/// Blank cells (empty or whitespace only) are `None`. Non-blank cells are kept
/// verbatim, leading spaces included: registrant names rely on them.
#[derive(Debug, Clone)]
pub struct RawTable {
    dataset: String,
    headers: Vec<String>,
    rows: Vec<Vec<Option<String>>>,
}

impl RawTable {
    /// Parses tab-separated `text`. The first record is the header row.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Parse`] if the `csv` reader rejects the input.
    pub fn parse_tsv(text: &str, dataset: &str, source_id: &str) -> Result<Self, LoadError> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(true)
            .flexible(true)
            .from_reader(text.as_bytes());

        let parse_err = |source: csv::Error| LoadError::Parse {
            source_id: source_id.to_owned(),
            source,
        };

        let headers = reader
            .headers()
            .map_err(parse_err)?
            .iter()
            .map(clean_column_name)
            .collect();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(parse_err)?;
            let row = record
                .iter()
                .map(|cell| {
                    if cell.trim().is_empty() {
                        None
                    } else {
                        Some(cell.to_owned())
                    }
                })
                .collect();
            rows.push(row);
        }

        Ok(Self {
            dataset: dataset.to_owned(),
            headers,
            rows,
        })
    }

    #[must_use]
    pub fn dataset(&self) -> &str {
        &self.dataset
    }

    #[must_use]
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of a column that must exist.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::MissingColumn`] naming the dataset and column.
    pub fn column(&self, name: &str) -> Result<usize, LoadError> {
        self.optional_column(name)
            .ok_or_else(|| LoadError::MissingColumn {
                dataset: self.dataset.clone(),
                column: name.to_owned(),
            })
    }

    #[must_use]
    pub fn optional_column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Cell `column` of row `row`. Short rows read as blank.
    #[must_use]
    pub fn cell(&self, row: usize, column: usize) -> Option<&str> {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .and_then(Option::as_deref)
    }

    /// Like [`RawTable::cell`], for a column that may be absent.
    #[must_use]
    pub fn optional_cell(&self, row: usize, column: Option<usize>) -> Option<&str> {
        column.and_then(|c| self.cell(row, c))
    }
}
