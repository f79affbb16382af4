//! Dataset loading for DEFIS: fetch with retry, decode with encoding
//! fallback, parse tab-separated files into typed tables, and cache them by
//! source id.

pub mod decode;
pub mod error;
pub mod fetch;
pub mod parse;
pub(crate) mod retry;
pub mod repository;
pub mod table;

pub use decode::{clean_column_name, decode_text, Decoded};
pub use error::LoadError;
pub use fetch::SourceFetcher;
pub use repository::{CachedTable, Dataset, DatasetRepository, Snapshot};
pub use table::RawTable;
