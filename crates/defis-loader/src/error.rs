use thiserror::Error;

/// Errors raised while fetching, decoding or parsing a dataset.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed tab-separated data in source {source_id}: {source}")]
    Parse {
        source_id: String,
        #[source]
        source: csv::Error,
    },

    #[error("dataset {dataset} is missing required column \"{column}\"")]
    MissingColumn { dataset: String, column: String },

    #[error("dataset {dataset}, row {row}: invalid {column} value \"{value}\"")]
    InvalidValue {
        dataset: String,
        row: usize,
        column: String,
        value: String,
    },

    #[error("no source configured for dataset {0}")]
    UnknownDataset(String),

    #[error("config error: {0}")]
    Config(#[from] defis_core::ConfigError),
}
