//! Domain types shared by every DEFIS crate: typed dataset records, the
//! rating taxonomy, legal-entity grouping, and application configuration.

pub mod app_config;
pub mod config;
pub mod owners;
pub mod records;
pub mod sources;
pub mod taxonomy;

use thiserror::Error;

pub use app_config::{AppConfig, Environment, TextEncoding};
pub use config::{load_app_config, load_app_config_from_env};
pub use owners::canonicalize_owner;
pub use records::{
    DeviceRecord, DrugPresentation, ProductRecord, ProductType, RatingColumn, RevenueLine,
};
pub use sources::{default_sources, load_sources, DatasetKind, SourceConfig, SourcesFile};
pub use taxonomy::{normalize, RatingFamily, UNSET_LABEL};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read sources file {path}: {source}")]
    SourcesFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse sources file: {0}")]
    SourcesFileParse(#[source] serde_yaml::Error),

    #[error("sources validation failed: {0}")]
    Validation(String),
}
