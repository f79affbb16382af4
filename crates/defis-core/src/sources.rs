use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::ConfigError;

const DRIVE_DOWNLOAD_URL: &str = "https://drive.google.com/uc?export=download&id=";

/// The four datasets behind the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatasetKind {
    /// Drug presentations with SMR/ASMR (one row per CIS + CIP13).
    Catalogue,
    /// Revenue per drug for the largest laboratories.
    Revenue,
    /// HAS medical-device dossiers.
    Devices,
    /// Drugs and devices together, tagged with product type and root group.
    Products,
}

impl DatasetKind {
    pub const ALL: [DatasetKind; 4] = [
        DatasetKind::Catalogue,
        DatasetKind::Revenue,
        DatasetKind::Devices,
        DatasetKind::Products,
    ];
}

impl std::fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DatasetKind::Catalogue => write!(f, "catalogue"),
            DatasetKind::Revenue => write!(f, "revenue"),
            DatasetKind::Devices => write!(f, "devices"),
            DatasetKind::Products => write!(f, "products"),
        }
    }
}

/// Where one dataset comes from.
///
/// `id` is the cache key. A `path` wins over `url`; with neither, the id is
/// treated as a Google Drive file id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceConfig {
    pub kind: DatasetKind,
    pub id: String,
    pub url: Option<String>,
    pub path: Option<PathBuf>,
}

impl SourceConfig {
    #[must_use]
    pub fn drive(kind: DatasetKind, id: &str) -> Self {
        Self {
            kind,
            id: id.to_string(),
            url: None,
            path: None,
        }
    }

    #[must_use]
    pub fn local(kind: DatasetKind, id: &str, path: impl Into<PathBuf>) -> Self {
        Self {
            kind,
            id: id.to_string(),
            url: None,
            path: Some(path.into()),
        }
    }

    /// The URL to download this source from when it has no local path.
    #[must_use]
    pub fn download_url(&self) -> String {
        self.url
            .clone()
            .unwrap_or_else(|| format!("{DRIVE_DOWNLOAD_URL}{}", self.id))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourcesFile {
    pub sources: Vec<SourceConfig>,
}

impl SourcesFile {
    /// The configured source for `kind`. Validated files have exactly one.
    #[must_use]
    pub fn get(&self, kind: DatasetKind) -> Option<&SourceConfig> {
        self.sources.iter().find(|s| s.kind == kind)
    }
}

/// The Drive files the dashboard reads when no sources file is configured.
#[must_use]
pub fn default_sources() -> SourcesFile {
    SourcesFile {
        sources: vec![
            SourceConfig::drive(DatasetKind::Catalogue, "1y-vVibmmuKyBcMcSX6UopgP5YuVos-Xn"),
            SourceConfig::drive(DatasetKind::Revenue, "1TDzeC3Ug3JSN9wI1ENlGks4dwWL64jMU"),
            SourceConfig::drive(DatasetKind::Devices, "1EUDSX1PJowZPQ949dzbyKLX_BTBZBe3q"),
            SourceConfig::drive(DatasetKind::Products, "1soEmF7Duey5LT_pfSGwkqZTzqaj7uj0N"),
        ],
    }
}

/// Load and validate the dataset sources from a YAML file.
///
/// Relative `path` entries are resolved against the file's directory.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_sources(path: &Path) -> Result<SourcesFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::SourcesFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let mut sources_file: SourcesFile =
        serde_yaml::from_str(&content).map_err(ConfigError::SourcesFileParse)?;

    validate_sources(&sources_file)?;

    if let Some(base) = path.parent() {
        for source in &mut sources_file.sources {
            if let Some(p) = source.path.as_mut() {
                if p.is_relative() {
                    *p = base.join(&*p);
                }
            }
        }
    }

    Ok(sources_file)
}

fn validate_sources(sources_file: &SourcesFile) -> Result<(), ConfigError> {
    let mut seen_kinds = HashSet::new();
    let mut seen_ids = HashSet::new();

    for source in &sources_file.sources {
        if source.id.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "source for '{}' must have a non-empty id",
                source.kind
            )));
        }

        if !seen_kinds.insert(source.kind) {
            return Err(ConfigError::Validation(format!(
                "duplicate source for dataset '{}'",
                source.kind
            )));
        }

        if !seen_ids.insert(source.id.as_str()) {
            return Err(ConfigError::Validation(format!(
                "duplicate source id: '{}'",
                source.id
            )));
        }
    }

    for kind in DatasetKind::ALL {
        if !seen_kinds.contains(&kind) {
            return Err(ConfigError::Validation(format!(
                "missing source for dataset '{kind}'"
            )));
        }
    }

    Ok(())
}
