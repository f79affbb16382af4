//! Cached, typed access to the four datasets.
//!
//! Each table is fetched, decoded and parsed once, then shared as an
//! `Arc<[T]>` keyed by its source id until explicitly invalidated. A failed
//! load never touches the cache.

use std::collections::HashMap;
use std::sync::Arc;

use defis_core::{
    default_sources, load_sources, AppConfig, DatasetKind, DeviceRecord, DrugPresentation,
    ProductRecord, RevenueLine, SourcesFile, TextEncoding,
};
use tokio::sync::RwLock;

use crate::decode::decode_text;
use crate::error::LoadError;
use crate::fetch::SourceFetcher;
use crate::parse::{parse_catalogue, parse_devices, parse_products, parse_revenue};
use crate::table::RawTable;

/// A parsed table held by the cache.
#[derive(Debug, Clone)]
pub enum CachedTable {
    Catalogue(Arc<[DrugPresentation]>),
    Revenue(Arc<[RevenueLine]>),
    Devices(Arc<[DeviceRecord]>),
    Products(Arc<[ProductRecord]>),
}

/// A record type that one dataset parses into.
pub trait Dataset: Sized + Send + Sync + 'static {
    const KIND: DatasetKind;

    /// # Errors
    ///
    /// Returns a [`LoadError`] if the table is missing columns or holds
    /// invalid values.
    fn parse(table: &RawTable) -> Result<Vec<Self>, LoadError>;

    fn wrap(rows: Arc<[Self]>) -> CachedTable;

    fn unwrap_cached(table: &CachedTable) -> Option<Arc<[Self]>>;
}

macro_rules! impl_dataset {
    ($record:ty, $kind:ident, $parse:path) => {
        impl Dataset for $record {
            const KIND: DatasetKind = DatasetKind::$kind;

            fn parse(table: &RawTable) -> Result<Vec<Self>, LoadError> {
                $parse(table)
            }

            fn wrap(rows: Arc<[Self]>) -> CachedTable {
                CachedTable::$kind(rows)
            }

            fn unwrap_cached(table: &CachedTable) -> Option<Arc<[Self]>> {
                match table {
                    CachedTable::$kind(rows) => Some(Arc::clone(rows)),
                    _ => None,
                }
            }
        }
    };
}

impl_dataset!(DrugPresentation, Catalogue, parse_catalogue);
impl_dataset!(RevenueLine, Revenue, parse_revenue);
impl_dataset!(DeviceRecord, Devices, parse_devices);
impl_dataset!(ProductRecord, Products, parse_products);

/// All four tables, loaded together.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub catalogue: Arc<[DrugPresentation]>,
    pub revenue: Arc<[RevenueLine]>,
    pub devices: Arc<[DeviceRecord]>,
    pub products: Arc<[ProductRecord]>,
}

pub struct DatasetRepository {
    sources: SourcesFile,
    fetcher: SourceFetcher,
    encodings: Vec<TextEncoding>,
    cache: RwLock<HashMap<String, CachedTable>>,
}

impl DatasetRepository {
    #[must_use]
    pub fn new(sources: SourcesFile, fetcher: SourceFetcher, encodings: Vec<TextEncoding>) -> Self {
        Self {
            sources,
            fetcher,
            encodings,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Builds a repository from the application config, reading the sources
    /// file when one is configured and the built-in sources otherwise.
    ///
    /// # Errors
    ///
    /// - [`LoadError::Config`] if the sources file is unreadable or invalid.
    /// - [`LoadError::Http`] if the HTTP client cannot be built.
    pub fn from_config(config: &AppConfig) -> Result<Self, LoadError> {
        let sources = match &config.sources_path {
            Some(path) => load_sources(path)?,
            None => default_sources(),
        };
        let fetcher = SourceFetcher::new(config)?;
        Ok(Self::new(sources, fetcher, config.text_encodings.clone()))
    }

    #[must_use]
    pub fn sources(&self) -> &SourcesFile {
        &self.sources
    }

    /// Returns the table for `T`, loading and caching it on first use.
    ///
    /// # Errors
    ///
    /// Returns a [`LoadError`] if the source cannot be fetched or parsed.
    pub async fn load<T: Dataset>(&self) -> Result<Arc<[T]>, LoadError> {
        let source = self
            .sources
            .get(T::KIND)
            .ok_or_else(|| LoadError::UnknownDataset(T::KIND.to_string()))?;

        if let Some(rows) = self.cache.read().await.get(&source.id).and_then(T::unwrap_cached) {
            tracing::debug!(dataset = %T::KIND, source_id = %source.id, "dataset cache hit");
            return Ok(rows);
        }

        tracing::info!(dataset = %T::KIND, source_id = %source.id, "dataset cache miss; loading");
        let bytes = self.fetcher.fetch(source).await?;
        let decoded = decode_text(&bytes, &self.encodings);
        let table = RawTable::parse_tsv(&decoded.text, &T::KIND.to_string(), &source.id)?;
        let rows: Arc<[T]> = Arc::from(T::parse(&table)?);

        tracing::info!(
            dataset = %T::KIND,
            source_id = %source.id,
            rows = rows.len(),
            encoding = decoded.encoding.map_or("lossy-utf-8", TextEncoding::name),
            "dataset loaded"
        );
        self.cache
            .write()
            .await
            .insert(source.id.clone(), T::wrap(Arc::clone(&rows)));
        Ok(rows)
    }

    /// # Errors
    ///
    /// See [`DatasetRepository::load`].
    pub async fn catalogue(&self) -> Result<Arc<[DrugPresentation]>, LoadError> {
        self.load().await
    }

    /// # Errors
    ///
    /// See [`DatasetRepository::load`].
    pub async fn revenue(&self) -> Result<Arc<[RevenueLine]>, LoadError> {
        self.load().await
    }

    /// # Errors
    ///
    /// See [`DatasetRepository::load`].
    pub async fn devices(&self) -> Result<Arc<[DeviceRecord]>, LoadError> {
        self.load().await
    }

    /// # Errors
    ///
    /// See [`DatasetRepository::load`].
    pub async fn products(&self) -> Result<Arc<[ProductRecord]>, LoadError> {
        self.load().await
    }

    /// Loads all four tables concurrently.
    ///
    /// # Errors
    ///
    /// Returns the first [`LoadError`] raised by any of the loads.
    pub async fn snapshot(&self) -> Result<Snapshot, LoadError> {
        let (catalogue, revenue, devices, products) = futures::try_join!(
            self.catalogue(),
            self.revenue(),
            self.devices(),
            self.products()
        )?;
        Ok(Snapshot {
            catalogue,
            revenue,
            devices,
            products,
        })
    }

    /// Drops the cached table for `source_id`. Returns whether one was cached.
    pub async fn invalidate(&self, source_id: &str) -> bool {
        let removed = self.cache.write().await.remove(source_id).is_some();
        tracing::info!(source_id, removed, "dataset cache invalidated");
        removed
    }

    /// Drops every cached table. Returns how many were cached.
    pub async fn invalidate_all(&self) -> usize {
        let mut cache = self.cache.write().await;
        let count = cache.len();
        cache.clear();
        tracing::info!(count, "dataset cache cleared");
        count
    }

    /// Source ids currently held in the cache, sorted.
    pub async fn cached_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.cache.read().await.keys().cloned().collect();
        ids.sort_unstable();
        ids
    }
}
