//! Catalog cache for the static reference datasets
//!
//! Each dataset is read from the data directory the first time it is asked
//! for and kept for the lifetime of the process. There is no refresh path:
//! updating a dataset means restarting the service.

use std::fmt::Debug;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::OnceCell;
use tokio::task;
use tracing::{debug, info, instrument};

use crate::PlannerError;
use crate::models::{Flight, Hotel, Place};

/// The reference datasets known to the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dataset {
    Flights,
    Hotels,
    Places,
}

impl Dataset {
    #[must_use]
    pub fn file_name(self) -> &'static str {
        match self {
            Dataset::Flights => "flights.json",
            Dataset::Hotels => "hotels.json",
            Dataset::Places => "places.json",
        }
    }
}

/// A record type stored in one of the catalog datasets
pub trait CatalogRecord: DeserializeOwned + Debug + Send + Sync + 'static {
    const DATASET: Dataset;

    #[doc(hidden)]
    fn slot(cache: &CatalogCache) -> &OnceCell<Arc<[Self]>>;
}

impl CatalogRecord for Flight {
    const DATASET: Dataset = Dataset::Flights;

    fn slot(cache: &CatalogCache) -> &OnceCell<Arc<[Self]>> {
        &cache.flights
    }
}

impl CatalogRecord for Hotel {
    const DATASET: Dataset = Dataset::Hotels;

    fn slot(cache: &CatalogCache) -> &OnceCell<Arc<[Self]>> {
        &cache.hotels
    }
}

impl CatalogRecord for Place {
    const DATASET: Dataset = Dataset::Places;

    fn slot(cache: &CatalogCache) -> &OnceCell<Arc<[Self]>> {
        &cache.places
    }
}

/// Record counts per dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CatalogStats {
    pub flights: usize,
    pub hotels: usize,
    pub places: usize,
}

/// Read-once store for flights, hotels and places
#[derive(Debug)]
pub struct CatalogCache {
    data_dir: PathBuf,
    flights: OnceCell<Arc<[Flight]>>,
    hotels: OnceCell<Arc<[Hotel]>>,
    places: OnceCell<Arc<[Place]>>,
}

impl CatalogCache {
    /// Create an empty cache reading from `data_dir`
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            flights: OnceCell::new(),
            hotels: OnceCell::new(),
            places: OnceCell::new(),
        }
    }

    /// Create a cache that is already populated, never touching the disk
    #[must_use]
    pub fn from_records(flights: Vec<Flight>, hotels: Vec<Hotel>, places: Vec<Place>) -> Self {
        Self {
            data_dir: PathBuf::new(),
            flights: OnceCell::new_with(Some(flights.into())),
            hotels: OnceCell::new_with(Some(hotels.into())),
            places: OnceCell::new_with(Some(places.into())),
        }
    }

    #[must_use]
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Returns the dataset for `R`, reading it on first access.
    ///
    /// Concurrent first calls share one read; every caller gets the same slice.
    pub async fn load<R: CatalogRecord>(&self) -> Result<Arc<[R]>, PlannerError> {
        let records = R::slot(self)
            .get_or_try_init(|| read_dataset::<R>(self.data_dir.join(R::DATASET.file_name())))
            .await?;
        Ok(Arc::clone(records))
    }

    /// Load every dataset up front so the first request does not pay for it
    #[instrument(skip(self), fields(data_dir = %self.data_dir.display()))]
    pub async fn preload(&self) -> Result<CatalogStats, PlannerError> {
        let stats = CatalogStats {
            flights: self.load::<Flight>().await?.len(),
            hotels: self.load::<Hotel>().await?.len(),
            places: self.load::<Place>().await?.len(),
        };
        info!(
            "Catalog ready: {} flights, {} hotels, {} places",
            stats.flights, stats.hotels, stats.places
        );
        Ok(stats)
    }

    /// Counts of the datasets loaded so far; unloaded datasets count as zero
    #[must_use]
    pub fn stats(&self) -> CatalogStats {
        CatalogStats {
            flights: self.flights.get().map_or(0, |records| records.len()),
            hotels: self.hotels.get().map_or(0, |records| records.len()),
            places: self.places.get().map_or(0, |records| records.len()),
        }
    }
}

async fn read_dataset<R: CatalogRecord>(path: PathBuf) -> Result<Arc<[R]>, PlannerError> {
    debug!("Reading dataset {}", path.display());

    let bytes = tokio::fs::read(&path).await.map_err(|e| {
        PlannerError::catalog(format!("Failed to read {}: {e}", path.display()))
    })?;

    let records: Vec<R> = task::spawn_blocking(move || serde_json::from_slice::<Vec<R>>(&bytes))
        .await
        .map_err(|e| PlannerError::catalog(format!("Dataset parser panicked: {e}")))?
        .map_err(|e| {
            PlannerError::catalog(format!(
                "Failed to parse {}: {e}",
                R::DATASET.file_name()
            ))
        })?;

    debug!("Parsed {} records from {}", records.len(), path.display());
    Ok(records.into())
}
