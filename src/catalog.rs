//! Car listing data access: cache-fronted facade over the REST backend.
//!
//! `CarCatalog` mediates every car-resource operation between the UI
//! layer and the backend. Reads populate the cache; writes invalidate
//! affected entries rather than patching them in place, because the set
//! of fields affecting listing/search membership (price, status, make,
//! year) is broad enough that partial patching risks staleness.

use anyhow::Result;
use async_trait::async_trait;
use tracing::debug;

use crate::cache::CacheStore;
use crate::models::{Car, CarStatus, ImageFile, Lead};

/// Remote car-resource operations. Implemented by `ApiClient`; tests
/// substitute an in-memory fake.
#[async_trait]
pub trait CarBackend: Send + Sync {
    async fn fetch_cars(&self) -> Result<Vec<Car>>;
    async fn fetch_car(&self, id: i64) -> Result<Car>;
    async fn search_cars(&self, query: &str) -> Result<Vec<Car>>;
    async fn fetch_cars_by_status(&self, status: CarStatus) -> Result<Vec<Car>>;
    async fn create_car(&self, car: &Car, image_files: &[ImageFile]) -> Result<Car>;
    async fn update_car(&self, id: i64, car: &Car, image_files: &[ImageFile]) -> Result<Car>;
    async fn delete_car(&self, id: i64) -> Result<()>;
    async fn submit_lead(&self, lead: &Lead) -> Result<String>;
}

#[async_trait]
impl<B: CarBackend + ?Sized> CarBackend for std::sync::Arc<B> {
    async fn fetch_cars(&self) -> Result<Vec<Car>> {
        (**self).fetch_cars().await
    }
    async fn fetch_car(&self, id: i64) -> Result<Car> {
        (**self).fetch_car(id).await
    }
    async fn search_cars(&self, query: &str) -> Result<Vec<Car>> {
        (**self).search_cars(query).await
    }
    async fn fetch_cars_by_status(&self, status: CarStatus) -> Result<Vec<Car>> {
        (**self).fetch_cars_by_status(status).await
    }
    async fn create_car(&self, car: &Car, image_files: &[ImageFile]) -> Result<Car> {
        (**self).create_car(car, image_files).await
    }
    async fn update_car(&self, id: i64, car: &Car, image_files: &[ImageFile]) -> Result<Car> {
        (**self).update_car(id, car, image_files).await
    }
    async fn delete_car(&self, id: i64) -> Result<()> {
        (**self).delete_car(id).await
    }
    async fn submit_lead(&self, lead: &Lead) -> Result<String> {
        (**self).submit_lead(lead).await
    }
}

/// All cache keys are built here so read and invalidation call sites
/// cannot drift apart.
mod keys {
    use crate::models::CarStatus;

    pub const ALL: &str = "all";
    pub const SEARCH_PREFIX: &str = "search:";
    pub const STATUS_PREFIX: &str = "status:";

    pub fn by_id(id: i64) -> String {
        format!("id:{}", id)
    }

    /// Search keys are case-normalized so "Toyota" and "toyota" share
    /// one entry.
    pub fn search(query: &str) -> String {
        format!("{}{}", SEARCH_PREFIX, query.to_lowercase())
    }

    pub fn status(status: CarStatus) -> String {
        format!("{}{}", STATUS_PREFIX, status.as_path_segment())
    }
}

/// Cache-fronted access to car listings.
pub struct CarCatalog<B: CarBackend> {
    backend: B,
    cache: CacheStore,
}

impl<B: CarBackend> CarCatalog<B> {
    pub fn new(backend: B, cache: CacheStore) -> Self {
        Self { backend, cache }
    }

    /// All listings. Cached under `"all"`.
    pub async fn list_all(&self) -> Result<Vec<Car>> {
        if let Some(cars) = self.cache.get::<Vec<Car>>(keys::ALL)? {
            debug!("Cache hit for car list");
            return Ok(cars);
        }

        let cars = self.backend.fetch_cars().await?;
        self.cache.set(keys::ALL, &cars)?;
        Ok(cars)
    }

    /// A single listing by id. Cached under `"id:{id}"`.
    pub async fn get_by_id(&self, id: i64) -> Result<Car> {
        let key = keys::by_id(id);
        if let Some(car) = self.cache.get::<Car>(&key)? {
            debug!(id, "Cache hit for car");
            return Ok(car);
        }

        let car = self.backend.fetch_car(id).await?;
        self.cache.set(&key, &car)?;
        Ok(car)
    }

    /// Search by make/model/year substring. Cached under the
    /// lowercased query; the query itself is passed through unchanged.
    pub async fn search(&self, query: &str) -> Result<Vec<Car>> {
        let key = keys::search(query);
        if let Some(cars) = self.cache.get::<Vec<Car>>(&key)? {
            debug!(query, "Cache hit for search");
            return Ok(cars);
        }

        let cars = self.backend.search_cars(query).await?;
        self.cache.set(&key, &cars)?;
        Ok(cars)
    }

    /// Listings filtered by status. Cached under `"status:{status}"`.
    pub async fn by_status(&self, status: CarStatus) -> Result<Vec<Car>> {
        let key = keys::status(status);
        if let Some(cars) = self.cache.get::<Vec<Car>>(&key)? {
            debug!(status = status.as_path_segment(), "Cache hit for status");
            return Ok(cars);
        }

        let cars = self.backend.fetch_cars_by_status(status).await?;
        self.cache.set(&key, &cars)?;
        Ok(cars)
    }

    /// Create a listing. The new record may need to appear in later
    /// `list_all` and status listings, so those entries are purged on
    /// success. A failed write purges nothing.
    pub async fn create(&self, car: &Car, image_files: &[ImageFile]) -> Result<Car> {
        let created = self.backend.create_car(car, image_files).await?;
        debug!(id = ?created.id, "Created car, invalidating listing caches");
        self.cache.clear(keys::ALL)?;
        self.cache.clear_matching(keys::STATUS_PREFIX)?;
        Ok(created)
    }

    /// Replace a listing. All search and status entries are purged, not
    /// just those that could contain this record: make/model/year edits
    /// can move a car between result sets, and enumerating the affected
    /// queries is not worth the bookkeeping.
    pub async fn update(&self, id: i64, car: &Car, image_files: &[ImageFile]) -> Result<Car> {
        let updated = self.backend.update_car(id, car, image_files).await?;
        debug!(id, "Updated car, invalidating caches");
        self.invalidate_for(id)?;
        Ok(updated)
    }

    /// Delete a listing and purge every entry that could contain it.
    pub async fn delete(&self, id: i64) -> Result<()> {
        self.backend.delete_car(id).await?;
        debug!(id, "Deleted car, invalidating caches");
        self.invalidate_for(id)?;
        Ok(())
    }

    /// Submit a seller inquiry. No cache interaction.
    pub async fn submit_lead(&self, lead: &Lead) -> Result<String> {
        self.backend.submit_lead(lead).await
    }

    fn invalidate_for(&self, id: i64) -> Result<()> {
        self.cache.clear(keys::ALL)?;
        self.cache.clear(&keys::by_id(id))?;
        self.cache.clear_matching(keys::SEARCH_PREFIX)?;
        self.cache.clear_matching(keys::STATUS_PREFIX)?;
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
