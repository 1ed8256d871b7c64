//! carlot - client-side data access for a car dealership listing API.
//!
//! This crate mediates between a UI layer and the dealership REST
//! backend: fetching, creating, updating, and deleting car listings,
//! submitting seller leads, and caching reads with TTL-based expiry
//! and invalidate-on-write semantics.
//!
//! The usual wiring:
//!
//! ```no_run
//! use std::sync::Arc;
//! use carlot::{ApiClient, CarCatalog, CacheStore, MemoryStorage};
//! use carlot::config::Config;
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = Config::load()?;
//! let storage = Arc::new(MemoryStorage::default());
//! let catalog = CarCatalog::new(ApiClient::new(&config)?, CacheStore::new(storage));
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod auth;
pub mod cache;
pub mod catalog;
pub mod config;
pub mod models;

pub use api::{ApiClient, ApiError};
pub use cache::{CacheStore, FileStorage, MemoryStorage, Storage};
pub use catalog::{CarBackend, CarCatalog};
pub use config::Config;
pub use models::{Car, CarCondition, CarStatus, FuelType, ImageFile, ImageRef, Lead, Transmission};
