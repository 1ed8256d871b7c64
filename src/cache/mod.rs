//! Local caching module for listing data.
//!
//! This module provides the `CacheStore`, a TTL key-value cache over a
//! pluggable `Storage` backend. Entries are stored as JSON under a fixed
//! namespace prefix and considered stale after 5 minutes.
//!
//! Storage backends:
//! - `MemoryStorage`: in-process map, used by default and in tests
//! - `FileStorage`: single JSON document on disk

pub mod store;

pub use store::{CacheEntry, CacheStore, FileStorage, MemoryStorage, Storage, CACHE_PREFIX};
