//! REST API client module for the dealership backend.
//!
//! This module provides the `ApiClient` for communicating with the
//! car resource endpoints (`/api/cars`) and the lead submission
//! endpoint (`/api/leads`).
//!
//! Write operations use multipart encoding: a `car` JSON part plus
//! zero or more `images` binary parts in a single request.

pub mod client;
pub mod error;

pub use client::ApiClient;
pub use error::ApiError;
