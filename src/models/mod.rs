//! Data models for dealership entities.
//!
//! This module contains the data structures used to represent
//! listing data including:
//!
//! - `Car`: a listing with pricing, specs, and images
//! - `ImageRef`, `ImageFile`: stored vs. pending listing images
//! - `Lead`: a seller inquiry from the "sell your car" form
//! - Enums: `Transmission`, `FuelType`, `CarCondition`, `CarStatus`

pub mod car;
pub mod lead;

pub use car::{Car, CarCondition, CarStatus, FuelType, ImageFile, ImageRef, Transmission};
pub use lead::Lead;
