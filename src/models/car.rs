//! Domain models for car listings.
//!
//! These types represent listing data in a clean domain format,
//! decoupled from the wire structures used by the REST API.

use serde::{Deserialize, Serialize};

/// Transmission type, serialized in the backend's uppercase convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Transmission {
    Automatic,
    Manual,
}

/// Fuel type, serialized in the backend's uppercase convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FuelType {
    Gasoline,
    Diesel,
    Electric,
    Hybrid,
}

/// Condition of the vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CarCondition {
    New,
    Used,
    Certified,
}

/// Listing status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CarStatus {
    Available,
    Sold,
    Pending,
}

impl CarStatus {
    /// Lowercase form used in URL paths and cache keys.
    pub fn as_path_segment(&self) -> &'static str {
        match self {
            CarStatus::Available => "available",
            CarStatus::Sold => "sold",
            CarStatus::Pending => "pending",
        }
    }
}

/// A local image file staged for upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Reference to a listing image.
///
/// A `Stored` image lives on the backend and is addressed by filename;
/// a `Pending` image is a local file that has not been uploaded yet.
/// Pending images are never serialized into a request's JSON part -
/// they travel as binary multipart parts instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ImageRef {
    Stored {
        id: Option<i64>,
        filename: String,
        /// Fetchable URL, resolved client-side against the image base path.
        /// `None` when the stored filename is empty.
        url: Option<String>,
    },
    Pending(ImageFile),
}

impl ImageRef {
    pub fn is_pending(&self) -> bool {
        matches!(self, ImageRef::Pending(_))
    }
}

/// A car listing.
///
/// `id` is `None` until the backend assigns one on create.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Car {
    pub id: Option<i64>,
    pub make: String,
    pub model: String,
    pub manufactured_year: i32,
    pub mileage: i64,
    pub price: f64,
    pub vin: String,
    pub color: String,
    pub transmission: Transmission,
    pub fuel_type: FuelType,
    pub car_condition: CarCondition,
    pub status: CarStatus,
    pub description: String,
    pub images: Vec<ImageRef>,
}

impl Car {
    /// Images already stored on the backend, in display order.
    pub fn stored_images(&self) -> impl Iterator<Item = &ImageRef> {
        self.images.iter().filter(|i| !i.is_pending())
    }

    /// Local images still waiting to be uploaded.
    pub fn pending_images(&self) -> impl Iterator<Item = &ImageFile> {
        self.images.iter().filter_map(|i| match i {
            ImageRef::Pending(file) => Some(file),
            _ => None,
        })
    }

    /// URL of the first resolvable image, if any.
    pub fn primary_image_url(&self) -> Option<&str> {
        self.images.iter().find_map(|i| match i {
            ImageRef::Stored { url: Some(url), .. } => Some(url.as_str()),
            _ => None,
        })
    }

    pub fn display_name(&self) -> String {
        format!("{} {} {}", self.manufactured_year, self.make, self.model)
    }
}
