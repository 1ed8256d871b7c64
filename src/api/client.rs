//! API client for the dealership REST backend.
//!
//! This module provides the `ApiClient` struct for making requests
//! against the car resource and lead submission endpoints.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{header, multipart, Client};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::CarBackend;
use crate::config::Config;
use crate::models::{
    Car, CarCondition, CarStatus, FuelType, ImageFile, ImageRef, Lead, Transmission,
};

use super::ApiError;

/// HTTP request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// API client for the dealership backend.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    api_base: String,
    image_base: String,
    token: Option<String>,
}

impl ApiClient {
    /// Create a new API client from configuration
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            api_base: config.api_base_url.trim_end_matches('/').to_string(),
            image_base: config.image_base_url.trim_end_matches('/').to_string(),
            token: None,
        })
    }

    /// Create a new ApiClient with the given bearer token, sharing the
    /// connection pool.
    pub fn with_token(&self, token: String) -> Self {
        Self {
            client: self.client.clone(), // Cheap clone, shares connection pool
            api_base: self.api_base.clone(),
            image_base: self.image_base.clone(),
            token: Some(token),
        }
    }

    fn cars_url(&self) -> String {
        format!("{}/cars", self.api_base)
    }

    fn car_url(&self, id: i64) -> String {
        format!("{}/cars/{}", self.api_base, id)
    }

    fn auth_headers(&self) -> Result<header::HeaderMap> {
        let mut headers = header::HeaderMap::new();
        if let Some(ref token) = self.token {
            headers.insert(
                header::AUTHORIZATION,
                header::HeaderValue::from_str(&format!("Bearer {}", token))?,
            );
        }
        Ok(headers)
    }

    /// Check if response is successful, classifying the failure if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body).into())
        }
    }

    async fn get_cars_at(&self, url: &str) -> Result<Vec<Car>> {
        let response = self
            .client
            .get(url)
            .headers(self.auth_headers()?)
            .send()
            .await
            .map_err(ApiError::from)?;

        let response = Self::check_response(response).await?;

        let wires: Vec<CarWire> = response
            .json()
            .await
            .with_context(|| format!("Failed to parse car list from {}", url))?;

        Ok(wires
            .into_iter()
            .map(|w| w.into_domain(&self.image_base))
            .collect())
    }

    /// Build the multipart form: one `car` JSON part carrying stored
    /// images only, plus one `images` binary part per upload. Pending
    /// refs inside the record are treated as uploads, never serialized.
    fn multipart_form(&self, car: &Car, image_files: &[ImageFile]) -> Result<multipart::Form> {
        let wire = CarWire::from_domain(car);
        let json = serde_json::to_string(&wire).context("Failed to serialize car payload")?;

        let mut form = multipart::Form::new().part(
            "car",
            multipart::Part::text(json).mime_str("application/json")?,
        );

        for file in car.pending_images().chain(image_files.iter()) {
            form = form.part("images", Self::image_part(file)?);
        }

        Ok(form)
    }

    fn image_part(file: &ImageFile) -> Result<multipart::Part> {
        Ok(multipart::Part::bytes(file.bytes.clone())
            .file_name(file.file_name.clone())
            .mime_str(&file.content_type)?)
    }

    async fn send_multipart(&self, request: reqwest::RequestBuilder) -> Result<Car> {
        let response = request.send().await.map_err(ApiError::from)?;
        let response = Self::check_response(response).await?;
        let wire: CarWire = response
            .json()
            .await
            .context("Failed to parse car response")?;
        Ok(wire.into_domain(&self.image_base))
    }
}

#[async_trait]
impl CarBackend for ApiClient {
    async fn fetch_cars(&self) -> Result<Vec<Car>> {
        self.get_cars_at(&self.cars_url()).await
    }

    async fn fetch_car(&self, id: i64) -> Result<Car> {
        let url = self.car_url(id);
        let response = self
            .client
            .get(&url)
            .headers(self.auth_headers()?)
            .send()
            .await
            .map_err(ApiError::from)?;

        let response = Self::check_response(response).await?;

        let wire: CarWire = response
            .json()
            .await
            .with_context(|| format!("Failed to parse car from {}", url))?;
        Ok(wire.into_domain(&self.image_base))
    }

    async fn search_cars(&self, query: &str) -> Result<Vec<Car>> {
        // The query is passed through unchanged; the backend handles
        // empty and whitespace queries itself.
        let url = format!("{}/search", self.cars_url());
        let response = self
            .client
            .get(&url)
            .query(&[("query", query)])
            .headers(self.auth_headers()?)
            .send()
            .await
            .map_err(ApiError::from)?;

        let response = Self::check_response(response).await?;

        let wires: Vec<CarWire> = response
            .json()
            .await
            .context("Failed to parse search results")?;
        Ok(wires
            .into_iter()
            .map(|w| w.into_domain(&self.image_base))
            .collect())
    }

    async fn fetch_cars_by_status(&self, status: CarStatus) -> Result<Vec<Car>> {
        let url = format!("{}/status/{}", self.cars_url(), status.as_path_segment());
        self.get_cars_at(&url).await
    }

    async fn create_car(&self, car: &Car, image_files: &[ImageFile]) -> Result<Car> {
        debug!(make = %car.make, model = %car.model, "Creating car listing");
        let form = self.multipart_form(car, image_files)?;
        let request = self
            .client
            .post(self.cars_url())
            .headers(self.auth_headers()?)
            .multipart(form);
        self.send_multipart(request).await
    }

    async fn update_car(&self, id: i64, car: &Car, image_files: &[ImageFile]) -> Result<Car> {
        debug!(id, "Updating car listing");
        let form = self.multipart_form(car, image_files)?;
        let request = self
            .client
            .put(self.car_url(id))
            .headers(self.auth_headers()?)
            .multipart(form);
        self.send_multipart(request).await
    }

    async fn delete_car(&self, id: i64) -> Result<()> {
        debug!(id, "Deleting car listing");
        let response = self
            .client
            .delete(self.car_url(id))
            .headers(self.auth_headers()?)
            .send()
            .await
            .map_err(ApiError::from)?;

        Self::check_response(response).await?;
        Ok(())
    }

    async fn submit_lead(&self, lead: &Lead) -> Result<String> {
        let url = format!("{}/leads", self.api_base);
        let response = self
            .client
            .post(&url)
            .headers(self.auth_headers()?)
            .json(lead)
            .send()
            .await
            .map_err(ApiError::from)?;

        let response = Self::check_response(response).await?;
        response
            .text()
            .await
            .context("Failed to read lead confirmation")
    }
}

/// Resolve a stored image filename to a fetchable URL. Records with no
/// filename yield no URL.
fn resolve_image_url(image_base: &str, filename: &str) -> Option<String> {
    if filename.is_empty() {
        None
    } else {
        Some(format!("{}/{}", image_base, filename))
    }
}

// Internal wire types for the backend's camelCase JSON

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CarWire {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<i64>,
    make: String,
    model: String,
    #[serde(rename = "manufacturedYear")]
    manufactured_year: i32,
    #[serde(default)]
    mileage: i64,
    price: f64,
    #[serde(default)]
    vin: String,
    #[serde(default)]
    color: String,
    transmission: Transmission,
    #[serde(rename = "fuelType")]
    fuel_type: FuelType,
    #[serde(rename = "carCondition")]
    car_condition: CarCondition,
    status: CarStatus,
    #[serde(default)]
    description: String,
    #[serde(default)]
    images: Vec<ImageWire>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ImageWire {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<i64>,
    #[serde(rename = "imageUrl")]
    image_url: String,
}

impl CarWire {
    fn into_domain(self, image_base: &str) -> Car {
        let images = self
            .images
            .into_iter()
            .map(|img| ImageRef::Stored {
                id: img.id,
                url: resolve_image_url(image_base, &img.image_url),
                filename: img.image_url,
            })
            .collect();

        Car {
            id: self.id,
            make: self.make,
            model: self.model,
            manufactured_year: self.manufactured_year,
            mileage: self.mileage,
            price: self.price,
            vin: self.vin,
            color: self.color,
            transmission: self.transmission,
            fuel_type: self.fuel_type,
            car_condition: self.car_condition,
            status: self.status,
            description: self.description,
            images,
        }
    }

    /// Build the JSON payload for a write. Only stored images are
    /// carried; pending files go out as binary parts.
    fn from_domain(car: &Car) -> Self {
        let images = car
            .stored_images()
            .filter_map(|img| match img {
                ImageRef::Stored { id, filename, .. } => Some(ImageWire {
                    id: *id,
                    image_url: filename.clone(),
                }),
                ImageRef::Pending(_) => None,
            })
            .collect();

        Self {
            id: car.id,
            make: car.make.clone(),
            model: car.model.clone(),
            manufactured_year: car.manufactured_year,
            mileage: car.mileage,
            price: car.price,
            vin: car.vin.clone(),
            color: car.color.clone(),
            transmission: car.transmission,
            fuel_type: car.fuel_type,
            car_condition: car.car_condition,
            status: car.status,
            description: car.description.clone(),
            images,
        }
    }
}
