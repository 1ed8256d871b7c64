//! Sell-your-car lead submissions.

use serde::{Deserialize, Serialize};

use super::{CarCondition, FuelType, Transmission};

/// A seller inquiry submitted through the "sell your car" form.
///
/// Serializes directly in the backend's camelCase wire format; the
/// backend forwards the lead to the dealer rather than persisting it,
/// so there is no identifier on this type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    pub make: String,
    pub model: String,
    pub manufactured_year: i32,
    pub mileage: i64,
    pub description: String,
    pub color: String,
    pub transmission: Transmission,
    pub fuel_type: FuelType,
    pub condition: CarCondition,
    pub vin: String,
    pub owner_name: String,
    pub owner_email: String,
    pub owner_phone: String,
    pub preferred_contact_time: String,
    pub asking_price: f64,
}
