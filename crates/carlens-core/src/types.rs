//! Core types for carlens.
//!
//! ## Records
//! - [`Car`]: A stored vehicle with its store-assigned id
//! - [`NewCar`]: A vehicle that has not been persisted yet
//! - [`ExtractedFields`]: Best-effort fields pulled out of free text
//!
//! ## Queries
//! - [`FilterSpec`]: Optional criteria plus a result limit
//! - [`DateRange`]: Inclusive launch date bounds
//! - [`StoreStats`]: Summary numbers reported by a store

use crate::error::{InvalidFilterError, ValidationError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Default number of rows returned by a filtered query.
pub const DEFAULT_LIMIT: i64 = 10;

/// Upper bound of the rating scale.
pub const MAX_RATING: f64 = 5.0;

// ============================================================================
// Cars
// ============================================================================

/// A vehicle record as held by a store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Car {
    /// Store-assigned identifier
    pub id: i64,
    pub brand: String,
    pub model: String,
    /// Price in currency units
    pub price: f64,
    /// Rating on a 0 to 5 scale
    pub rating: f64,
    /// Launch date, `None` when unknown
    pub launch_date: Option<NaiveDate>,
}

/// A vehicle record before persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCar {
    pub brand: String,
    pub model: String,
    pub price: f64,
    pub rating: f64,
    pub launch_date: Option<NaiveDate>,
}

impl NewCar {
    /// Check the persistence invariants: non-empty brand and model,
    /// positive finite price and a rating inside `[0, 5]`.
    ///
    /// Nothing is clamped here; out-of-range values are rejected.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.brand.trim().is_empty() {
            return Err(ValidationError::EmptyBrand);
        }
        if self.model.trim().is_empty() {
            return Err(ValidationError::EmptyModel);
        }
        if !(self.price.is_finite() && self.price > 0.0) {
            return Err(ValidationError::NonPositivePrice(self.price));
        }
        if !(0.0..=MAX_RATING).contains(&self.rating) {
            return Err(ValidationError::RatingOutOfRange(self.rating));
        }
        Ok(())
    }

    /// Attach a store-assigned id.
    #[must_use]
    pub fn with_id(self, id: i64) -> Car {
        Car {
            id,
            brand: self.brand,
            model: self.model,
            price: self.price,
            rating: self.rating,
            launch_date: self.launch_date,
        }
    }
}

/// Fields extracted from a block of text.
///
/// Every field is always populated; misses fall back to defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedFields {
    pub brand: String,
    pub model: String,
    pub price: f64,
    pub rating: f64,
    pub launch_date: Option<NaiveDate>,
}

impl ExtractedFields {
    /// Record substituted when an image cannot be read.
    #[must_use]
    pub fn placeholder() -> Self {
        Self {
            brand: "Example Brand".to_string(),
            model: "Example Model".to_string(),
            price: 20_000.0,
            rating: 4.5,
            launch_date: None,
        }
    }
}

impl From<ExtractedFields> for NewCar {
    fn from(fields: ExtractedFields) -> Self {
        Self {
            brand: fields.brand,
            model: fields.model,
            price: fields.price,
            rating: fields.rating,
            launch_date: fields.launch_date,
        }
    }
}

// ============================================================================
// Filters
// ============================================================================

/// Inclusive launch date bounds. Either end may be open.
///
/// `start <= end` is not checked; an inverted range simply matches nothing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

/// A filtered query request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterSpec {
    /// Exact brand match
    pub brand: Option<String>,
    /// Launch date bounds
    pub date_range: Option<DateRange>,
    /// Lowest accepted rating
    pub min_rating: Option<f64>,
    /// Maximum number of rows, must be positive
    pub limit: i64,
}

impl Default for FilterSpec {
    fn default() -> Self {
        Self {
            brand: None,
            date_range: None,
            min_rating: None,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl FilterSpec {
    /// Reject limits that cannot produce a meaningful result.
    pub fn validate(&self) -> Result<(), InvalidFilterError> {
        if self.limit <= 0 {
            return Err(InvalidFilterError::NonPositiveLimit(self.limit));
        }
        Ok(())
    }
}

// ============================================================================
// Stats
// ============================================================================

/// Store statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreStats {
    /// Number of stored cars
    pub total_cars: u64,
    /// Number of distinct brands
    pub brands: u64,
    /// Highest id handed out so far
    pub last_inserted_id: Option<i64>,
}
