//! Core traits for carlens collaborators.
//!
//! - [`CarStore`]: Persist cars and answer query plans
//! - [`ImageToText`]: Turn an image of a label or poster into raw text
//!
//! Both are consumed as `Arc<dyn Trait>` so that the SQLite store, the
//! in-memory store and test doubles are interchangeable.

use async_trait::async_trait;
use std::path::Path;

use crate::error::{DecodeError, StoreError};
use crate::plan::QueryPlan;
use crate::types::{Car, NewCar, StoreStats};

// ============================================================================
// Car Storage
// ============================================================================

/// Trait for car persistence.
#[async_trait]
pub trait CarStore: Send + Sync {
    /// Initialize the store (create tables, open connections).
    async fn init(&self) -> Result<(), StoreError>;

    /// Insert a car and return its assigned id.
    async fn insert(&self, car: &NewCar) -> Result<i64, StoreError>;

    /// Return the cars matching `plan`, ordered and limited as it says.
    async fn query(&self, plan: &QueryPlan) -> Result<Vec<Car>, StoreError>;

    /// Get store statistics.
    async fn stats(&self) -> Result<StoreStats, StoreError>;
}

// ============================================================================
// Optical Character Recognition
// ============================================================================

/// Trait for OCR engines.
#[async_trait]
pub trait ImageToText: Send + Sync {
    /// Engine name/identifier.
    fn engine_name(&self) -> &str;

    /// Read all discernible text from the image at `path`.
    async fn image_to_text(&self, path: &Path) -> Result<String, DecodeError>;
}
