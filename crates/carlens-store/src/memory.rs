//! In-memory store for testing without `SQLite`.
//!
//! This module provides a [`MemoryStore`] that keeps cars in a vector.
//! It's useful for:
//! - Unit tests that don't need persistence
//! - Interactive sessions that should leave nothing on disk

use async_trait::async_trait;
use carlens_core::{Car, CarStore, NewCar, Ordering, QueryPlan, StoreError, StoreStats};
use std::collections::HashSet;
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Default)]
struct Table {
    /// Rows in insertion order
    rows: Vec<Car>,
    /// Last id handed out, 0 before the first insert
    last_id: i64,
}

/// In-memory car store.
///
/// Evaluates [`QueryPlan`]s directly with the same semantics as the SQL
/// rendering: date predicates skip unknown launch dates, rating ties keep
/// insertion order, and a negative limit means no limit.
///
/// # Example
///
/// ```rust
/// use carlens_store::MemoryStore;
/// use carlens_core::CarStore;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = MemoryStore::new();
/// store.init().await?;
///
/// let stats = store.stats().await?;
/// assert_eq!(stats.total_cars, 0);
/// # Ok(())
/// # }
/// ```
pub struct MemoryStore {
    table: RwLock<Table>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            table: RwLock::new(Table::default()),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CarStore for MemoryStore {
    async fn init(&self) -> Result<(), StoreError> {
        debug!("MemoryStore initialized");
        Ok(())
    }

    async fn insert(&self, car: &NewCar) -> Result<i64, StoreError> {
        let mut table = self.table.write().await;
        table.last_id += 1;
        let id = table.last_id;
        table.rows.push(car.clone().with_id(id));

        debug!("Inserted car {}", id);
        Ok(id)
    }

    async fn query(&self, plan: &QueryPlan) -> Result<Vec<Car>, StoreError> {
        let table = self.table.read().await;
        let mut cars: Vec<Car> = table
            .rows
            .iter()
            .filter(|car| plan.matches(car))
            .cloned()
            .collect();

        // Stable, so equal ratings stay in id order
        if plan.ordering == Ordering::RatingDesc {
            cars.sort_by(|a, b| b.rating.total_cmp(&a.rating));
        }

        if let Some(limit) = plan.limit.and_then(|l| usize::try_from(l).ok()) {
            cars.truncate(limit);
        }

        debug!("Query matched {} cars", cars.len());
        Ok(cars)
    }

    async fn stats(&self) -> Result<StoreStats, StoreError> {
        let table = self.table.read().await;
        let brands: HashSet<&str> = table.rows.iter().map(|c| c.brand.as_str()).collect();

        Ok(StoreStats {
            total_cars: table.rows.len() as u64,
            brands: brands.len() as u64,
            last_inserted_id: (table.last_id > 0).then_some(table.last_id),
        })
    }
}
