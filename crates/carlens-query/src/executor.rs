//! Filter execution.

use carlens_core::{
    Car, CarStore, FilterSpec, InvalidFilterError, Ordering, Predicate, QueryPlan,
};
use std::sync::Arc;
use tracing::debug;

/// Turns a [`FilterSpec`] into a plan and runs it against a store.
pub struct FilterQueryEngine {
    /// Car store
    store: Arc<dyn CarStore>,
}

impl FilterQueryEngine {
    /// Create a new engine over `store`.
    #[must_use]
    pub fn new(store: Arc<dyn CarStore>) -> Self {
        Self { store }
    }

    /// Compile a filter into a plan ordered by rating, best first.
    ///
    /// Absent criteria add no predicate. The limit is validated here so an
    /// invalid filter never reaches a store.
    pub fn compile(spec: &FilterSpec) -> Result<QueryPlan, InvalidFilterError> {
        spec.validate()?;

        let mut plan = QueryPlan::all()
            .ordered_by(Ordering::RatingDesc)
            .limited_to(spec.limit);

        if let Some(brand) = &spec.brand {
            plan = plan.with_predicate(Predicate::BrandEq(brand.clone()));
        }
        if let Some(range) = spec.date_range {
            if let Some(start) = range.start {
                plan = plan.with_predicate(Predicate::LaunchedOnOrAfter(start));
            }
            if let Some(end) = range.end {
                plan = plan.with_predicate(Predicate::LaunchedOnOrBefore(end));
            }
        }
        if let Some(min) = spec.min_rating {
            plan = plan.with_predicate(Predicate::MinRating(min));
        }

        Ok(plan)
    }

    /// Execute a filter.
    pub async fn run(&self, spec: &FilterSpec) -> Result<Vec<Car>, carlens_core::Error> {
        let plan = Self::compile(spec)?;
        debug!("Executing filter: {:?}", plan);

        let cars = self
            .store
            .query(&plan)
            .await
            .map_err(carlens_core::Error::Store)?;

        debug!("Found {} cars", cars.len());
        Ok(cars)
    }
}
