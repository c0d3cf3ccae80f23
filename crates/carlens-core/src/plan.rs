//! Query plans and their parameterized SQL rendering.
//!
//! A [`QueryPlan`] is the store-agnostic form of a query: a conjunction of
//! [`Predicate`]s, an [`Ordering`] and an optional row limit. Stores either
//! evaluate it directly ([`Predicate::matches`]) or render it with
//! [`QueryPlan::to_sql`], which keeps every user-supplied value out of the
//! statement text and in the bound parameter list.

use crate::types::Car;
use chrono::NaiveDate;

/// Table holding car rows.
pub const CARS_TABLE: &str = "cars";

/// Column list shared by every rendered select.
pub const CAR_COLUMNS: &str = "id, brand, model, price, rating, launch_date";

/// A single filter condition.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// `brand = ?`
    BrandEq(String),
    /// `model = ?`
    ModelEq(String),
    /// `launch_date >= ?`
    LaunchedOnOrAfter(NaiveDate),
    /// `launch_date <= ?`
    LaunchedOnOrBefore(NaiveDate),
    /// `rating >= ?`
    MinRating(f64),
}

impl Predicate {
    /// Evaluate against a car. Date predicates never match a car whose
    /// launch date is unknown, mirroring SQL `NULL` comparison.
    #[must_use]
    pub fn matches(&self, car: &Car) -> bool {
        match self {
            Self::BrandEq(brand) => car.brand == *brand,
            Self::ModelEq(model) => car.model == *model,
            Self::LaunchedOnOrAfter(start) => car.launch_date.is_some_and(|d| d >= *start),
            Self::LaunchedOnOrBefore(end) => car.launch_date.is_some_and(|d| d <= *end),
            Self::MinRating(min) => car.rating >= *min,
        }
    }

    fn clause(&self) -> &'static str {
        match self {
            Self::BrandEq(_) => "brand = ?",
            Self::ModelEq(_) => "model = ?",
            Self::LaunchedOnOrAfter(_) => "launch_date >= ?",
            Self::LaunchedOnOrBefore(_) => "launch_date <= ?",
            Self::MinRating(_) => "rating >= ?",
        }
    }

    fn param(&self) -> SqlValue {
        match self {
            Self::BrandEq(s) | Self::ModelEq(s) => SqlValue::Text(s.clone()),
            Self::LaunchedOnOrAfter(d) | Self::LaunchedOnOrBefore(d) => {
                SqlValue::Text(d.format("%Y-%m-%d").to_string())
            }
            Self::MinRating(r) => SqlValue::Real(*r),
        }
    }
}

/// Result ordering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Ordering {
    /// Insertion order
    #[default]
    Natural,
    /// Highest rating first, ties in insertion order
    RatingDesc,
}

/// A value bound to a `?` placeholder.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Text(String),
    Real(f64),
    Integer(i64),
}

/// Rendered statement with its bound parameters, in placeholder order.
#[derive(Debug, Clone, PartialEq)]
pub struct SqlStatement {
    pub text: String,
    pub params: Vec<SqlValue>,
}

/// Store-agnostic query: predicate conjunction, ordering and limit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryPlan {
    pub predicates: Vec<Predicate>,
    pub ordering: Ordering,
    /// Applied after ordering
    pub limit: Option<i64>,
}

impl QueryPlan {
    /// A plan matching every row in insertion order.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_predicate(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    #[must_use]
    pub fn ordered_by(mut self, ordering: Ordering) -> Self {
        self.ordering = ordering;
        self
    }

    #[must_use]
    pub fn limited_to(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// True if every predicate holds for `car`. An empty plan matches all.
    #[must_use]
    pub fn matches(&self, car: &Car) -> bool {
        self.predicates.iter().all(|p| p.matches(car))
    }

    /// Render as a `SELECT` over [`CARS_TABLE`] with `?` placeholders.
    #[must_use]
    pub fn to_sql(&self) -> SqlStatement {
        let mut text = format!("SELECT {CAR_COLUMNS} FROM {CARS_TABLE}");
        let mut params = Vec::with_capacity(self.predicates.len() + 1);

        for (i, predicate) in self.predicates.iter().enumerate() {
            text.push_str(if i == 0 { " WHERE " } else { " AND " });
            text.push_str(predicate.clause());
            params.push(predicate.param());
        }

        match self.ordering {
            Ordering::Natural => text.push_str(" ORDER BY id ASC"),
            Ordering::RatingDesc => text.push_str(" ORDER BY rating DESC, id ASC"),
        }

        if let Some(limit) = self.limit {
            text.push_str(" LIMIT ?");
            params.push(SqlValue::Integer(limit));
        }

        SqlStatement { text, params }
    }
}
