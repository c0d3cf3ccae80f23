//! # carlens-core
//!
//! Core types and traits for carlens, which turns car labels and short
//! plain-language requests into stored records and ranked queries.
//!
//! ## Architecture
//!
//! ```text
//! image ──ImageToText──▶ text ──FieldExtractor──▶ ExtractedFields ──▶ NewCar ──▶ CarStore
//! request ──CommandInterpreter──▶ FilterSpec ──FilterQueryEngine──▶ QueryPlan ──▶ CarStore
//! ```
//!
//! ## Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Car`] | A stored vehicle record |
//! | [`NewCar`] | A vehicle record awaiting persistence |
//! | [`ExtractedFields`] | Fields pulled out of free text |
//! | [`FilterSpec`] | Optional query criteria plus a limit |
//! | [`QueryPlan`] | Predicate conjunction, ordering and limit |
//!
//! ## Key Traits
//!
//! | Trait | Purpose |
//! |-------|---------|
//! | [`CarStore`] | Persist cars and answer query plans |
//! | [`ImageToText`] | OCR an image into raw text |
//!
//! ## Related Crates
//!
//! - `carlens-extract`: Field extraction and the OCR adapter
//! - `carlens-query`: Command interpretation and filtered queries
//! - `carlens-store`: In-memory and SQLite stores

pub mod error;
pub mod plan;
pub mod traits;
pub mod types;

pub use error::{DecodeError, Error, InvalidFilterError, Result, StoreError, ValidationError};
pub use plan::{Ordering, Predicate, QueryPlan, SqlStatement, SqlValue};
pub use traits::*;
pub use types::*;
