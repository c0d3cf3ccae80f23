//! Car storage layer for carlens.
//!
//! This crate provides the storage backends for carlens, implementing the
//! [`CarStore`](carlens_core::CarStore) trait.
//!
//! # Backends
//!
//! - [`SqliteStore`]: Persistent store in a single `SQLite` file. Every
//!   [`QueryPlan`](carlens_core::QueryPlan) is rendered with bound
//!   parameters, and tables created before launch dates existed are
//!   migrated on [`init`](carlens_core::CarStore::init).
//! - [`MemoryStore`]: Process-local store with identical query semantics.
//!
//! # Example
//!
//! ```rust,ignore
//! use carlens_store::SqliteStore;
//! use carlens_core::{CarStore, QueryPlan};
//!
//! // Create and initialize store
//! let store = SqliteStore::new("path/to/cars.db".into());
//! store.init().await?;
//!
//! // Store a car
//! let id = store.insert(&car).await?;
//!
//! // Read everything back
//! let cars = store.query(&QueryPlan::all()).await?;
//! ```

pub mod memory;
pub mod schema;
pub mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
