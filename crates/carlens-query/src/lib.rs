//! # carlens-query
//!
//! Interpretation of plain-language commands and filtered car queries.
//!
//! ## Commands
//!
//! | Prefix | Intent | Parsed into |
//! |--------|--------|-------------|
//! | `adicionar ` / `add ` | store a car | [`NewCar`](carlens_core::NewCar) |
//! | `consultar ` / `query ` | find cars | [`FilterSpec`](carlens_core::FilterSpec) |
//!
//! ## Query Keywords
//!
//! - `da <Brand>` / `of <Brand>`: exact brand
//! - `<N> melhores` / `<N> best`: result limit (default 10)
//! - `entre <year> e <year|hoje>` / `between <year> and <year|today>`: launch range
//!
//! Results are always ordered by rating, best first.

pub mod catalog;
pub mod executor;
pub mod parser;

pub use catalog::{CarCatalog, Outcome};
pub use executor::FilterQueryEngine;
pub use parser::{CommandInterpreter, Intent, IntentKind, classify};
