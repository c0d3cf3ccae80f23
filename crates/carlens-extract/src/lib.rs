//! # carlens-extract
//!
//! Turns unstructured text, typed or recognized from an image, into car
//! fields.
//!
//! ## Extraction Rules
//!
//! | Field | Rules, in priority order | Default |
//! |-------|--------------------------|---------|
//! | brand | `marca`, `brand` label | `Unknown` |
//! | model | `modelo`, `model` label | `Unknown` |
//! | price | `R$ 45000`, `45000 reais`, `preço: 45000` | `50000.0` |
//! | rating | `nota 4,5` / `rating 9/10`, `4/5`, `9/10` | `4.0` |
//! | launch date | `2023-01-31`, `31/01/2023` | none |
//!
//! Ratings out of 10 are halved and every rating is clamped to `[0, 5]`.
//!
//! ## Images
//!
//! [`ImageFieldExtractor`] runs any [`ImageToText`](carlens_core::ImageToText)
//! engine and feeds the text through the rules above. [`TesseractOcr`] is the
//! bundled engine. When an image cannot be read the placeholder record is
//! returned instead of an error.
//!
//! ```rust,ignore
//! use carlens_extract::{ImageFieldExtractor, TesseractOcr};
//! use std::sync::Arc;
//!
//! let extractor = ImageFieldExtractor::new(Arc::new(TesseractOcr::default()));
//! let fields = extractor.analyze(Path::new("poster.jpg")).await;
//! ```

pub mod fields;
pub mod ocr;
pub mod scan;

pub use fields::{
    extract_car_fields, extract_labeled_text, extract_launch_date, extract_price, extract_rating,
};
pub use ocr::{OcrConfig, TesseractOcr};
pub use scan::{ImageFieldExtractor, is_supported_image};
