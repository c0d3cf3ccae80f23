//! Car fields from images of labels and posters.

use carlens_core::{ExtractedFields, ImageToText};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::fields::extract_car_fields;

/// Image extensions the OCR path is expected to handle.
pub const SUPPORTED_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "gif", "webp", "bmp", "tiff", "tif",
];

/// OCR an image and extract car fields from the recognized text.
pub struct ImageFieldExtractor {
    ocr: Arc<dyn ImageToText>,
}

impl ImageFieldExtractor {
    /// Create an extractor over the given OCR engine.
    pub fn new(ocr: Arc<dyn ImageToText>) -> Self {
        Self { ocr }
    }

    /// Extract fields from the image at `path`.
    ///
    /// Never fails: if the engine cannot produce text for any reason the
    /// [placeholder record](ExtractedFields::placeholder) is returned.
    pub async fn analyze(&self, path: &Path) -> ExtractedFields {
        match self.ocr.image_to_text(path).await {
            Ok(text) => {
                debug!(
                    "{} read {} chars from {:?}",
                    self.ocr.engine_name(),
                    text.chars().count(),
                    path
                );
                extract_car_fields(&text)
            }
            Err(e) => {
                warn!("Failed to read image {:?}: {}. Using placeholder values.", path, e);
                ExtractedFields::placeholder()
            }
        }
    }
}

/// Check if `path` has an image extension the OCR path handles.
#[must_use]
pub fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| SUPPORTED_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
}
