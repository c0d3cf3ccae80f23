//! Error types for carlens.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for carlens operations.
///
/// Extraction never produces an error: misses resolve to documented
/// defaults and undecodable images resolve to the placeholder record.
/// Everything that reaches this type is meant to be reported to the caller.
#[derive(Error, Debug)]
pub enum Error {
    /// Filter rejected before execution
    #[error("invalid filter: {0}")]
    InvalidFilter(#[from] InvalidFilterError),

    /// Car rejected before persistence
    #[error("invalid car: {0}")]
    InvalidCar(#[from] ValidationError),

    /// Store operation failed
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Image-to-text errors.
///
/// Not part of [`Error`]: the image pipeline answers them with a placeholder.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("image {path} could not be loaded: {reason}")]
    Unreadable { path: PathBuf, reason: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ocr engine failed: {0}")]
    Engine(String),
}

/// Filter validation errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InvalidFilterError {
    #[error("limit must be positive, got {0}")]
    NonPositiveLimit(i64),
}

/// Car validation errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("brand must not be empty")]
    EmptyBrand,

    #[error("model must not be empty")]
    EmptyModel,

    #[error("price must be positive, got {0}")]
    NonPositivePrice(f64),

    #[error("rating must be between 0 and 5, got {0}")]
    RatingOutOfRange(f64),
}

/// Car store errors.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("store initialization failed: {0}")]
    Init(String),

    #[error("insert failed: {0}")]
    Insert(String),

    #[error("query failed: {0}")]
    Query(String),

    #[error("schema error: {0}")]
    Schema(String),
}

/// Result type alias for carlens operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    // ========== DecodeError Tests ==========

    #[test]
    fn test_decode_error_unreadable_display() {
        let err = DecodeError::Unreadable {
            path: PathBuf::from("/tmp/label.png"),
            reason: "unsupported format".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "image /tmp/label.png could not be loaded: unsupported format"
        );
    }

    #[test]
    fn test_decode_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err: DecodeError = io_err.into();
        assert!(matches!(err, DecodeError::Io(_)));
        assert!(err.to_string().contains("no such file"));
    }

    #[test]
    fn test_decode_error_engine_display() {
        let err = DecodeError::Engine("tesseract exited with 1".to_string());
        assert_eq!(err.to_string(), "ocr engine failed: tesseract exited with 1");
    }

    // ========== Validation Tests ==========

    #[test]
    fn test_invalid_filter_display() {
        let err = InvalidFilterError::NonPositiveLimit(0);
        assert_eq!(err.to_string(), "limit must be positive, got 0");
    }

    #[test]
    fn test_validation_error_display() {
        assert_eq!(
            ValidationError::RatingOutOfRange(9.0).to_string(),
            "rating must be between 0 and 5, got 9"
        );
        assert_eq!(
            ValidationError::NonPositivePrice(-1.5).to_string(),
            "price must be positive, got -1.5"
        );
        assert_eq!(ValidationError::EmptyBrand.to_string(), "brand must not be empty");
    }

    // ========== StoreError Tests ==========

    #[test]
    fn test_store_error_display() {
        let err = StoreError::Query("database locked".to_string());
        assert_eq!(err.to_string(), "query failed: database locked");

        let err = StoreError::Schema("no such table: cars".to_string());
        assert_eq!(err.to_string(), "schema error: no such table: cars");
    }

    // ========== Main Error Tests ==========

    #[test]
    fn test_error_from_invalid_filter() {
        let err: Error = InvalidFilterError::NonPositiveLimit(-3).into();
        assert!(matches!(err, Error::InvalidFilter(_)));
        assert_eq!(
            err.to_string(),
            "invalid filter: limit must be positive, got -3"
        );
    }

    #[test]
    fn test_error_from_store() {
        let err: Error = StoreError::Insert("disk full".to_string()).into();
        assert!(matches!(err, Error::Store(_)));
        assert!(err.to_string().contains("disk full"));
    }

    #[test]
    fn test_error_from_validation() {
        let err: Error = ValidationError::EmptyModel.into();
        assert_eq!(err.to_string(), "invalid car: model must not be empty");
    }
}
