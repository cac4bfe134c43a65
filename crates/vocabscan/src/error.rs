//! Error types for vocabscan.
//!
//! All fallible operations return [`VocabError`]. The pipeline itself is
//! deliberately forgiving: recognition failures degrade into a short (or empty)
//! result with diagnostics, and only an engine that cannot be initialized at all
//! surfaces as an error from [`crate::Pipeline::run`].
//!
//! - `Io` errors always bubble up unchanged.
//! - `Ocr` marks a single failed recognition call (recoverable by language fallback).
//! - `EngineUnavailable` is fatal for the current invocation.
//! - `Validation` covers bad configuration and arguments.
//!
//! # Example
//!
//! ```rust
//! use vocabscan::{Result, VocabError};
//!
//! fn check_ratio(value: f64) -> Result<f64> {
//!     if !(0.0..=1.0).contains(&value) {
//!         return Err(VocabError::validation(format!("ratio out of range: {}", value)));
//!     }
//!     Ok(value)
//! }
//! # assert!(check_ratio(0.5).is_ok());
//! ```
use thiserror::Error;

/// Result type alias using `VocabError`.
pub type Result<T> = std::result::Result<T, VocabError>;

/// Main error type for all vocabscan operations.
#[derive(Debug, Error)]
pub enum VocabError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("OCR error: {message}")]
    Ocr {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("OCR engine unavailable: {message}")]
    EngineUnavailable {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Validation error: {message}")]
    Validation {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Image processing error: {message}")]
    ImageProcessing {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Serialization error: {message}")]
    Serialization {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Missing dependency: {0}")]
    MissingDependency(String),

    #[error("Lock poisoned: {0}")]
    LockPoisoned(String),
}

impl From<serde_json::Error> for VocabError {
    fn from(err: serde_json::Error) -> Self {
        VocabError::Serialization {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

macro_rules! error_constructor {
    ($name:ident, $variant:ident) => {
        pastey::paste! {
            #[doc = "Create a " $variant " error"]
            pub fn $name<S: Into<String>>(message: S) -> Self {
                Self::$variant {
                    message: message.into(),
                    source: None,
                }
            }

            #[doc = "Create a " $variant " error with source"]
            pub fn [<$name _with_source>]<S: Into<String>, E: std::error::Error + Send + Sync + 'static>(
                message: S,
                source: E,
            ) -> Self {
                Self::$variant {
                    message: message.into(),
                    source: Some(Box::new(source)),
                }
            }
        }
    };
}

impl VocabError {
    error_constructor!(ocr, Ocr);
    error_constructor!(engine_unavailable, EngineUnavailable);
    error_constructor!(validation, Validation);
    error_constructor!(image_processing, ImageProcessing);

    /// Whether this error makes the whole invocation impossible (no partial result).
    pub fn is_fatal(&self) -> bool {
        matches!(self, VocabError::EngineUnavailable { .. } | VocabError::MissingDependency(_))
    }
}
