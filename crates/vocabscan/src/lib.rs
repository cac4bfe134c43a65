//! vocabscan - bilingual vocabulary extraction from OCR output
//!
//! vocabscan turns a photographed or scanned word list into structured
//! `(term, meaning)` pairs. It runs an OCR engine, reconstructs two-column
//! tables from token geometry, falls back to line-based parsing of the raw
//! text, normalizes both sides per language, and re-runs recognition on page
//! bands when the result looks incomplete.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use vocabscan::{Pipeline, VocabConfig};
//! use vocabscan::ocr::TesseractCliEngine;
//!
//! # #[tokio::main]
//! # async fn main() -> vocabscan::Result<()> {
//! let config = VocabConfig::default();
//! let engine = Arc::new(TesseractCliEngine::new(&config.ocr));
//! let result = Pipeline::new(engine, config).run(&std::fs::read("page.jpg")?).await?;
//! println!("{} items via {}", result.items.len(), result.diagnostics.extractor);
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! - **Core Module** (`core`): configuration loading and validation
//! - **OCR** (`ocr`): the engine trait, Tesseract CLI backend, TSV parsing, band cropping
//! - **Layout** (`layout`): row grouping and column split estimation
//! - **Extract** (`extract`): table extractor, line parser, merge/dedup
//! - **Language** (`language`): per-language normalization and plausibility rules
//! - **Pipeline** (`pipeline`): coverage estimation and the escalation state machine

#![deny(unsafe_code)]

pub mod core;
pub mod error;
pub mod extract;
pub mod language;
pub mod layout;
pub mod ocr;
pub mod pipeline;
pub mod types;

pub use error::{Result, VocabError};

pub use types::{
    BoundingBox, CoverageEstimate, Diagnostics, ExtractorPath, PipelineResult, QualityFlags, RecognizedToken,
    VocabCandidate, VocabEntry,
};

pub use core::config::VocabConfig;
pub use language::{Language, LanguagePair, LanguageRules, PairRules};
pub use ocr::{OcrEngine, Recognition, RecognitionRequest};
pub use pipeline::{CancellationFlag, Pipeline, ProgressCallback, extract_from_recognition};
