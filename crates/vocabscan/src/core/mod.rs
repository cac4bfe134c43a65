//! Core configuration.
//!
//! # Example
//!
//! ```rust,no_run
//! use vocabscan::core::config::VocabConfig;
//!
//! # fn example() -> vocabscan::Result<()> {
//! let config = VocabConfig::discover()?.unwrap_or_default();
//! config.validate()?;
//! println!("{}", config.languages);
//! # Ok(())
//! # }
//! ```

pub mod config;

pub use config::{Band, EscalationConfig, LayoutConfig, LineParserConfig, OcrSettings, VocabConfig};
