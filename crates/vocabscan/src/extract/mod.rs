//! Candidate extraction and merging.
//!
//! - [`table`] reads two-column tables from positioned tokens.
//! - [`lines`] parses plain text when geometry is missing or unreliable.
//! - [`merge`] canonicalizes and deduplicates everything both produce.

pub mod lines;
pub mod merge;
pub mod table;

pub use lines::{LineParse, parse_lines};
pub use merge::{VocabMerger, dedup_key, merge_candidates};
pub use table::extract_table;
