//! Shared data types: token geometry, candidates, entries and pipeline results.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::Result;

/// Axis-aligned box in image pixel coordinates (`x0,y0` top-left, `x1,y1` bottom-right).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl BoundingBox {
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Build a box from Tesseract-style `left/top/width/height`.
    pub fn from_ltwh(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self::new(left, top, left + width, top + height)
    }

    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }

    pub fn x_center(&self) -> f64 {
        (self.x0 + self.x1) / 2.0
    }

    pub fn y_center(&self) -> f64 {
        (self.y0 + self.y1) / 2.0
    }

    /// Zero or negative area, or non-finite coordinates.
    pub fn is_degenerate(&self) -> bool {
        let finite = [self.x0, self.y0, self.x1, self.y1].iter().all(|v| v.is_finite());
        !finite || self.width() <= 0.0 || self.height() <= 0.0
    }
}

/// One recognized word/symbol as returned by the OCR engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecognizedToken {
    pub text: String,
    #[serde(rename = "boundingBox", alias = "bbox")]
    pub bbox: BoundingBox,
}

impl RecognizedToken {
    pub fn new(text: impl Into<String>, bbox: BoundingBox) -> Self {
        Self {
            text: text.into(),
            bbox,
        }
    }
}

/// Raw, pre-validation term/meaning pair emitted by an extractor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VocabCandidate {
    pub term: String,
    pub meaning: String,
}

impl VocabCandidate {
    pub fn new(term: impl Into<String>, meaning: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            meaning: meaning.into(),
        }
    }
}

/// Final, validated and deduplicated vocabulary entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VocabEntry {
    pub term: String,
    pub meaning: String,
}

impl fmt::Display for VocabEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\t{}", self.term, self.meaning)
    }
}

/// Expected vs. extracted entry counts for one or more recognition passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageEstimate {
    pub expected_count: usize,
    pub extracted_count: usize,
}

/// Which extraction path produced the final list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExtractorPath {
    #[serde(rename = "none")]
    None,
    #[serde(rename = "table")]
    Table,
    #[serde(rename = "text")]
    Text,
    #[serde(rename = "table+text")]
    TableText,
    #[serde(rename = "text+psm11")]
    TextPsmRetry,
    #[serde(rename = "text+split2")]
    TextSplit2,
    #[serde(rename = "text+split3")]
    TextSplit3,
}

impl ExtractorPath {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtractorPath::None => "none",
            ExtractorPath::Table => "table",
            ExtractorPath::Text => "text",
            ExtractorPath::TableText => "table+text",
            ExtractorPath::TextPsmRetry => "text+psm11",
            ExtractorPath::TextSplit2 => "text+split2",
            ExtractorPath::TextSplit3 => "text+split3",
        }
    }
}

impl fmt::Display for ExtractorPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Heuristic quality warnings for the caller's review screen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityFlags {
    pub source_script_chars: usize,
    pub target_script_chars: usize,
    pub cleaned_line_count: usize,
    pub suspect_low_count: bool,
    pub suspect_no_source: bool,
    pub suspect_no_target: bool,
    pub suspect_pairing: bool,
}

/// Diagnostic record attached to every pipeline result. Advisory only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostics {
    pub extractor: ExtractorPath,
    pub token_count: usize,
    pub text_len: usize,
    pub item_count: usize,
    pub expected_hint: usize,
    pub recognition_passes: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub languages: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub ocr_failed: bool,
    pub cancelled: bool,
    #[serde(default)]
    pub quality: QualityFlags,
}

impl Diagnostics {
    /// Diagnostics for an invocation where no recognition call ever succeeded.
    pub fn failed(note: impl Into<String>) -> Self {
        Self {
            extractor: ExtractorPath::None,
            token_count: 0,
            text_len: 0,
            item_count: 0,
            expected_hint: 0,
            recognition_passes: 0,
            languages: None,
            note: Some(note.into()),
            ocr_failed: true,
            cancelled: false,
            quality: QualityFlags::default(),
        }
    }
}

/// Output of one pipeline invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineResult {
    pub items: Vec<VocabEntry>,
    pub diagnostics: Diagnostics,
    /// Raw OCR text of every recognition pass performed, newline-joined.
    pub raw_text: String,
}

impl PipelineResult {
    pub fn empty_failure(note: impl Into<String>) -> Self {
        Self {
            items: Vec::new(),
            diagnostics: Diagnostics::failed(note),
            raw_text: String::new(),
        }
    }

    /// Pretty-printed JSON of the whole result, diagnostics included.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
