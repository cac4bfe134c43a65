use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::RecognizedToken;

/// Page Segmentation Mode for Tesseract OCR
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum PsmMode {
    OsdOnly = 0,
    AutoOsd = 1,
    AutoOnly = 2,
    Auto = 3,
    SingleColumn = 4,
    SingleBlockVertical = 5,
    SingleBlock = 6,
    SingleLine = 7,
    SingleWord = 8,
    CircleWord = 9,
    SingleChar = 10,
    SparseText = 11,
    SparseTextOsd = 12,
    RawLine = 13,
}

impl PsmMode {
    pub fn from_u8(value: u8) -> Result<Self, String> {
        match value {
            0 => Ok(PsmMode::OsdOnly),
            1 => Ok(PsmMode::AutoOsd),
            2 => Ok(PsmMode::AutoOnly),
            3 => Ok(PsmMode::Auto),
            4 => Ok(PsmMode::SingleColumn),
            5 => Ok(PsmMode::SingleBlockVertical),
            6 => Ok(PsmMode::SingleBlock),
            7 => Ok(PsmMode::SingleLine),
            8 => Ok(PsmMode::SingleWord),
            9 => Ok(PsmMode::CircleWord),
            10 => Ok(PsmMode::SingleChar),
            11 => Ok(PsmMode::SparseText),
            12 => Ok(PsmMode::SparseTextOsd),
            13 => Ok(PsmMode::RawLine),
            _ => Err(format!("Invalid PSM mode value: {}", value)),
        }
    }

    pub fn as_u8(&self) -> u8 {
        *self as u8
    }
}

impl TryFrom<u8> for PsmMode {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_u8(value)
    }
}

impl From<PsmMode> for u8 {
    fn from(mode: PsmMode) -> Self {
        mode.as_u8()
    }
}

impl fmt::Display for PsmMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u8())
    }
}

/// Parameters of one recognition call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognitionRequest {
    /// Engine model identifiers, e.g. `["eng", "kor"]`.
    pub languages: Vec<String>,
    pub psm: PsmMode,
}

impl RecognitionRequest {
    pub fn new(languages: Vec<String>, psm: PsmMode) -> Self {
        Self { languages, psm }
    }

    /// Tesseract `-l` argument (`eng+kor`).
    pub fn language_arg(&self) -> String {
        self.languages.join("+")
    }
}

/// Output of one recognition call: plain text plus positioned tokens.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Recognition {
    pub text: String,
    #[serde(default)]
    pub tokens: Vec<RecognizedToken>,
}

impl Recognition {
    pub fn new(text: impl Into<String>, tokens: Vec<RecognizedToken>) -> Self {
        Self {
            text: text.into(),
            tokens,
        }
    }

    /// Text-only recognition (no geometry available).
    pub fn text_only(text: impl Into<String>) -> Self {
        Self::new(text, Vec::new())
    }
}
