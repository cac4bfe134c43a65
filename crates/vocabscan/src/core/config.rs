//! Configuration loading and management.
//!
//! Every heuristic threshold used by layout inference, line parsing and the
//! escalation controller lives here as a named, overridable value. The defaults
//! were tuned against Tesseract output of photographed word lists.

use crate::language::LanguagePair;
use crate::ocr::types::PsmMode;
use crate::{Result, VocabError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main pipeline configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VocabConfig {
    /// Term and meaning languages.
    #[serde(default)]
    pub languages: LanguagePair,

    #[serde(default)]
    pub layout: LayoutConfig,

    #[serde(default)]
    pub parser: LineParserConfig,

    #[serde(default)]
    pub escalation: EscalationConfig,

    #[serde(default)]
    pub ocr: OcrSettings,
}

/// Row grouping and column split tunables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Lower bound of the row clustering tolerance, in pixels.
    #[serde(default = "default_row_tolerance_min")]
    pub row_tolerance_min: f64,

    /// Row tolerance as a fraction of the median token height.
    #[serde(default = "default_row_tolerance_ratio")]
    pub row_tolerance_ratio: f64,

    /// Median height assumed when no token height is available.
    #[serde(default = "default_fallback_token_height")]
    pub fallback_token_height: f64,

    /// Gap midpoints must lie within this fraction of the horizontal range of the median.
    #[serde(default = "default_gap_window_ratio")]
    pub gap_window_ratio: f64,

    /// Gaps narrower than this fraction of the range are not trusted.
    #[serde(default = "default_min_gap_ratio")]
    pub min_gap_ratio: f64,

    #[serde(default = "default_kmeans_max_iterations")]
    pub kmeans_max_iterations: usize,

    /// Below this many x-centers k-means is skipped and the median is used.
    #[serde(default = "default_kmeans_min_points")]
    pub kmeans_min_points: usize,

    #[serde(default = "default_kmeans_epsilon")]
    pub kmeans_epsilon: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            row_tolerance_min: default_row_tolerance_min(),
            row_tolerance_ratio: default_row_tolerance_ratio(),
            fallback_token_height: default_fallback_token_height(),
            gap_window_ratio: default_gap_window_ratio(),
            min_gap_ratio: default_min_gap_ratio(),
            kmeans_max_iterations: default_kmeans_max_iterations(),
            kmeans_min_points: default_kmeans_min_points(),
            kmeans_epsilon: default_kmeans_epsilon(),
        }
    }
}

/// Plain-text line parser tunables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineParserConfig {
    /// How many lines ahead a term line may look for its meaning line.
    #[serde(default = "default_pair_window")]
    pub pair_window: usize,

    #[serde(default = "default_short_line_len")]
    pub short_line_len: usize,

    #[serde(default = "default_max_symbol_chars_short")]
    pub max_symbol_chars_short: usize,

    #[serde(default = "default_medium_line_len")]
    pub medium_line_len: usize,

    #[serde(default = "default_max_symbol_chars_medium")]
    pub max_symbol_chars_medium: usize,

    /// Latin lines at least this long with sentence punctuation are example sentences.
    #[serde(default = "default_latin_sentence_len")]
    pub latin_sentence_len: usize,

    /// Lines containing non-Latin script at least this long are example sentences.
    #[serde(default = "default_non_latin_sentence_len")]
    pub non_latin_sentence_len: usize,

    /// Tightened limit used when neither side of the pair is Latin-script.
    #[serde(default = "default_non_latin_pair_sentence_len")]
    pub non_latin_pair_sentence_len: usize,
}

impl Default for LineParserConfig {
    fn default() -> Self {
        Self {
            pair_window: default_pair_window(),
            short_line_len: default_short_line_len(),
            max_symbol_chars_short: default_max_symbol_chars_short(),
            medium_line_len: default_medium_line_len(),
            max_symbol_chars_medium: default_max_symbol_chars_medium(),
            latin_sentence_len: default_latin_sentence_len(),
            non_latin_sentence_len: default_non_latin_sentence_len(),
            non_latin_pair_sentence_len: default_non_latin_pair_sentence_len(),
        }
    }
}

/// A horizontal band of the page, as fractions of the image height.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Band {
    pub top: f64,
    pub bottom: f64,
}

impl Band {
    pub const fn new(top: f64, bottom: f64) -> Self {
        Self { top, bottom }
    }
}

/// Coverage estimation and escalation tunables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EscalationConfig {
    /// Table extractor yield at which the table result may be accepted alone.
    #[serde(default = "default_min_table_yield")]
    pub min_table_yield: usize,

    /// Items the line parser must add on top of the table result to be worth keeping.
    #[serde(default = "default_min_text_gain")]
    pub min_text_gain: usize,

    /// Expected counts in `1..=short_list_max` never escalate.
    #[serde(default = "default_short_list_max")]
    pub short_list_max: usize,

    #[serde(default = "default_missing_min_expected")]
    pub missing_min_expected: usize,

    #[serde(default = "default_missing_ratio")]
    pub missing_ratio: f64,

    #[serde(default = "default_missing_floor")]
    pub missing_floor: usize,

    #[serde(default = "default_very_few_items")]
    pub very_few_items: usize,

    #[serde(default = "default_very_few_min_expected")]
    pub very_few_min_expected: usize,

    #[serde(default = "default_text_heavy_min_chars")]
    pub text_heavy_min_chars: usize,

    #[serde(default = "default_text_heavy_min_lines")]
    pub text_heavy_min_lines: usize,

    #[serde(default = "default_text_heavy_max_items")]
    pub text_heavy_max_items: usize,

    #[serde(default = "default_psm_retry_min_chars")]
    pub psm_retry_min_chars: usize,

    #[serde(default = "default_psm_retry_max_items")]
    pub psm_retry_max_items: usize,

    /// Growth from the sparse-text retry that ends escalation.
    #[serde(default = "default_psm_retry_min_gain")]
    pub psm_retry_min_gain: usize,

    #[serde(default = "default_split3_min_expected")]
    pub split3_min_expected: usize,

    #[serde(default = "default_split3_ratio")]
    pub split3_ratio: f64,

    #[serde(default = "default_split2_bands")]
    pub split2_bands: Vec<Band>,

    #[serde(default = "default_split3_bands")]
    pub split3_bands: Vec<Band>,
}

impl Default for EscalationConfig {
    fn default() -> Self {
        Self {
            min_table_yield: default_min_table_yield(),
            min_text_gain: default_min_text_gain(),
            short_list_max: default_short_list_max(),
            missing_min_expected: default_missing_min_expected(),
            missing_ratio: default_missing_ratio(),
            missing_floor: default_missing_floor(),
            very_few_items: default_very_few_items(),
            very_few_min_expected: default_very_few_min_expected(),
            text_heavy_min_chars: default_text_heavy_min_chars(),
            text_heavy_min_lines: default_text_heavy_min_lines(),
            text_heavy_max_items: default_text_heavy_max_items(),
            psm_retry_min_chars: default_psm_retry_min_chars(),
            psm_retry_max_items: default_psm_retry_max_items(),
            psm_retry_min_gain: default_psm_retry_min_gain(),
            split3_min_expected: default_split3_min_expected(),
            split3_ratio: default_split3_ratio(),
            split2_bands: default_split2_bands(),
            split3_bands: default_split3_bands(),
        }
    }
}

/// Recognition settings passed to the OCR engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrSettings {
    /// Segmentation mode of the first pass and of crop passes.
    #[serde(default = "default_psm")]
    pub default_psm: PsmMode,

    /// Segmentation mode of the quick sparse-layout retry.
    #[serde(default = "default_retry_psm")]
    pub retry_psm: PsmMode,

    /// Words below this confidence are dropped when parsing TSV output.
    #[serde(default)]
    pub min_confidence: f64,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for OcrSettings {
    fn default() -> Self {
        Self {
            default_psm: default_psm(),
            retry_psm: default_retry_psm(),
            min_confidence: 0.0,
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_row_tolerance_min() -> f64 {
    8.0
}
fn default_row_tolerance_ratio() -> f64 {
    0.6
}
fn default_fallback_token_height() -> f64 {
    16.0
}
fn default_gap_window_ratio() -> f64 {
    0.25
}
fn default_min_gap_ratio() -> f64 {
    0.08
}
fn default_kmeans_max_iterations() -> usize {
    10
}
fn default_kmeans_min_points() -> usize {
    6
}
fn default_kmeans_epsilon() -> f64 {
    0.001
}

fn default_pair_window() -> usize {
    3
}
fn default_short_line_len() -> usize {
    20
}
fn default_max_symbol_chars_short() -> usize {
    6
}
fn default_medium_line_len() -> usize {
    35
}
fn default_max_symbol_chars_medium() -> usize {
    10
}
fn default_latin_sentence_len() -> usize {
    55
}
fn default_non_latin_sentence_len() -> usize {
    45
}
fn default_non_latin_pair_sentence_len() -> usize {
    30
}

fn default_min_table_yield() -> usize {
    5
}
fn default_min_text_gain() -> usize {
    2
}
fn default_short_list_max() -> usize {
    6
}
fn default_missing_min_expected() -> usize {
    10
}
fn default_missing_ratio() -> f64 {
    0.55
}
fn default_missing_floor() -> usize {
    6
}
fn default_very_few_items() -> usize {
    8
}
fn default_very_few_min_expected() -> usize {
    12
}
fn default_text_heavy_min_chars() -> usize {
    400
}
fn default_text_heavy_min_lines() -> usize {
    12
}
fn default_text_heavy_max_items() -> usize {
    3
}
fn default_psm_retry_min_chars() -> usize {
    220
}
fn default_psm_retry_max_items() -> usize {
    7
}
fn default_psm_retry_min_gain() -> usize {
    4
}
fn default_split3_min_expected() -> usize {
    14
}
fn default_split3_ratio() -> f64 {
    0.65
}
fn default_split2_bands() -> Vec<Band> {
    vec![Band::new(0.0, 0.52), Band::new(0.48, 1.0)]
}
fn default_split3_bands() -> Vec<Band> {
    vec![Band::new(0.0, 0.36), Band::new(0.32, 0.68), Band::new(0.64, 1.0)]
}

fn default_psm() -> PsmMode {
    PsmMode::SingleBlock
}
fn default_retry_psm() -> PsmMode {
    PsmMode::SparseText
}
fn default_timeout_secs() -> u64 {
    120
}

fn check_ratio(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 && value <= 1.0 {
        Ok(())
    } else {
        Err(VocabError::validation(format!("{} must be in (0, 1], got {}", name, value)))
    }
}

fn check_positive(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(VocabError::validation(format!("{} must be positive, got {}", name, value)))
    }
}

fn check_bands(name: &str, bands: &[Band]) -> Result<()> {
    if bands.is_empty() {
        return Err(VocabError::validation(format!("{} must not be empty", name)));
    }
    for band in bands {
        let in_range = (0.0..=1.0).contains(&band.top) && (0.0..=1.0).contains(&band.bottom);
        if !in_range || band.top >= band.bottom {
            return Err(VocabError::validation(format!(
                "{} contains an invalid band [{}, {}]",
                name, band.top, band.bottom
            )));
        }
    }
    Ok(())
}

impl VocabConfig {
    /// Reject out-of-range ratios and malformed crop bands.
    pub fn validate(&self) -> Result<()> {
        let layout = &self.layout;
        check_positive("layout.row_tolerance_min", layout.row_tolerance_min)?;
        check_positive("layout.fallback_token_height", layout.fallback_token_height)?;
        check_ratio("layout.row_tolerance_ratio", layout.row_tolerance_ratio)?;
        check_ratio("layout.gap_window_ratio", layout.gap_window_ratio)?;
        check_ratio("layout.min_gap_ratio", layout.min_gap_ratio)?;

        if self.parser.pair_window == 0 {
            return Err(VocabError::validation("parser.pair_window must be at least 1"));
        }

        let escalation = &self.escalation;
        check_ratio("escalation.missing_ratio", escalation.missing_ratio)?;
        check_ratio("escalation.split3_ratio", escalation.split3_ratio)?;
        check_bands("escalation.split2_bands", &escalation.split2_bands)?;
        check_bands("escalation.split3_bands", &escalation.split3_bands)?;

        if self.ocr.timeout_secs == 0 {
            return Err(VocabError::validation("ocr.timeout_secs must be at least 1"));
        }
        Ok(())
    }

    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            VocabError::validation(format!("Failed to read config file {}: {}", path.as_ref().display(), e))
        })?;

        toml::from_str(&content)
            .map_err(|e| VocabError::validation(format!("Invalid TOML in {}: {}", path.as_ref().display(), e)))
    }

    /// Load configuration from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            VocabError::validation(format!("Failed to read config file {}: {}", path.as_ref().display(), e))
        })?;

        serde_yaml_ng::from_str(&content)
            .map_err(|e| VocabError::validation(format!("Invalid YAML in {}: {}", path.as_ref().display(), e)))
    }

    /// Load configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            VocabError::validation(format!("Failed to read config file {}: {}", path.as_ref().display(), e))
        })?;

        serde_json::from_str(&content)
            .map_err(|e| VocabError::validation(format!("Invalid JSON in {}: {}", path.as_ref().display(), e)))
    }

    /// Load configuration, picking the format from the file extension (TOML by default).
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        match path.extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase).as_deref() {
            Some("yaml") | Some("yml") => Self::from_yaml_file(path),
            Some("json") => Self::from_json_file(path),
            _ => Self::from_toml_file(path),
        }
    }

    /// Discover configuration file in parent directories.
    ///
    /// Searches for `vocabscan.toml` in current directory and parent directories.
    ///
    /// # Returns
    ///
    /// - `Some(config)` if found
    /// - `None` if no config file found
    pub fn discover() -> Result<Option<Self>> {
        let mut current = std::env::current_dir().map_err(VocabError::Io)?;

        loop {
            let vocabscan_toml = current.join("vocabscan.toml");
            if vocabscan_toml.exists() {
                return Ok(Some(Self::from_toml_file(vocabscan_toml)?));
            }

            if let Some(parent) = current.parent() {
                current = parent.to_path_buf();
            } else {
                break;
            }
        }

        Ok(None)
    }
}
