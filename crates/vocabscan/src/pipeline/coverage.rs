//! Coverage estimation, escalation guards and quality flags.

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

use crate::core::config::EscalationConfig;
use crate::language::LanguagePair;
use crate::types::{CoverageEstimate, QualityFlags};

static NUMBERED_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\(?\d{1,3}\)?[.)\-]?\s+").expect("Numbered line regex pattern is valid"));

const LOW_COUNT_ITEMS: usize = 5;
const MIN_SOURCE_SCRIPT_CHARS: usize = 30;
const MIN_TARGET_SCRIPT_CHARS: usize = 10;
const PAIRING_MIN_LINES: usize = 12;
const PAIRING_MIN_ITEMS: usize = 2;
const PAIRING_RATIO: f64 = 0.2;

/// How many dictionary entries the page probably has: the number of lines
/// starting with an index such as `12. `, `(3) ` or `7) `.
pub fn estimate_expected_count(raw_text: &str) -> usize {
    raw_text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| NUMBERED_LINE.is_match(line))
        .count()
}

pub fn coverage(raw_text: &str, extracted_count: usize) -> CoverageEstimate {
    CoverageEstimate {
        expected_count: estimate_expected_count(raw_text),
        extracted_count,
    }
}

/// Which guard asked for escalation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscalationReason {
    MissingLikely,
    VeryFew,
    TextHeavy,
}

impl fmt::Display for EscalationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EscalationReason::MissingLikely => "missing-likely",
            EscalationReason::VeryFew => "very-few",
            EscalationReason::TextHeavy => "text-heavy",
        })
    }
}

fn scaled(count: usize, ratio: f64) -> usize {
    (count as f64 * ratio).floor() as usize
}

fn below_ratio(extracted: usize, expected: usize, ratio: f64) -> bool {
    (extracted as f64) < expected as f64 * ratio
}

/// Short lists (`1..=short_list_max` numbered lines) are never escalated.
pub fn is_short_list(estimate: CoverageEstimate, config: &EscalationConfig) -> bool {
    estimate.expected_count > 0 && estimate.expected_count <= config.short_list_max
}

/// Evaluate the escalation guards in order; `None` means the result is accepted as is.
pub fn escalation_reason(
    raw_text: &str,
    estimate: CoverageEstimate,
    config: &EscalationConfig,
) -> Option<EscalationReason> {
    if is_short_list(estimate, config) {
        return None;
    }

    let CoverageEstimate {
        expected_count: expected,
        extracted_count: extracted,
    } = estimate;

    if expected >= config.missing_min_expected
        && (extracted < config.missing_floor || below_ratio(extracted, expected, config.missing_ratio))
    {
        return Some(EscalationReason::MissingLikely);
    }

    if extracted < config.very_few_items && expected >= config.very_few_min_expected {
        return Some(EscalationReason::VeryFew);
    }

    let non_empty_lines = raw_text.lines().filter(|l| !l.trim().is_empty()).count();
    if expected == 0
        && raw_text.chars().count() >= config.text_heavy_min_chars
        && non_empty_lines >= config.text_heavy_min_lines
        && extracted <= config.text_heavy_max_items
    {
        return Some(EscalationReason::TextHeavy);
    }

    None
}

/// Whether the quick sparse-text retry is worth one more recognition call.
pub fn wants_psm_retry(raw_text: &str, extracted: usize, config: &EscalationConfig) -> bool {
    raw_text.chars().count() >= config.psm_retry_min_chars && extracted <= config.psm_retry_max_items
}

/// Whether the result after the two-band pass still misses enough entries for three bands.
pub fn wants_split3(estimate: CoverageEstimate, config: &EscalationConfig) -> bool {
    estimate.expected_count >= config.split3_min_expected
        && below_ratio(estimate.extracted_count, estimate.expected_count, config.split3_ratio)
}

/// Advisory quality warnings for a finished extraction.
pub fn quality_flags(
    pair: &LanguagePair,
    raw_text: &str,
    cleaned_line_count: usize,
    item_count: usize,
) -> QualityFlags {
    let source_script_chars = pair.from.script().count(raw_text);
    let target_script_chars = pair.to.script().count(raw_text);
    let pairing_limit = PAIRING_MIN_ITEMS.max(scaled(cleaned_line_count, PAIRING_RATIO));

    QualityFlags {
        source_script_chars,
        target_script_chars,
        cleaned_line_count,
        suspect_low_count: item_count < LOW_COUNT_ITEMS,
        suspect_no_source: source_script_chars < MIN_SOURCE_SCRIPT_CHARS,
        suspect_no_target: target_script_chars < MIN_TARGET_SCRIPT_CHARS,
        suspect_pairing: cleaned_line_count >= PAIRING_MIN_LINES && item_count <= pairing_limit,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered(n: usize) -> String {
        (1..=n).map(|i| format!("{}. word{} 뜻", i, i)).collect::<Vec<_>>().join("\n")
    }

    fn estimate(expected: usize, extracted: usize) -> CoverageEstimate {
        CoverageEstimate {
            expected_count: expected,
            extracted_count: extracted,
        }
    }

    #[test]
    fn test_expected_count_patterns() {
        let text = "12. apple 사과\n(3) brave 용감한\n7) calm\n4- dull\n  5 eager\nUnit 3\n2024년\n\n100.5 pages";
        assert_eq!(estimate_expected_count(text), 5);
        assert_eq!(estimate_expected_count(""), 0);
        assert_eq!(estimate_expected_count(&numbered(20)), 20);
    }

    #[test]
    fn test_short_list_never_escalates() {
        let config = EscalationConfig::default();
        for expected in 1..=6 {
            assert_eq!(escalation_reason(&numbered(expected), estimate(expected, 0), &config), None);
        }
    }

    #[test]
    fn test_missing_likely_guard() {
        let config = EscalationConfig::default();
        let text = numbered(20);
        assert_eq!(
            escalation_reason(&text, estimate(20, 6), &config),
            Some(EscalationReason::MissingLikely)
        );
        assert_eq!(escalation_reason(&text, estimate(20, 11), &config), None);
        // max(6, floor(10 * 0.55)) = 6
        assert_eq!(
            escalation_reason(&numbered(10), estimate(10, 5), &config),
            Some(EscalationReason::MissingLikely)
        );
        assert_eq!(escalation_reason(&numbered(10), estimate(10, 6), &config), None);
    }

    #[test]
    fn test_ratio_guards_compare_unrounded_products() {
        let config = EscalationConfig::default();
        // 21 * 0.55 = 11.55
        assert_eq!(
            escalation_reason(&numbered(21), estimate(21, 11), &config),
            Some(EscalationReason::MissingLikely)
        );
        assert_eq!(escalation_reason(&numbered(21), estimate(21, 12), &config), None);

        // 21 * 0.65 = 13.65
        assert!(wants_split3(estimate(21, 13), &config));
        assert!(!wants_split3(estimate(21, 14), &config));
    }

    #[test]
    fn test_very_few_guard() {
        let mut config = EscalationConfig::default();
        config.missing_min_expected = 100;
        assert_eq!(
            escalation_reason(&numbered(12), estimate(12, 7), &config),
            Some(EscalationReason::VeryFew)
        );
        assert_eq!(escalation_reason(&numbered(12), estimate(12, 8), &config), None);
    }

    #[test]
    fn test_text_heavy_guard() {
        let config = EscalationConfig::default();
        let text = (0..15)
            .map(|_| "some long running prose line that is not a vocabulary entry at all")
            .collect::<Vec<_>>()
            .join("\n");
        assert_eq!(
            escalation_reason(&text, estimate(0, 2), &config),
            Some(EscalationReason::TextHeavy)
        );
        assert_eq!(escalation_reason(&text, estimate(0, 4), &config), None);
        assert_eq!(escalation_reason("short\ntext", estimate(0, 0), &config), None);
    }

    #[test]
    fn test_psm_retry_and_split3_gates() {
        let config = EscalationConfig::default();
        let long = "x".repeat(220);
        assert!(wants_psm_retry(&long, 7, &config));
        assert!(!wants_psm_retry(&long, 8, &config));
        assert!(!wants_psm_retry("short", 0, &config));

        // floor(20 * 0.65) = 13
        assert!(wants_split3(estimate(20, 12), &config));
        assert!(!wants_split3(estimate(20, 13), &config));
        assert!(!wants_split3(estimate(13, 0), &config));
    }

    #[test]
    fn test_quality_flags() {
        let pair = LanguagePair::default();
        let flags = quality_flags(&pair, "apple 사과", 12, 2);
        assert_eq!(flags.source_script_chars, 5);
        assert_eq!(flags.target_script_chars, 2);
        assert!(flags.suspect_low_count);
        assert!(flags.suspect_no_source);
        assert!(flags.suspect_no_target);
        assert!(flags.suspect_pairing);

        let flags = quality_flags(&pair, "apple 사과", 12, 3);
        assert!(!flags.suspect_pairing);
    }
}
