//! Geometry-based layout inference for two-column word tables.
//!
//! Tokens are clustered into rows ([`rows::group_rows`]) and a single vertical
//! boundary between the term and meaning columns is estimated
//! ([`columns::estimate_split`]).

pub mod columns;
pub mod rows;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::language::script::normalize_spaces;
use crate::types::{BoundingBox, RecognizedToken};

pub use columns::estimate_split;
pub use rows::{Row, group_rows};

static COMPACT_LEADER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[.\-·•_–—=]{3,}$").expect("Compact leader regex pattern is valid"));
static SPACED_LEADER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:[.\-·•_–—=]\s*){6,}$").expect("Spaced leader regex pattern is valid"));

/// Whether `text` is a table leader: a run of dots/dashes with no content,
/// e.g. `......`, `-----`, `— — —`, `. . . . . .`.
pub fn is_leader(text: &str) -> bool {
    let s = normalize_spaces(text);
    if s.is_empty() {
        return false;
    }
    let compact: String = s.chars().filter(|c| !c.is_whitespace()).collect();
    COMPACT_LEADER.is_match(&compact) || SPACED_LEADER.is_match(&s)
}

/// A recognized token with its derived geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutToken {
    pub text: String,
    pub bbox: BoundingBox,
    pub x_center: f64,
    pub y_center: f64,
    pub is_leader: bool,
}

impl LayoutToken {
    /// `None` for tokens that cannot take part in layout (empty text, degenerate box).
    pub fn from_recognized(token: &RecognizedToken) -> Option<Self> {
        let text = token.text.trim();
        if text.is_empty() || token.bbox.is_degenerate() {
            return None;
        }
        Some(Self {
            text: text.to_string(),
            bbox: token.bbox,
            x_center: token.bbox.x_center(),
            y_center: token.bbox.y_center(),
            is_leader: is_leader(text),
        })
    }

    pub fn height(&self) -> f64 {
        self.bbox.height().max(1.0)
    }

    /// Contains at least one letter of any script.
    pub fn has_letters(&self) -> bool {
        self.text.chars().any(char::is_alphabetic)
    }
}

/// Join token texts with single spaces, skipping leaders.
pub fn render_text<'a>(tokens: impl IntoIterator<Item = &'a LayoutToken>) -> String {
    let joined = tokens
        .into_iter()
        .filter(|t| !t.is_leader)
        .map(|t| t.text.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    normalize_spaces(&joined)
}

pub(crate) fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        Some(sorted[mid])
    } else {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leader_detection() {
        assert!(is_leader("......"));
        assert!(is_leader("-----"));
        assert!(is_leader("···"));
        assert!(is_leader("— — —"));
        assert!(is_leader(". . . . . ."));
        assert!(!is_leader(".."));
        assert!(!is_leader("a..."));
        assert!(!is_leader("1."));
        assert!(!is_leader(""));
    }

    #[test]
    fn test_layout_token_filters_degenerate() {
        let good = RecognizedToken::new("apple", BoundingBox::new(0.0, 0.0, 50.0, 20.0));
        let flat = RecognizedToken::new("apple", BoundingBox::new(0.0, 10.0, 50.0, 10.0));
        let blank = RecognizedToken::new("  ", BoundingBox::new(0.0, 0.0, 50.0, 20.0));
        assert!(LayoutToken::from_recognized(&good).is_some());
        assert!(LayoutToken::from_recognized(&flat).is_none());
        assert!(LayoutToken::from_recognized(&blank).is_none());
    }

    #[test]
    fn test_render_text_skips_leaders() {
        let tokens: Vec<LayoutToken> = ["apple", ".....", "pie"]
            .iter()
            .enumerate()
            .filter_map(|(i, t)| {
                let x = i as f64 * 60.0;
                LayoutToken::from_recognized(&RecognizedToken::new(*t, BoundingBox::new(x, 0.0, x + 50.0, 20.0)))
            })
            .collect();
        assert_eq!(render_text(&tokens), "apple pie");
    }

    #[test]
    fn test_median() {
        assert_eq!(median(&[]), None);
        assert_eq!(median(&[3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(&[4.0, 1.0, 2.0, 3.0]), Some(2.5));
    }
}
