//! Character-level script classification.
//!
//! Everything above this module reasons in terms of [`Script`] rather than raw
//! code point ranges.

use serde::{Deserialize, Serialize};

/// Writing system family used to pick cleanup and validation rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Script {
    Latin,
    Hangul,
    Japanese,
}

impl Script {
    /// Whether `ch` belongs to this script.
    pub fn contains(&self, ch: char) -> bool {
        match self {
            Script::Latin => is_latin_letter(ch),
            Script::Hangul => is_hangul(ch),
            Script::Japanese => is_japanese(ch),
        }
    }

    pub fn is_latin(&self) -> bool {
        matches!(self, Script::Latin)
    }

    /// Number of characters of this script in `text`.
    pub fn count(&self, text: &str) -> usize {
        text.chars().filter(|&c| self.contains(c)).count()
    }

    pub fn any(&self, text: &str) -> bool {
        text.chars().any(|c| self.contains(c))
    }

    /// Share of this script's characters among the non-whitespace characters of `text`.
    pub fn ratio(&self, text: &str) -> f64 {
        let total = text.chars().filter(|c| !c.is_whitespace()).count();
        if total == 0 {
            return 0.0;
        }
        self.count(text) as f64 / total as f64
    }
}

/// Accented Latin letters accepted alongside ASCII (Spanish, French, German).
pub const LATIN_ACCENTED: &str = "áéíóúüñàâäèêëîïôöùûçœæßÿÁÉÍÓÚÜÑÀÂÄÈÊËÎÏÔÖÙÛÇŒÆŸ";

pub fn is_latin_letter(ch: char) -> bool {
    ch.is_ascii_alphabetic() || LATIN_ACCENTED.contains(ch)
}

/// Precomposed Hangul syllables (`가`..=`힣`).
pub fn is_hangul(ch: char) -> bool {
    ('\u{AC00}'..='\u{D7A3}').contains(&ch)
}

/// Hiragana, katakana and CJK ideographs (including extension A).
pub fn is_japanese(ch: char) -> bool {
    matches!(ch,
        '\u{3040}'..='\u{30FF}'
        | '\u{3400}'..='\u{4DBF}'
        | '\u{4E00}'..='\u{9FFF}')
}

/// Hangul or Japanese; these count as "letters" in symbol-density checks.
pub fn is_cjk(ch: char) -> bool {
    is_hangul(ch) || is_japanese(ch)
}

/// Characters that count toward a line's symbol density: not alphanumeric,
/// not whitespace, not a CJK script character.
pub fn is_symbol(ch: char) -> bool {
    !ch.is_alphanumeric() && !ch.is_whitespace() && !is_cjk(ch)
}

/// Collapse all whitespace runs to a single space and trim.
pub fn normalize_spaces(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
