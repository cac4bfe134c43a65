//! Language-aware cleanup and validation.
//!
//! Each supported [`Language`] maps to a [`LanguageRules`] implementation in the
//! [`registry`]. Latin-script languages share [`latin::LatinRules`] (with their own
//! stopword lists); Korean and Japanese use [`cjk::CjkRules`]. Extractors never
//! branch on the language code themselves; they resolve a [`PairRules`] once and
//! dispatch through it.
//!
//! # Example
//!
//! ```rust
//! use vocabscan::language::{LanguagePair, PairRules};
//!
//! # fn main() -> vocabscan::Result<()> {
//! let rules = PairRules::resolve(&LanguagePair::default())?;
//! assert_eq!(rules.term.normalize_term("abolish [əbɔlɪʃ] v."), "abolish");
//! assert_eq!(rules.meaning.normalize_meaning("폐 지 하다"), "폐지하다");
//! # Ok(())
//! # }
//! ```

pub mod cjk;
pub mod latin;
pub mod registry;
pub mod script;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::{Result, VocabError};

pub use registry::{LanguageRegistry, get_language_registry};
pub use script::Script;

const MAX_NORMALIZE_PASSES: usize = 4;

/// Characters used by table leaders; ignored when deciding what a text looks like.
pub const LEADER_CHARS: &[char] = &['.', '-', '·', '•', '_', '–', '—', '='];

/// Supported language codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    #[serde(rename = "EN", alias = "en")]
    En,
    #[serde(rename = "ES", alias = "es")]
    Es,
    #[serde(rename = "FR", alias = "fr")]
    Fr,
    #[serde(rename = "DE", alias = "de")]
    De,
    #[serde(rename = "KO", alias = "ko")]
    Ko,
    #[serde(rename = "JA", alias = "ja")]
    Ja,
}

impl Language {
    pub const ALL: [Language; 6] = [
        Language::En,
        Language::Es,
        Language::Fr,
        Language::De,
        Language::Ko,
        Language::Ja,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Language::En => "EN",
            Language::Es => "ES",
            Language::Fr => "FR",
            Language::De => "DE",
            Language::Ko => "KO",
            Language::Ja => "JA",
        }
    }

    /// Tesseract trained-model identifier for this language.
    pub fn tesseract_model(&self) -> &'static str {
        match self {
            Language::En => "eng",
            Language::Es => "spa",
            Language::Fr => "fra",
            Language::De => "deu",
            Language::Ko => "kor",
            Language::Ja => "jpn",
        }
    }

    pub fn script(&self) -> Script {
        match self {
            Language::En | Language::Es | Language::Fr | Language::De => Script::Latin,
            Language::Ko => Script::Hangul,
            Language::Ja => Script::Japanese,
        }
    }

    pub fn is_latin(&self) -> bool {
        self.script().is_latin()
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = VocabError;

    fn from_str(s: &str) -> Result<Self> {
        let code = s.trim().to_ascii_uppercase();
        Language::ALL
            .iter()
            .copied()
            .find(|l| l.code() == code)
            .ok_or_else(|| VocabError::validation(format!("Unsupported language code: '{}'", s)))
    }
}

/// Which language the term column is in, and which the meaning column is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguagePair {
    #[serde(default = "default_from")]
    pub from: Language,
    #[serde(default = "default_to")]
    pub to: Language,
}

fn default_from() -> Language {
    Language::En
}

fn default_to() -> Language {
    Language::Ko
}

impl Default for LanguagePair {
    fn default() -> Self {
        Self {
            from: default_from(),
            to: default_to(),
        }
    }
}

impl LanguagePair {
    pub fn new(from: Language, to: Language) -> Self {
        Self { from, to }
    }

    /// Neither side uses the Latin alphabet.
    pub fn both_non_latin(&self) -> bool {
        !self.from.is_latin() && !self.to.is_latin()
    }

    pub fn same_script(&self) -> bool {
        self.from.script() == self.to.script()
    }
}

impl fmt::Display for LanguagePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}→{}", self.from, self.to)
    }
}

/// Per-language cleanup and plausibility rules.
///
/// Implementations must be idempotent: normalizing already-normalized text
/// returns it unchanged.
pub trait LanguageRules: Send + Sync {
    fn language(&self) -> Language;

    fn script(&self) -> Script;

    /// Cheap pre-check on raw column text (leaders ignored).
    fn looks_like(&self, text: &str) -> bool;

    fn normalize_term(&self, text: &str) -> String;

    fn normalize_meaning(&self, text: &str) -> String;

    fn is_plausible_term(&self, text: &str) -> bool;

    fn is_plausible_meaning(&self, text: &str) -> bool;
}

/// Rules resolved for both sides of a [`LanguagePair`].
#[derive(Clone)]
pub struct PairRules {
    pub pair: LanguagePair,
    pub term: Arc<dyn LanguageRules>,
    pub meaning: Arc<dyn LanguageRules>,
}

impl fmt::Debug for PairRules {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PairRules").field("pair", &self.pair).finish()
    }
}

impl PairRules {
    /// Look both languages up in the global registry.
    pub fn resolve(pair: &LanguagePair) -> Result<Self> {
        let registry = get_language_registry();
        let registry = registry
            .read()
            .map_err(|e| VocabError::LockPoisoned(format!("Language registry lock poisoned: {}", e)))?;
        Ok(Self {
            pair: *pair,
            term: registry.get(pair.from)?,
            meaning: registry.get(pair.to)?,
        })
    }

    /// Normalize and validate one candidate; `None` if either side is rejected.
    pub fn normalize_pair(&self, term: &str, meaning: &str) -> Option<(String, String)> {
        let term = self.term.normalize_term(term);
        let meaning = self.meaning.normalize_meaning(meaning);
        if term.is_empty() || meaning.is_empty() {
            return None;
        }
        if !self.term.is_plausible_term(&term) || !self.meaning.is_plausible_meaning(&meaning) {
            return None;
        }
        Some((term, meaning))
    }
}

/// Whether `text` contains characters of `script` once leader runs are removed.
pub(crate) fn looks_like_script(text: &str, script: Script) -> bool {
    let stripped: String = text.chars().filter(|c| !LEADER_CHARS.contains(c)).collect();
    !stripped.trim().is_empty() && script.any(&stripped)
}

/// Apply a cleanup pass until it reaches a fixed point.
pub(crate) fn stabilize(text: &str, pass: impl Fn(&str) -> String) -> String {
    let mut current = pass(text);
    for _ in 0..MAX_NORMALIZE_PASSES {
        let next = pass(&current);
        if next == current {
            break;
        }
        current = next;
    }
    current
}
