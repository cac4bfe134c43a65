//! Hangul and Japanese cleanup.
//!
//! Non-Latin text is preserved far more conservatively than Latin text: only
//! pronunciation blocks, numbering, decorative glyphs, table leaders and a short
//! run of Latin debris in front of the first script character are removed.
//! OCR frequently splits words into syllables (`폐 지 하다`), so short
//! script-only tokens are merged back together.

use once_cell::sync::Lazy;
use regex::Regex;

use super::script::{Script, normalize_spaces};
use super::{Language, LanguageRules, looks_like_script, stabilize};

static BRACKET_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[[^\]]*\]").expect("Bracket block regex pattern is valid"));
static SLASH_BLOCK: Lazy<Regex> = Lazy::new(|| Regex::new(r"/([^/]*)/").expect("Slash block regex pattern is valid"));
static LEADING_NUMBERING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\s•·\-–—~]*\(?\d+\)?[.)]\s*").expect("Leading numbering regex pattern is valid"));
static LEADING_BULLETS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\s•·\-–—~○●◦]+").expect("Leading bullets regex pattern is valid"));
static LEADING_CIRCLED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\u{2460}-\u{2473}]\s*").expect("Circled number regex pattern is valid"));
static LEADING_LEADERS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:[.\-·•_–—=]{3,}\s*)+").expect("Leading leaders regex pattern is valid"));
static TRAILING_LEADERS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:\s*[.\-·•_–—=]{3,})+$").expect("Trailing leaders regex pattern is valid"));
static LATIN_DEBRIS_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:[A-Za-z]{1,6}\.?[:=]?|[:=])$").expect("Latin debris regex pattern is valid"));

const DECORATIVE_GLYPHS: &[char] = &['*', '•', '★', '☆', '※'];

const MAX_DEBRIS_TOKENS: usize = 2;
const MAX_SYLLABLE_TOKEN: usize = 2;
const MAX_MERGED_LEN: usize = 10;
const MAX_MERGE_RUN: usize = 6;

/// Merge runs of short script-only tokens that OCR split apart.
///
/// A run needs at least two tokens of at most two characters each; merging stops
/// once the word would exceed ten characters or six tokens.
pub fn fix_syllable_spacing(text: &str, script: Script) -> String {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    let is_short = |t: &str| {
        let n = t.chars().count();
        n > 0 && n <= MAX_SYLLABLE_TOKEN && t.chars().all(|c| script.contains(c))
    };

    let mut out: Vec<String> = Vec::with_capacity(tokens.len());
    let mut i = 0;
    while i < tokens.len() {
        if !is_short(tokens[i]) {
            out.push(tokens[i].to_string());
            i += 1;
            continue;
        }

        let mut merged = tokens[i].to_string();
        let mut run = 1;
        let mut j = i;
        while j + 1 < tokens.len() && is_short(tokens[j + 1]) {
            if merged.chars().count() + tokens[j + 1].chars().count() > MAX_MERGED_LEN {
                break;
            }
            merged.push_str(tokens[j + 1]);
            j += 1;
            run += 1;
            if run >= MAX_MERGE_RUN {
                break;
            }
        }
        out.push(merged);
        i = j + 1;
    }
    out.join(" ")
}

/// Drop one or two leading Latin fragments (`dabl`, `obj:`, `v.`) sitting right
/// before the first script character. Longer Latin prefixes are left alone.
fn strip_leading_debris(text: &str, script: Script) -> String {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    let debris = tokens.iter().take_while(|t| LATIN_DEBRIS_TOKEN.is_match(t)).count();
    if debris == 0 || debris > MAX_DEBRIS_TOKENS {
        return text.to_string();
    }
    match tokens.get(debris) {
        Some(next) if next.chars().next().is_some_and(|c| script.contains(c)) => tokens[debris..].join(" "),
        _ => text.to_string(),
    }
}

fn strip_prefixes(text: &str) -> String {
    let mut s = text.to_string();
    loop {
        let before = s.len();
        s = LEADING_LEADERS.replace(&s, "").into_owned();
        s = LEADING_CIRCLED.replace(&s, "").into_owned();
        s = LEADING_NUMBERING.replace(&s, "").into_owned();
        s = LEADING_BULLETS.replace(&s, "").into_owned();
        if s.len() == before {
            return s;
        }
    }
}

fn clean_once(text: &str, script: Script) -> String {
    let mut s = BRACKET_BLOCK.replace_all(text, " ").into_owned();
    s = SLASH_BLOCK
        .replace_all(&s, |caps: &regex::Captures<'_>| {
            let inner = &caps[1];
            if script.any(inner) || inner.chars().any(char::is_whitespace) {
                caps[0].to_string()
            } else {
                " ".to_string()
            }
        })
        .into_owned();
    s = s.replace(DECORATIVE_GLYPHS, " ");
    s = strip_prefixes(&s);
    s = TRAILING_LEADERS.replace(&s, "").into_owned();
    let s = strip_leading_debris(&normalize_spaces(&s), script);
    fix_syllable_spacing(&s, script)
}

/// Rules for a syllabic or logographic script.
#[derive(Debug, Clone)]
pub struct CjkRules {
    language: Language,
    script: Script,
    min_meaning_chars: usize,
}

impl CjkRules {
    pub fn new(language: Language, script: Script, min_meaning_chars: usize) -> Self {
        Self {
            language,
            script,
            min_meaning_chars,
        }
    }

    pub fn korean() -> Self {
        Self::new(Language::Ko, Script::Hangul, 1)
    }

    pub fn japanese() -> Self {
        Self::new(Language::Ja, Script::Japanese, 1)
    }
}

impl LanguageRules for CjkRules {
    fn language(&self) -> Language {
        self.language
    }

    fn script(&self) -> Script {
        self.script
    }

    fn looks_like(&self, text: &str) -> bool {
        looks_like_script(text, self.script)
    }

    fn normalize_term(&self, text: &str) -> String {
        let script = self.script;
        stabilize(text, |s| clean_once(s, script))
    }

    fn normalize_meaning(&self, text: &str) -> String {
        let script = self.script;
        stabilize(text, |s| clean_once(s, script))
    }

    fn is_plausible_term(&self, text: &str) -> bool {
        let t = text.trim();
        let len = t.chars().count();
        (1..=40).contains(&len) && self.script.ratio(t) >= 0.5
    }

    fn is_plausible_meaning(&self, text: &str) -> bool {
        let t = text.trim();
        let len = t.chars().count();
        if len == 0 || len > 60 {
            return false;
        }
        self.script.count(t) >= self.min_meaning_chars && self.script.ratio(t) >= 0.25
    }
}
