//! Latin-script cleanup (EN, ES, FR, DE).
//!
//! OCR of printed word lists leaves pronunciation guides (`[əbɔlɪʃ]`, `/ˈrʌn/`),
//! part-of-speech tags (`v.`, `adj.`, `phr`) and fragments of IPA transcription
//! (`rd`, `sf`, `dabl`) glued to the headword. The term side is cleaned
//! aggressively; the meaning side keeps its `/ , ;` delimiters so that several
//! meanings can later be merged.

use once_cell::sync::Lazy;
use regex::Regex;

use super::script::{Script, is_latin_letter, normalize_spaces};
use super::{Language, LanguageRules, looks_like_script, stabilize};

static BRACKET_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[[^\]]*\]|\{[^}]*\}").expect("Bracket block regex pattern is valid"));
static SLASH_BLOCK: Lazy<Regex> = Lazy::new(|| Regex::new(r"/[^/]*/").expect("Slash block regex pattern is valid"));
static IPA_SLASH_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/([^/\s]+)/").expect("IPA slash block regex pattern is valid"));
static PAREN_BLOCK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\([^)]*\)").expect("Paren block regex pattern is valid"));
static LEADING_INDEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*\(?\d+\)?[.)]?\s*").expect("Leading index regex pattern is valid"));
static DOTTED_POS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(?:n|v|a|adj|adv|prep|conj|pron|det|num|phr|ph|vt|vi|int|aux|v\.t|v\.i)\.(?:/(?:n|v|a|adj|adv|prep|conj|pron|det|num|phr|ph|vt|vi)\.)*$",
    )
    .expect("Dotted POS regex pattern is valid")
});
static BARE_POS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:n|v|adj|adv|prep|conj|pron|det|num|phr|ph|vt|vi)\.?$").expect("Bare POS regex pattern is valid")
});

/// POS abbreviations that are never real words and are dropped wherever they appear.
const UNAMBIGUOUS_POS: &[&str] = &["adj", "adv", "prep", "conj", "pron", "phr", "vt", "vi"];

/// POS abbreviations that are only dropped at the end of a multi-word term.
const TRAILING_POS: &[&str] = &["n", "v", "a", "det", "num", "ph"];

const DECORATIVE_GLYPHS: &[char] = &['*', '•', '·', '★', '☆', '※'];

/// Short words that look like IPA residue but are legitimate English.
const SHORT_WORD_WHITELIST: &[&str] = &[
    "a", "i", "an", "the", "to", "of", "in", "on", "at", "for", "and", "or", "but", "by", "off", "up", "out", "as",
    "is", "be", "do", "go", "no", "so", "we", "he", "she", "it", "us", "me", "my", "your", "our", "their", "down",
    "back", "over", "away", "with", "from", "into", "onto", "upon", "about", "him", "her", "them", "you", "not",
    "all", "any", "own", "way", "one",
];

/// Word endings that are ordinary English codas; a one-vowel token ending in any
/// other consonant pair is treated as transcription debris.
const COMMON_CODAS: &[&str] = &[
    "ck", "ng", "nd", "nt", "nk", "st", "sh", "ch", "th", "ll", "ss", "ff", "lk", "ld", "lt", "lf", "lm", "lp", "mp",
    "mb", "rk", "rm", "rn", "rt", "rd", "rb", "rp", "rs", "rl", "rf", "rg", "rc", "ct", "ft", "pt", "xt", "sk", "sp",
    "ns", "ms", "ts", "ds", "ks", "ps", "gs", "ls", "ws", "gh", "ph", "wn", "nc", "tz", "zz", "dd", "gg", "bb", "pp",
    "tt", "mn", "gn", "sm", "wl", "wd", "nz", "rv", "lv", "nx",
];

const VOWELS: &str = "aeiouyáéíóúàâäèêëîïôöùûüÿœæ";

fn is_vowel(ch: char) -> bool {
    VOWELS.contains(ch.to_ascii_lowercase())
}

fn normalize_quotes(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '‘' | '’' | '`' | '´' => '\'',
            '“' | '”' => '"',
            _ => c,
        })
        .collect()
}

fn is_leader_or_quote_token(token: &str) -> bool {
    token.chars().all(|c| c == '-' || c == '\'')
}

/// Lower-case unless every word is a 2-5 letter ALL-CAPS acronym, or the text is "I".
fn apply_case(text: &str) -> String {
    if text == "I" {
        return text.to_string();
    }
    let words: Vec<&str> = text
        .split(|c: char| c.is_whitespace() || matches!(c, '/' | ',' | ';'))
        .filter(|w| !w.is_empty())
        .collect();
    let all_acronyms = !words.is_empty()
        && words.iter().all(|w| {
            let n = w.chars().count();
            (2..=5).contains(&n) && w.chars().all(|c| c.is_ascii_uppercase())
        });
    if all_acronyms {
        text.to_string()
    } else {
        text.to_lowercase()
    }
}

/// Whether a trailing token looks like IPA/phonetic residue rather than a word.
pub fn is_junk_token(token: &str) -> bool {
    let lower = token.to_lowercase();
    if SHORT_WORD_WHITELIST.contains(&lower.as_str()) {
        return false;
    }
    let chars: Vec<char> = lower.chars().collect();
    let len = chars.len();
    if len <= 1 {
        return true;
    }
    let vowels = chars.iter().filter(|c| is_vowel(**c)).count();
    if vowels == 0 && len <= 4 {
        return true;
    }
    if vowels <= 1 && len <= 6 && chars.iter().all(|c| c.is_ascii_alphabetic()) {
        let tail: String = chars[len - 2..].iter().collect();
        let consonant_tail = chars[len - 2..].iter().all(|c| !is_vowel(*c));
        return consonant_tail && !COMMON_CODAS.contains(&tail.as_str());
    }
    false
}

fn strip_pos_tokens(tokens: &mut Vec<String>) {
    tokens.retain(|t| !UNAMBIGUOUS_POS.contains(&t.to_lowercase().as_str()));
    while tokens.len() > 1 {
        let last = tokens[tokens.len() - 1].to_lowercase();
        if TRAILING_POS.contains(&last.as_str()) {
            tokens.pop();
        } else {
            break;
        }
    }
}

fn strip_trailing_junk(tokens: &mut Vec<String>) {
    while tokens.len() > 1 && tokens.last().is_some_and(|t| is_junk_token(t)) {
        tokens.pop();
    }
}

fn trim_edges(text: &str, extra: &[char]) -> String {
    text.trim_matches(|c: char| c.is_whitespace() || c == '-' || c == '\'' || extra.contains(&c))
        .to_string()
}

/// One cleanup pass over a Latin-script term.
fn clean_term_once(text: &str) -> String {
    let mut s = normalize_quotes(text);
    s = BRACKET_BLOCK.replace_all(&s, " ").into_owned();
    s = SLASH_BLOCK.replace_all(&s, " ").into_owned();
    s = PAREN_BLOCK.replace_all(&s, " ").into_owned();
    s = LEADING_INDEX.replace(&s, "").into_owned();
    s = s.replace(DECORATIVE_GLYPHS, " ");

    let s: String = s
        .split_whitespace()
        .filter(|t| !DOTTED_POS.is_match(t))
        .collect::<Vec<_>>()
        .join(" ");

    let filtered: String = s
        .chars()
        .map(|c| if is_latin_letter(c) || c == '\'' || c == '-' { c } else { ' ' })
        .collect();

    let mut tokens: Vec<String> = filtered
        .split_whitespace()
        .filter(|t| !is_leader_or_quote_token(t))
        .map(str::to_string)
        .collect();
    strip_pos_tokens(&mut tokens);

    let cased = apply_case(&trim_edges(&tokens.join(" "), &[]));
    let mut tokens: Vec<String> = cased.split_whitespace().map(str::to_string).collect();
    strip_trailing_junk(&mut tokens);
    trim_edges(&tokens.join(" "), &[])
}

/// One cleanup pass over a Latin-script meaning. Delimiters survive.
fn clean_meaning_once(text: &str) -> String {
    let mut s = normalize_quotes(text);
    s = BRACKET_BLOCK.replace_all(&s, " ").into_owned();
    s = IPA_SLASH_BLOCK
        .replace_all(&s, |caps: &regex::Captures<'_>| {
            let inner = &caps[1];
            if inner.chars().all(is_latin_letter) {
                caps[0].to_string()
            } else {
                " ".to_string()
            }
        })
        .into_owned();
    s = PAREN_BLOCK.replace_all(&s, " ").into_owned();
    s = LEADING_INDEX.replace(&s, "").into_owned();
    s = s.replace(DECORATIVE_GLYPHS, " ");

    let mut tokens: Vec<&str> = s.split_whitespace().filter(|t| !DOTTED_POS.is_match(t)).collect();
    if tokens.len() > 1 && BARE_POS.is_match(tokens[0]) {
        tokens.remove(0);
    }

    let filtered: String = tokens
        .join(" ")
        .chars()
        .map(|c| {
            if is_latin_letter(c) || matches!(c, '\'' | '-' | '/' | ',' | ';') {
                c
            } else {
                ' '
            }
        })
        .collect();

    let collapsed = normalize_spaces(&filtered);
    apply_case(&trim_edges(&collapsed, &['/', ',', ';']))
}

/// Latin-family rules, parameterized by the language's stopword list.
#[derive(Debug, Clone)]
pub struct LatinRules {
    language: Language,
    stopwords: &'static [&'static str],
}

impl LatinRules {
    pub fn new(language: Language, stopwords: &'static [&'static str]) -> Self {
        Self { language, stopwords }
    }

    pub fn english() -> Self {
        Self::new(
            Language::En,
            &["the", "a", "an", "of", "to", "in", "on", "at", "for", "and", "or", "but", "is", "are", "be"],
        )
    }

    pub fn spanish() -> Self {
        Self::new(
            Language::Es,
            &["el", "la", "los", "las", "de", "del", "y", "o", "un", "una", "en", "que"],
        )
    }

    pub fn french() -> Self {
        Self::new(
            Language::Fr,
            &["le", "la", "les", "de", "des", "du", "et", "ou", "un", "une", "en", "que"],
        )
    }

    pub fn german() -> Self {
        Self::new(
            Language::De,
            &["der", "die", "das", "und", "oder", "ein", "eine", "zu", "von", "mit"],
        )
    }
}

impl LanguageRules for LatinRules {
    fn language(&self) -> Language {
        self.language
    }

    fn script(&self) -> Script {
        Script::Latin
    }

    fn looks_like(&self, text: &str) -> bool {
        looks_like_script(text, Script::Latin)
    }

    fn normalize_term(&self, text: &str) -> String {
        stabilize(text, clean_term_once)
    }

    fn normalize_meaning(&self, text: &str) -> String {
        stabilize(text, clean_meaning_once)
    }

    fn is_plausible_term(&self, text: &str) -> bool {
        let t = text.trim();
        let len = t.chars().count();
        if len == 0 || len > 60 {
            return false;
        }
        if len == 1 && !matches!(t, "a" | "I" | "i") {
            return false;
        }
        let letters = Script::Latin.count(t);
        if (letters as f64) / (len as f64) < 0.6 {
            return false;
        }
        if BARE_POS.is_match(t) {
            return false;
        }
        if t.matches('-').count() >= 4 {
            return false;
        }
        let lower = t.to_lowercase();
        !self.stopwords.contains(&lower.as_str())
    }

    fn is_plausible_meaning(&self, text: &str) -> bool {
        let t = text.trim();
        let len = t.chars().count();
        if len == 0 || len > 140 {
            return false;
        }
        Script::Latin.any(t) && Script::Latin.ratio(t) >= 0.5
    }
}
