//! Geometry-independent fallback: parse term/meaning pairs from plain OCR text.
//!
//! 1. Clean every line and drop page markers, symbol noise and example sentences.
//! 2. Split single lines on a strong separator, or at the first meaning-script
//!    character when the meaning language is non-Latin.
//! 3. Pair a lone term line with the first meaning line found within a small
//!    window below it.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::core::config::LineParserConfig;
use crate::language::PairRules;
use crate::language::script::{Script, is_cjk, is_symbol, normalize_spaces};
use crate::types::VocabCandidate;

static LEADING_INDEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\(?\d+\)?[.)]\s*").expect("Leading index regex pattern is valid"));
static LEADING_CIRCLED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\u{2460}-\u{2473}]\s*").expect("Circled number regex pattern is valid"));
static LEADING_HANGUL_ENUM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[가-힣]\)\s*").expect("Hangul enumerator regex pattern is valid"));
static PAGE_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:\d+|p\.?\s*\d+|\d+\s*/\s*\d+|(?:unit|lesson|day|chapter)\s*\d+.*)$")
        .expect("Page marker regex pattern is valid")
});
static EXAMPLE_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(?:예문|ex\)|e\.g\.|예:|例)").expect("Example prefix regex pattern is valid"));
static SENTENCE_PUNCT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[.!?]").expect("Sentence punctuation regex pattern is valid"));
static ASIDE_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\([^)]*\)|\[[^\]]*\]").expect("Aside block regex pattern is valid"));

/// Strong separators in priority order.
const SEPARATORS: &[&str] = &["→", "⇒", "=>", "->", "=", ":", " - ", " – ", " — ", "|"];

/// Result of parsing one block of OCR text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineParse {
    pub candidates: Vec<VocabCandidate>,
    /// Lines that survived cleaning, in order.
    pub cleaned_lines: Vec<String>,
}

/// Remove zero-width/control characters, normalize quotes and whitespace, and
/// drop a leading dash or bullet.
pub fn clean_line(raw: &str) -> String {
    let replaced: String = raw
        .chars()
        .map(|c| match c {
            '\u{200B}'..='\u{200D}' | '\u{FEFF}' | '\u{2060}' | '•' => ' ',
            '“' | '”' => '"',
            '‘' | '’' => '\'',
            c if c.is_control() => ' ',
            c => c,
        })
        .collect();
    normalize_spaces(&replaced)
        .trim_start_matches(|c: char| c.is_whitespace() || matches!(c, '-' | '–' | '—' | '•' | '·'))
        .to_string()
}

/// Strip `12.`, `(3)`, `①` or `가)` from the start of a line.
pub fn strip_leading_index(line: &str) -> String {
    let s = LEADING_INDEX.replace(line.trim(), "");
    let s = LEADING_CIRCLED.replace(&s, "");
    let s = LEADING_HANGUL_ENUM.replace(&s, "");
    s.trim().to_string()
}

/// Page numbers and unit/lesson/day/chapter headings.
pub fn is_page_marker(line: &str) -> bool {
    PAGE_MARKER.is_match(line.trim())
}

fn is_symbol_dense(line: &str, config: &LineParserConfig) -> bool {
    let len = line.chars().count();
    let symbols = line.chars().filter(|&c| is_symbol(c)).count();
    if symbols >= config.max_symbol_chars_short && len <= config.short_line_len {
        return true;
    }
    let heavy = line
        .chars()
        .filter(|&c| is_symbol(c) && !matches!(c, '\'' | '"' | '-'))
        .count();
    heavy >= config.max_symbol_chars_medium && len <= config.medium_line_len
}

/// Full example sentences are not vocabulary entries.
pub fn is_example_sentence(line: &str, rules: &PairRules, config: &LineParserConfig) -> bool {
    let s = line.trim();
    if s.is_empty() {
        return false;
    }
    if EXAMPLE_PREFIX.is_match(s) {
        return true;
    }

    let len = s.chars().count();
    if s.chars().any(is_cjk) {
        let limit = if rules.pair.both_non_latin() {
            config.non_latin_pair_sentence_len
        } else {
            config.non_latin_sentence_len
        };
        if len >= limit {
            return true;
        }
    }
    Script::Latin.any(s) && len >= config.latin_sentence_len && SENTENCE_PUNCT.is_match(s) && s.contains(' ')
}

fn strip_asides(text: &str) -> String {
    normalize_spaces(&ASIDE_BLOCK.replace_all(text, " "))
}

fn accept(rules: &PairRules, left: &str, right: &str) -> Option<VocabCandidate> {
    let (term, meaning) = rules.normalize_pair(&strip_asides(left), &strip_asides(right))?;
    Some(VocabCandidate::new(term, meaning))
}

/// Try to read a whole entry from one line.
pub fn split_line(line: &str, rules: &PairRules) -> Option<VocabCandidate> {
    if !rules.term.looks_like(line) || !rules.meaning.looks_like(line) {
        return None;
    }

    for &sep in SEPARATORS {
        if let Some((left, right)) = line.split_once(sep) {
            let (left, right) = (left.trim(), right.trim());
            if left.is_empty() || right.is_empty() {
                continue;
            }
            if let Some(candidate) = accept(rules, left, right) {
                return Some(candidate);
            }
        }
    }

    let target = rules.meaning.script();
    if target.is_latin() || target == rules.term.script() {
        return None;
    }
    let idx = line.char_indices().find(|(_, c)| target.contains(*c)).map(|(i, _)| i)?;
    if idx == 0 {
        return None;
    }
    accept(rules, &line[..idx], &line[idx..])
}

/// Clean lines and drop everything that cannot be part of an entry.
pub fn clean_lines(text: &str, rules: &PairRules, config: &LineParserConfig) -> Vec<String> {
    text.lines()
        .map(|raw| strip_leading_index(&clean_line(raw)))
        .filter(|s| !s.is_empty())
        .filter(|s| !is_page_marker(s))
        .filter(|s| !is_symbol_dense(s, config))
        .filter(|s| !is_example_sentence(s, rules, config))
        .collect()
}

/// Parse plain OCR text into candidates (not yet deduplicated).
pub fn parse_lines(text: &str, rules: &PairRules, config: &LineParserConfig) -> LineParse {
    let cleaned = clean_lines(text, rules, config);
    let mut used = vec![false; cleaned.len()];
    let mut candidates = Vec::new();

    for (i, line) in cleaned.iter().enumerate() {
        if let Some(candidate) = split_line(line, rules) {
            candidates.push(candidate);
            used[i] = true;
        }
    }

    let same_script = rules.pair.same_script();
    let meaning_script = rules.meaning.script();
    for i in 0..cleaned.len() {
        if used[i] {
            continue;
        }
        let line = &cleaned[i];
        if !same_script && meaning_script.any(line) {
            continue;
        }
        let term = rules.term.normalize_term(&strip_asides(line));
        if term.is_empty() || !rules.term.is_plausible_term(&term) {
            continue;
        }

        let mut hops = 0;
        let mut j = i + 1;
        while j < cleaned.len() && hops < config.pair_window {
            if used[j] {
                j += 1;
                continue;
            }
            hops += 1;
            let next = &cleaned[j];
            if same_script || meaning_script.any(next) {
                let meaning = rules.meaning.normalize_meaning(&strip_asides(next));
                if !meaning.is_empty() && rules.meaning.is_plausible_meaning(&meaning) {
                    candidates.push(VocabCandidate::new(term, meaning));
                    used[i] = true;
                    used[j] = true;
                    break;
                }
            }
            j += 1;
        }
    }

    tracing::debug!(
        lines = cleaned.len(),
        candidates = candidates.len(),
        "Line parsing finished"
    );

    LineParse {
        candidates,
        cleaned_lines: cleaned,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::{Language, LanguagePair};

    fn en_ko() -> PairRules {
        PairRules::resolve(&LanguagePair::default()).unwrap()
    }

    fn parse(text: &str) -> Vec<VocabCandidate> {
        parse_lines(text, &en_ko(), &LineParserConfig::default()).candidates
    }

    #[test]
    fn test_clean_line() {
        assert_eq!(clean_line("\u{200B}  – apple\t사과 "), "apple 사과");
        assert_eq!(clean_line("“quote”"), "\"quote\"");
    }

    #[test]
    fn test_strip_leading_index() {
        assert_eq!(strip_leading_index("12. apple"), "apple");
        assert_eq!(strip_leading_index("(3) apple"), "apple");
        assert_eq!(strip_leading_index("① apple"), "apple");
        assert_eq!(strip_leading_index("가) 사과"), "사과");
        assert_eq!(strip_leading_index("apple"), "apple");
    }

    #[test]
    fn test_page_markers() {
        for line in ["12", "p. 12", "P12", "3 / 10", "Unit 3", "Lesson 1", "Day 2 review", "CHAPTER 4"] {
            assert!(is_page_marker(line), "{line:?} should be a page marker");
        }
        assert!(!is_page_marker("apple 사과"));
        assert!(!is_page_marker("daytime 낮"));
    }

    #[test]
    fn test_example_sentences() {
        let rules = en_ko();
        let config = LineParserConfig::default();
        assert!(is_example_sentence("예문: 나는 사과를 좋아한다", &rules, &config));
        assert!(is_example_sentence("e.g. I like apples", &rules, &config));
        assert!(is_example_sentence(
            "The government decided to abolish the old law after many years of debate.",
            &rules,
            &config
        ));
        assert!(!is_example_sentence("abolish 폐지하다", &rules, &config));
    }

    #[test]
    fn test_korean_example_sentence_is_not_a_meaning() {
        let sentence = "그는 위험한 상황에서도 끝까지 침착했다고 친구들이 모두 입을 모아 말했었다고 한다 정말로";
        assert_eq!(sentence.chars().count(), 49);
        assert!(parse(&format!("brave\n{sentence}")).is_empty());

        let short = "그는 끝까지 침착했다";
        assert!(!is_example_sentence(short, &en_ko(), &LineParserConfig::default()));
    }

    #[test]
    fn test_scenario_pronunciation_and_split_syllables() {
        let items = parse("abolish [əbɔlɪʃ] v. 폐 지 하다");
        assert_eq!(items, vec![VocabCandidate::new("abolish", "폐지하다")]);
    }

    #[test]
    fn test_separators() {
        let items = parse("apple = 사과\nbanana : 바나나\ncherry → 체리\ngrape | 포도\nlemon - 레몬");
        let terms: Vec<&str> = items.iter().map(|c| c.term.as_str()).collect();
        assert_eq!(terms, vec!["apple", "banana", "cherry", "grape", "lemon"]);
        assert_eq!(items[2].meaning, "체리");
    }

    #[test]
    fn test_windowed_pairing() {
        let items = parse("1. apple\n2. banana\n사과\n바나나");
        assert_eq!(
            items,
            vec![VocabCandidate::new("apple", "사과"), VocabCandidate::new("banana", "바나나")]
        );
    }

    #[test]
    fn test_pairing_window_limit() {
        let items = parse("apple\nbanana\ncherry\ngrape\n사과");
        assert_eq!(items, vec![VocabCandidate::new("banana", "사과")]);
    }

    #[test]
    fn test_noise_is_rejected() {
        let out = parse_lines(
            "Unit 3\n12\n*** ### @@@\n예문: 그는 매일 아침 달린다\nrun 달리다",
            &en_ko(),
            &LineParserConfig::default(),
        );
        assert_eq!(out.cleaned_lines, vec!["run 달리다".to_string()]);
        assert_eq!(out.candidates, vec![VocabCandidate::new("run", "달리다")]);
    }

    #[test]
    fn test_same_script_pair_uses_separators_and_pairing() {
        let rules = PairRules::resolve(&LanguagePair::new(Language::En, Language::Es)).unwrap();
        let out = parse_lines("apple = manzana\nwater\nagua", &rules, &LineParserConfig::default());
        assert_eq!(
            out.candidates,
            vec![VocabCandidate::new("apple", "manzana"), VocabCandidate::new("water", "agua")]
        );
    }

    #[test]
    fn test_japanese_to_korean() {
        let rules = PairRules::resolve(&LanguagePair::new(Language::Ja, Language::Ko)).unwrap();
        let out = parse_lines("りんご 사과\n水 = 물", &rules, &LineParserConfig::default());
        assert_eq!(
            out.candidates,
            vec![VocabCandidate::new("りんご", "사과"), VocabCandidate::new("水", "물")]
        );
    }
}
