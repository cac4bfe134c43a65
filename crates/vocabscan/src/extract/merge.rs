//! Candidate canonicalization and deduplication.
//!
//! Entries are keyed by their case-folded, whitespace-collapsed term. A later
//! candidate for an existing key never replaces the entry; its meaning is split
//! into sub-parts and only sub-parts not already present (case-insensitively)
//! are appended, joined with [`MEANING_JOIN`].

use ahash::{AHashMap, AHashSet};

use crate::language::PairRules;
use crate::language::script::normalize_spaces;
use crate::types::{VocabCandidate, VocabEntry};

/// Canonical delimiter between distinct meanings of one entry.
pub const MEANING_JOIN: &str = " / ";

/// Delimiters a raw meaning is split on before union.
pub const MEANING_DELIMITERS: &[char] = &['/', ',', ';', '·', '='];

const OUTER_PUNCT: &str = "\"'“”‘’`~!@#$%^&*(){}[]<>+=|\\/:;,.?-";

/// Dedup key: case-folded term with internal whitespace collapsed.
pub fn dedup_key(term: &str) -> String {
    normalize_spaces(term).to_lowercase()
}

/// Trim whitespace and ASCII-ish punctuation from both ends.
pub fn strip_outer_punct(text: &str) -> &str {
    text.trim_matches(|c: char| c.is_whitespace() || OUTER_PUNCT.contains(c))
}

/// Incremental merge of candidates into deduplicated entries, in first-seen order.
#[derive(Debug, Clone)]
pub struct VocabMerger {
    rules: PairRules,
    index: AHashMap<String, usize>,
    entries: Vec<VocabEntry>,
    seen_parts: Vec<AHashSet<String>>,
}

impl VocabMerger {
    pub fn new(rules: PairRules) -> Self {
        Self {
            rules,
            index: AHashMap::new(),
            entries: Vec::new(),
            seen_parts: Vec::new(),
        }
    }

    fn canonical_term(&self, raw: &str) -> String {
        let term = &self.rules.term;
        term.normalize_term(strip_outer_punct(&term.normalize_term(raw)))
    }

    fn canonical_meaning(&self, raw: &str) -> String {
        let meaning = &self.rules.meaning;
        meaning.normalize_meaning(strip_outer_punct(&meaning.normalize_meaning(raw)))
    }

    fn meaning_parts(&self, meaning: &str) -> Vec<String> {
        meaning
            .split(MEANING_DELIMITERS)
            .map(|part| self.rules.meaning.normalize_meaning(strip_outer_punct(part)))
            .filter(|part| !part.is_empty())
            .collect()
    }

    /// Add one candidate. Returns `true` if it created or extended an entry.
    pub fn push(&mut self, candidate: &VocabCandidate) -> bool {
        let term = self.canonical_term(&candidate.term);
        let meaning = self.canonical_meaning(&candidate.meaning);
        if term.is_empty() || meaning.is_empty() {
            return false;
        }
        if !self.rules.term.is_plausible_term(&term) || !self.rules.meaning.is_plausible_meaning(&meaning) {
            return false;
        }

        let parts = self.meaning_parts(&meaning);
        if parts.is_empty() {
            return false;
        }

        let key = dedup_key(&term);
        let slot = match self.index.get(&key) {
            Some(&slot) => slot,
            None => {
                self.entries.push(VocabEntry {
                    term,
                    meaning: String::new(),
                });
                self.seen_parts.push(AHashSet::new());
                self.index.insert(key, self.entries.len() - 1);
                self.entries.len() - 1
            }
        };

        let seen = &mut self.seen_parts[slot];
        let entry = &mut self.entries[slot];
        let mut changed = false;
        for part in parts {
            if seen.insert(part.to_lowercase()) {
                if !entry.meaning.is_empty() {
                    entry.meaning.push_str(MEANING_JOIN);
                }
                entry.meaning.push_str(&part);
                changed = true;
            }
        }
        changed
    }

    pub fn extend<'a>(&mut self, candidates: impl IntoIterator<Item = &'a VocabCandidate>) {
        for candidate in candidates {
            self.push(candidate);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[VocabEntry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<VocabEntry> {
        self.entries
    }
}

/// Merge a batch of candidates in one go.
pub fn merge_candidates<'a>(
    candidates: impl IntoIterator<Item = &'a VocabCandidate>,
    rules: &PairRules,
) -> Vec<VocabEntry> {
    let mut merger = VocabMerger::new(rules.clone());
    merger.extend(candidates);
    merger.into_entries()
}
