//! Two-column table extraction from positioned tokens.

use crate::core::config::LayoutConfig;
use crate::extract::merge::VocabMerger;
use crate::language::PairRules;
use crate::layout::{LayoutToken, estimate_split, group_rows, render_text};
use crate::types::{RecognizedToken, VocabCandidate};

/// Split every row at the estimated column boundary and keep rows whose left
/// side reads as the term language and whose right side reads as the meaning
/// language. Output is normalized and deduplicated by term key.
pub fn extract_table(tokens: &[RecognizedToken], rules: &PairRules, config: &LayoutConfig) -> Vec<VocabCandidate> {
    let rows = group_rows(tokens, config);
    if rows.is_empty() {
        return Vec::new();
    }

    let split = estimate_split(&rows, config);
    let mut merger = VocabMerger::new(rules.clone());

    for row in &rows {
        let (left, right): (Vec<&LayoutToken>, Vec<&LayoutToken>) =
            row.tokens.iter().partition(|t| t.x_center < split);
        let left_text = render_text(left);
        let right_text = render_text(right);
        if left_text.is_empty() && right_text.is_empty() {
            continue;
        }
        if !rules.term.looks_like(&left_text) || !rules.meaning.looks_like(&right_text) {
            continue;
        }
        if let Some((term, meaning)) = rules.normalize_pair(&left_text, &right_text) {
            merger.push(&VocabCandidate::new(term, meaning));
        }
    }

    tracing::debug!(rows = rows.len(), split, items = merger.len(), "Table extraction finished");

    merger
        .into_entries()
        .into_iter()
        .map(|e| VocabCandidate::new(e.term, e.meaning))
        .collect()
}
