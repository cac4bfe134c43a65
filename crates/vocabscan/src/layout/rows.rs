//! Row grouping by vertical-center proximity.

use super::{LayoutToken, median};
use crate::core::config::LayoutConfig;
use crate::types::RecognizedToken;

/// Tokens sharing a vertical band, sorted left to right.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub tokens: Vec<LayoutToken>,
    /// Running average of the member tokens' vertical centers.
    pub y_center: f64,
}

impl Row {
    fn start(token: LayoutToken) -> Self {
        Self {
            y_center: token.y_center,
            tokens: vec![token],
        }
    }

    fn push(&mut self, token: LayoutToken) {
        let n = self.tokens.len() as f64;
        self.y_center = (self.y_center * n + token.y_center) / (n + 1.0);
        self.tokens.push(token);
    }
}

/// Clustering tolerance: `max(row_tolerance_min, row_tolerance_ratio × median height)`.
pub fn row_tolerance(tokens: &[LayoutToken], config: &LayoutConfig) -> f64 {
    let heights: Vec<f64> = tokens.iter().map(LayoutToken::height).collect();
    let median_height = median(&heights).unwrap_or(config.fallback_token_height);
    config.row_tolerance_min.max(median_height * config.row_tolerance_ratio)
}

/// Cluster tokens into rows, top to bottom.
///
/// Tokens with empty text or a degenerate box are dropped first. Zero usable
/// tokens yield zero rows.
pub fn group_rows(tokens: &[RecognizedToken], config: &LayoutConfig) -> Vec<Row> {
    let mut items: Vec<LayoutToken> = tokens.iter().filter_map(LayoutToken::from_recognized).collect();
    if items.is_empty() {
        return Vec::new();
    }

    items.sort_by(|a, b| {
        a.y_center
            .total_cmp(&b.y_center)
            .then_with(|| a.x_center.total_cmp(&b.x_center))
    });
    let tolerance = row_tolerance(&items, config);

    let mut rows: Vec<Row> = Vec::new();
    for item in items {
        match rows.last_mut() {
            Some(row) if (item.y_center - row.y_center).abs() <= tolerance => row.push(item),
            _ => rows.push(Row::start(item)),
        }
    }

    for row in &mut rows {
        row.tokens.sort_by(|a, b| a.x_center.total_cmp(&b.x_center));
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BoundingBox;

    fn token(text: &str, x: f64, y: f64) -> RecognizedToken {
        RecognizedToken::new(text, BoundingBox::new(x, y, x + 40.0, y + 20.0))
    }

    fn texts(row: &Row) -> Vec<&str> {
        row.tokens.iter().map(|t| t.text.as_str()).collect()
    }

    #[test]
    fn test_empty_input() {
        assert!(group_rows(&[], &LayoutConfig::default()).is_empty());
    }

    #[test]
    fn test_groups_by_vertical_center() {
        let tokens = vec![
            token("사과", 300.0, 12.0),
            token("apple", 20.0, 10.0),
            token("banana", 20.0, 60.0),
            token("바나나", 300.0, 58.0),
        ];
        let rows = group_rows(&tokens, &LayoutConfig::default());
        assert_eq!(rows.len(), 2);
        assert_eq!(texts(&rows[0]), vec!["apple", "사과"]);
        assert_eq!(texts(&rows[1]), vec!["banana", "바나나"]);
        assert!(rows[0].y_center < rows[1].y_center);
    }

    #[test]
    fn test_drops_degenerate_and_blank_tokens() {
        let tokens = vec![
            token("apple", 20.0, 10.0),
            RecognizedToken::new("ghost", BoundingBox::new(50.0, 10.0, 50.0, 30.0)),
            token("   ", 90.0, 10.0),
        ];
        let rows = group_rows(&tokens, &LayoutConfig::default());
        assert_eq!(rows.len(), 1);
        assert_eq!(texts(&rows[0]), vec!["apple"]);
    }

    #[test]
    fn test_running_average_center() {
        let tokens = vec![token("a", 0.0, 0.0), token("b", 50.0, 6.0), token("c", 100.0, 12.0)];
        let rows = group_rows(&tokens, &LayoutConfig::default());
        assert_eq!(rows.len(), 1);
        assert!((rows[0].y_center - 16.0).abs() < 1e-9);
    }

    #[test]
    fn test_tolerance_floor() {
        let items: Vec<LayoutToken> = [token("a", 0.0, 0.0)]
            .iter()
            .filter_map(LayoutToken::from_recognized)
            .collect();
        assert!((row_tolerance(&items, &LayoutConfig::default()) - 12.0).abs() < 1e-9);
        assert!((row_tolerance(&[], &LayoutConfig::default()) - 9.6).abs() < 1e-9);

        let tiny: Vec<LayoutToken> = [RecognizedToken::new("a", BoundingBox::new(0.0, 0.0, 5.0, 5.0))]
            .iter()
            .filter_map(LayoutToken::from_recognized)
            .collect();
        assert_eq!(row_tolerance(&tiny, &LayoutConfig::default()), 8.0);
    }
}
