//! Tesseract TSV output parsing.

use super::types::Recognition;
use crate::types::{BoundingBox, RecognizedToken};

/// TSV row level of a single word.
pub const TSV_WORD_LEVEL: u32 = 5;

/// Number of columns in a well-formed TSV row.
pub const TSV_MIN_FIELDS: usize = 12;

/// Parse Tesseract TSV into positioned tokens plus reconstructed plain text.
///
/// Words are grouped into text lines by their `(page, block, paragraph, line)`
/// numbers, in output order. Words below `min_confidence` and rows that are not
/// word-level are skipped; malformed rows are ignored.
pub fn parse_tsv(tsv_data: &str, min_confidence: f64) -> Recognition {
    let mut tokens = Vec::new();
    let mut lines: Vec<String> = Vec::new();
    let mut current_key: Option<(u32, u32, u32, u32)> = None;

    for (line_num, line) in tsv_data.lines().enumerate() {
        if line_num == 0 {
            continue;
        }

        let line = line.trim_end_matches(['\r', '\n']);
        if line.trim().is_empty() {
            continue;
        }

        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() < TSV_MIN_FIELDS {
            continue;
        }

        let level = fields[0].trim().parse::<u32>().unwrap_or(0);
        if level != TSV_WORD_LEVEL {
            continue;
        }

        let conf = fields[10].trim().parse::<f64>().unwrap_or(-1.0);
        if conf < min_confidence {
            continue;
        }

        let text = fields[11].trim();
        if text.is_empty() {
            continue;
        }

        let number = |i: usize| fields[i].trim().parse::<u32>().unwrap_or(0);
        let coord = |i: usize| fields[i].trim().parse::<f64>().unwrap_or(0.0);

        let key = (number(1), number(2), number(3), number(4));
        if current_key == Some(key) {
            if let Some(last) = lines.last_mut() {
                last.push(' ');
                last.push_str(text);
            }
        } else {
            lines.push(text.to_string());
            current_key = Some(key);
        }

        tokens.push(RecognizedToken::new(
            text,
            BoundingBox::from_ltwh(coord(6), coord(7), coord(8), coord(9)),
        ));
    }

    Recognition::new(lines.join("\n"), tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "level\tpage_num\tblock_num\tpar_num\tline_num\tword_num\tleft\ttop\twidth\theight\tconf\ttext";

    fn tsv(rows: &[&str]) -> String {
        let mut out = String::from(HEADER);
        for row in rows {
            out.push('\n');
            out.push_str(row);
        }
        out
    }

    #[test]
    fn test_parse_words_and_lines() {
        let data = tsv(&[
            "1\t1\t0\t0\t0\t0\t0\t0\t1000\t800\t-1\t",
            "5\t1\t1\t1\t1\t1\t100\t50\t80\t30\t95.5\tapple",
            "5\t1\t1\t1\t1\t2\t400\t50\t60\t30\t91.0\t사과",
            "5\t1\t1\t1\t2\t1\t100\t100\t90\t30\t93.0\tbanana",
            "5\t1\t1\t1\t2\t2\t400\t100\t70\t30\t90.0\t바나나",
        ]);

        let recognition = parse_tsv(&data, 0.0);
        assert_eq!(recognition.text, "apple 사과\nbanana 바나나");
        assert_eq!(recognition.tokens.len(), 4);
        assert_eq!(recognition.tokens[0].text, "apple");
        assert_eq!(recognition.tokens[0].bbox, BoundingBox::new(100.0, 50.0, 180.0, 80.0));
    }

    #[test]
    fn test_confidence_filter() {
        let data = tsv(&[
            "5\t1\t1\t1\t1\t1\t100\t50\t80\t30\t95.5\tHello",
            "5\t1\t1\t1\t1\t2\t190\t50\t70\t30\t50.0\tWorld",
            "5\t1\t1\t1\t1\t3\t270\t50\t60\t30\t92.3\tTest",
        ]);

        let recognition = parse_tsv(&data, 90.0);
        assert_eq!(recognition.tokens.len(), 2);
        assert_eq!(recognition.text, "Hello Test");
    }

    #[test]
    fn test_level_filter_and_malformed_rows() {
        let data = tsv(&[
            "3\t1\t1\t1\t0\t0\t100\t50\t80\t30\t95.5\tParagraph",
            "invalid line",
            "5\t1\t1\t1\t1\t1\t100\t50\t80\t30\t95.5\tHello",
            "5\t1\t1\t1\t1\t2\t190\t50\t70\t30\t92.3\t   ",
        ]);

        let recognition = parse_tsv(&data, 0.0);
        assert_eq!(recognition.tokens.len(), 1);
        assert_eq!(recognition.text, "Hello");
    }

    #[test]
    fn test_empty_input() {
        let recognition = parse_tsv("", 0.0);
        assert!(recognition.text.is_empty());
        assert!(recognition.tokens.is_empty());
    }
}
