//! Term/meaning column boundary estimation.
//!
//! The primary estimate is the widest gap between adjacent token x-centers near
//! the median. When that gap is too narrow to trust (typically because dotted
//! leaders fill the middle of the table), a two-cluster 1-D k-means is used.

use super::{LayoutToken, Row, median};
use crate::core::config::LayoutConfig;

/// Estimate the x coordinate separating the term column from the meaning column.
///
/// Leader tokens never contribute. Tokens without any letter (index numbers,
/// stray punctuation) are ignored as well, unless nothing else is left.
pub fn estimate_split(rows: &[Row], config: &LayoutConfig) -> f64 {
    let candidates: Vec<&LayoutToken> = rows
        .iter()
        .flat_map(|row| row.tokens.iter())
        .filter(|t| !t.is_leader)
        .collect();

    let mut centers: Vec<f64> = candidates
        .iter()
        .filter(|t| t.has_letters())
        .map(|t| t.x_center)
        .collect();
    if centers.is_empty() {
        centers = candidates.iter().map(|t| t.x_center).collect();
    }

    split_from_centers(&centers, config)
}

/// Gap search over raw x-centers, falling back to k-means.
pub fn split_from_centers(centers: &[f64], config: &LayoutConfig) -> f64 {
    let Some(reference) = median(centers) else {
        return 0.0;
    };

    let mut sorted = centers.to_vec();
    sorted.sort_by(f64::total_cmp);
    let min = sorted[0];
    let max = sorted[sorted.len() - 1];
    let range = (max - min).max(1.0);
    let window = range * config.gap_window_ratio;

    let mut best_gap = 0.0;
    let mut best_split = reference;
    for pair in sorted.windows(2) {
        let gap = pair[1] - pair[0];
        let mid = (pair[0] + pair[1]) / 2.0;
        if (mid - reference).abs() < window && gap > best_gap {
            best_gap = gap;
            best_split = mid;
        }
    }

    if best_gap < range * config.min_gap_ratio {
        tracing::debug!(best_gap, range, "Column gap too narrow, using k-means split");
        return kmeans_split(centers, config);
    }
    best_split
}

/// Two-cluster 1-D k-means seeded at the 25th/75th percentiles; returns the
/// midpoint between the two centroids.
pub fn kmeans_split(centers: &[f64], config: &LayoutConfig) -> f64 {
    if centers.len() < config.kmeans_min_points.max(2) {
        return median(centers).unwrap_or(0.0);
    }

    let mut sorted = centers.to_vec();
    sorted.sort_by(f64::total_cmp);
    let n = sorted.len();
    let percentile = |p: f64| sorted[((n as f64 * p).floor() as usize).min(n - 1)];
    let mut c1 = percentile(0.25);
    let mut c2 = percentile(0.75);

    for _ in 0..config.kmeans_max_iterations {
        let (mut sum1, mut n1, mut sum2, mut n2) = (0.0, 0usize, 0.0, 0usize);
        for &x in &sorted {
            if (x - c1).abs() <= (x - c2).abs() {
                sum1 += x;
                n1 += 1;
            } else {
                sum2 += x;
                n2 += 1;
            }
        }
        if n1 == 0 || n2 == 0 {
            break;
        }

        let m1 = sum1 / n1 as f64;
        let m2 = sum2 / n2 as f64;
        let converged = (m1 - c1).abs() < config.kmeans_epsilon && (m2 - c2).abs() < config.kmeans_epsilon;
        c1 = m1;
        c2 = m2;
        if converged {
            break;
        }
    }

    (c1.min(c2) + c1.max(c2)) / 2.0
}
