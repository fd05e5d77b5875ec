//! Path salience, path diversity and plateau detection.
//!
//! ## Salience
//!
//! Each vertex gets a *specificity* that shrinks with its degree:
//!
//! ```text
//! specificity(v) = 1 / (1 + ln(1 + degree(v)))
//! ```
//!
//! A path's salience is the geometric mean of the specificity of its
//! vertices. Paths routed through hubs score low; paths through
//! low-degree, specific vertices score close to 1.
//!
//! ## Diversity
//!
//! Unique vertices across all paths divided by total vertex occurrences.
//! 1.0 means no two paths share a vertex.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::types::PathRecord;

/// Specificity of a single vertex, in `(0, 1]`.
pub fn vertex_specificity(degree: usize) -> f64 {
    1.0 / (1.0 + (1.0 + degree as f64).ln())
}

/// Geometric mean of vertex specificities. Empty input scores 0.
pub fn path_salience(degrees: &[usize]) -> f64 {
    if degrees.is_empty() {
        return 0.0;
    }
    let log_sum: f64 = degrees.iter().map(|&d| vertex_specificity(d).ln()).sum();
    (log_sum / degrees.len() as f64).exp()
}

/// Unique path vertices over total path vertex occurrences.
///
/// Returns 0 when there are no paths.
pub fn path_diversity(paths: &[PathRecord]) -> f64 {
    let total: usize = paths.iter().map(|p| p.nodes.len()).sum();
    if total == 0 {
        return 0.0;
    }
    let unique: HashSet<_> = paths.iter().flat_map(|p| p.nodes.iter()).collect();
    unique.len() as f64 / total as f64
}

/// Relative improvement of the latest window's mean over the one before.
///
/// Needs at least `2 * window` samples; returns `None` otherwise. When the
/// previous mean is zero, any positive current mean counts as unbounded
/// improvement and zero counts as none.
pub fn rolling_improvement(history: &[f64], window: usize) -> Option<f64> {
    let window = window.max(1);
    if history.len() < 2 * window {
        return None;
    }
    let n = history.len();
    let current = mean(&history[n - window..]);
    let previous = mean(&history[n - 2 * window..n - window]);

    if previous.abs() < f64::EPSILON {
        return Some(if current > 0.0 { f64::INFINITY } else { 0.0 });
    }
    Some((current - previous) / previous)
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// Statistical summary of path salience scores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalienceStats {
    /// Minimum salience.
    pub min: f64,
    /// Maximum salience.
    pub max: f64,
    /// Mean salience.
    pub mean: f64,
    /// Standard deviation of salience scores.
    pub std_dev: f64,
    /// Number of scored paths.
    pub count: usize,
}

impl SalienceStats {
    /// Summarise a list of salience scores.
    pub fn from_scores(scores: &[f64]) -> Self {
        if scores.is_empty() {
            return Self {
                min: 0.0,
                max: 0.0,
                mean: 0.0,
                std_dev: 0.0,
                count: 0,
            };
        }

        let min = scores.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = scores.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let mean = mean(scores);
        let variance = scores.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / scores.len() as f64;

        Self {
            min,
            max,
            mean,
            std_dev: variance.sqrt(),
            count: scores.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::VertexId;

    fn path(from: usize, to: usize, nodes: &[&str]) -> PathRecord {
        PathRecord::canonical(from, to, nodes.iter().map(|n| VertexId::from(*n)).collect())
    }

    #[test]
    fn test_specificity_decreases_with_degree() {
        assert_eq!(vertex_specificity(0), 1.0);
        assert!(vertex_specificity(1) > vertex_specificity(10));
        assert!(vertex_specificity(10) > vertex_specificity(1000));
    }

    #[test]
    fn test_path_salience_geometric_mean() {
        let uniform = path_salience(&[3, 3, 3]);
        assert!((uniform - vertex_specificity(3)).abs() < 1e-12);

        // A hub drags the whole path down.
        assert!(path_salience(&[1, 1000, 1]) < path_salience(&[1, 2, 1]));
        assert_eq!(path_salience(&[]), 0.0);
    }

    #[test]
    fn test_diversity() {
        let disjoint = vec![path(0, 1, &["A", "B"]), path(0, 2, &["C", "D"])];
        assert_eq!(path_diversity(&disjoint), 1.0);

        let shared = vec![path(0, 1, &["A", "B", "C"]), path(0, 2, &["A", "B", "D"])];
        assert!((path_diversity(&shared) - 4.0 / 6.0).abs() < 1e-12);

        assert_eq!(path_diversity(&[]), 0.0);
    }

    #[test]
    fn test_rolling_improvement_requires_two_windows() {
        assert!(rolling_improvement(&[0.5, 0.5, 0.5], 2).is_none());
        let flat = rolling_improvement(&[0.5, 0.5, 0.5, 0.5], 2).unwrap();
        assert_eq!(flat, 0.0);
    }

    #[test]
    fn test_rolling_improvement_detects_growth() {
        let growth = rolling_improvement(&[0.2, 0.2, 0.4, 0.4], 2).unwrap();
        assert!((growth - 1.0).abs() < 1e-12);

        let from_zero = rolling_improvement(&[0.0, 0.0, 0.1, 0.1], 2).unwrap();
        assert!(from_zero.is_infinite());
    }

    #[test]
    fn test_salience_stats() {
        let stats = SalienceStats::from_scores(&[0.2, 0.4, 0.6]);
        assert_eq!(stats.count, 3);
        assert!((stats.mean - 0.4).abs() < 1e-12);
        assert_eq!(stats.min, 0.2);
        assert_eq!(stats.max, 0.6);

        let empty = SalienceStats::from_scores(&[]);
        assert_eq!(empty.count, 0);
    }
}
