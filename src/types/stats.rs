//! Expansion counters and hub-encounter bookkeeping.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::vertex::VertexId;

/// Counters accumulated during one expansion run.
///
/// All counters only ever increase.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExpansionStats {
    /// Vertices popped and expanded.
    pub vertices_expanded: usize,
    /// Edges traversed to newly discovered vertices.
    pub edges_traversed: usize,
    /// Loop iterations that reached a pop.
    pub iterations: usize,
    /// Paths accepted into the result.
    pub paths_found: usize,
    /// Meeting points whose path was already known.
    pub duplicate_paths_rejected: usize,
    /// Meeting points whose reconstruction was not a simple path.
    pub invalid_paths_rejected: usize,
    /// Expanded vertices bucketed by degree.
    ///
    /// Bucket 0 holds degree 0; bucket `k > 0` holds degrees in
    /// `[2^(k-1), 2^k)`.
    pub degree_histogram: BTreeMap<u32, usize>,
    /// Hub-encounter summary, present when a hub threshold was configured.
    pub hubs: Option<HubEncounterStats>,
}

impl ExpansionStats {
    /// Record an expanded vertex's degree.
    pub fn record_degree(&mut self, degree: usize) {
        *self.degree_histogram.entry(degree_bucket(degree)).or_insert(0) += 1;
    }
}

/// Histogram bucket for a degree.
pub fn degree_bucket(degree: usize) -> u32 {
    if degree == 0 {
        0
    } else {
        usize::BITS - degree.leading_zeros()
    }
}

/// Where in the run high-degree vertices were expanded.
///
/// Positions are expressed as a fraction of the total number of expanded
/// vertices, so `0.0` means "right at the start" and `1.0` "at the end".
/// A hub-avoiding policy pushes these fractions towards 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HubEncounterStats {
    /// Degree at or above which a vertex counts as a hub.
    pub threshold: usize,
    /// Number of distinct hubs expanded.
    pub hubs_expanded: usize,
    /// Fractional position of the first hub expansion.
    pub first_fraction: Option<f64>,
    /// Mean fractional position over all hub expansions.
    pub mean_fraction: Option<f64>,
}

impl HubEncounterStats {
    /// Summarise hub positions (1-based expansion counts).
    pub fn from_positions(
        threshold: usize,
        positions: &BTreeMap<VertexId, usize>,
        vertices_expanded: usize,
    ) -> Self {
        if positions.is_empty() || vertices_expanded == 0 {
            return Self {
                threshold,
                hubs_expanded: positions.len(),
                first_fraction: None,
                mean_fraction: None,
            };
        }

        let total = vertices_expanded as f64;
        let first = positions.values().copied().min().unwrap_or(0);
        let sum: usize = positions.values().sum();

        Self {
            threshold,
            hubs_expanded: positions.len(),
            first_fraction: Some(first as f64 / total),
            mean_fraction: Some(sum as f64 / positions.len() as f64 / total),
        }
    }
}
