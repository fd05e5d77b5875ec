//! Output of one expansion run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use uuid::Uuid;

use super::path::PathRecord;
use super::stats::ExpansionStats;
use super::vertex::VertexId;
use crate::canonical::canonical_hash_hex;
use crate::overlap::OverlapGraph;
use crate::policy::Phase;
use crate::salience::{path_diversity, SalienceStats};

/// Why a run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminationReason {
    /// Every frontier queue was empty.
    FrontiersExhausted,
    /// The termination policy signalled stop.
    PolicySatisfied,
    /// The max-vertices budget was reached.
    BudgetExhausted,
}

impl fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FrontiersExhausted => write!(f, "frontiers_exhausted"),
            Self::PolicySatisfied => write!(f, "policy_satisfied"),
            Self::BudgetExhausted => write!(f, "budget_exhausted"),
        }
    }
}

/// Everything a run produced.
///
/// All collections are ordered so two runs over the same graph with the
/// same seeds and policies serialize identically apart from `run_id` and
/// timestamps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpansionResult {
    /// Unique ID of this run.
    pub run_id: Uuid,
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// When the run finished.
    pub finished_at: DateTime<Utc>,
    /// Seeds in frontier-index order.
    pub seeds: Vec<VertexId>,
    /// Priority policy name.
    pub priority_policy: String,
    /// Termination policy name.
    pub termination_policy: String,
    /// Hash of the engine config and termination policy parameters.
    pub params_hash: String,
    /// Result schema version, [`crate::FRONTIER_KERNEL_SCHEMA_VERSION`].
    pub schema_version: String,
    /// Accepted paths, in discovery order.
    pub paths: Vec<PathRecord>,
    /// Union of all frontiers' visited sets.
    pub sampled_nodes: BTreeSet<VertexId>,
    /// Traversed edges as `"source->target"`.
    pub sampled_edges: BTreeSet<String>,
    /// Visited set of each frontier.
    pub frontier_visited: Vec<BTreeSet<VertexId>>,
    /// Counters.
    pub stats: ExpansionStats,
    /// Iteration at which each vertex was first seen.
    pub discovery_iteration: BTreeMap<VertexId, usize>,
    /// Expansion count at which each hub was expanded.
    pub hub_encounters: BTreeMap<VertexId, usize>,
    /// Which frontiers met which.
    pub overlap: OverlapGraph,
    /// Why the run stopped.
    pub termination: TerminationReason,
    /// Adaptive phase at the end of the run.
    pub final_phase: Phase,
}

/// Structural part of a result, hashed by [`ExpansionResult::fingerprint`].
#[derive(Serialize)]
struct ResultFingerprint<'a> {
    seeds: &'a [VertexId],
    paths: Vec<(usize, usize, &'a [VertexId])>,
    sampled_nodes: &'a BTreeSet<VertexId>,
    sampled_edges: &'a BTreeSet<String>,
    termination: TerminationReason,
}

impl ExpansionResult {
    /// Number of accepted paths.
    pub fn path_count(&self) -> usize {
        self.paths.len()
    }

    /// Whether `vertex` was visited by any frontier.
    pub fn contains_node(&self, vertex: &VertexId) -> bool {
        self.sampled_nodes.contains(vertex)
    }

    /// Paths connecting the seeds at indices `a` and `b`.
    pub fn paths_between(&self, a: usize, b: usize) -> Vec<&PathRecord> {
        let (lo, hi) = if a < b { (a, b) } else { (b, a) };
        self.paths
            .iter()
            .filter(|p| p.from_seed == lo && p.to_seed == hi)
            .collect()
    }

    /// Summary of path salience scores.
    pub fn salience_stats(&self) -> SalienceStats {
        let scores: Vec<f64> = self.paths.iter().map(|p| p.salience).collect();
        SalienceStats::from_scores(&scores)
    }

    /// Unique path vertices over total path vertex occurrences.
    pub fn path_diversity(&self) -> f64 {
        path_diversity(&self.paths)
    }

    /// Hash of the structural output.
    ///
    /// Excludes run ID, timestamps and float scores, so identical runs
    /// fingerprint identically.
    pub fn fingerprint(&self) -> String {
        canonical_hash_hex(&ResultFingerprint {
            seeds: &self.seeds,
            paths: self
                .paths
                .iter()
                .map(|p| (p.from_seed, p.to_seed, p.nodes.as_slice()))
                .collect(),
            sampled_nodes: &self.sampled_nodes,
            sampled_edges: &self.sampled_edges,
            termination: self.termination,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result_with_paths(paths: Vec<PathRecord>) -> ExpansionResult {
        let now = Utc::now();
        ExpansionResult {
            run_id: Uuid::new_v4(),
            started_at: now,
            finished_at: now,
            seeds: vec![VertexId::from("A"), VertexId::from("C")],
            priority_policy: "degree".to_string(),
            termination_policy: "frontier_exhaustion".to_string(),
            params_hash: "hash".to_string(),
            schema_version: crate::FRONTIER_KERNEL_SCHEMA_VERSION.to_string(),
            paths,
            sampled_nodes: BTreeSet::new(),
            sampled_edges: BTreeSet::new(),
            frontier_visited: vec![],
            stats: ExpansionStats::default(),
            discovery_iteration: BTreeMap::new(),
            hub_encounters: BTreeMap::new(),
            overlap: OverlapGraph::new(2),
            termination: TerminationReason::FrontiersExhausted,
            final_phase: Phase::Discovery,
        }
    }

    fn path(from: usize, to: usize, nodes: &[&str]) -> PathRecord {
        PathRecord::canonical(from, to, nodes.iter().map(|n| VertexId::from(*n)).collect())
    }

    #[test]
    fn test_fingerprint_ignores_run_identity() {
        let a = result_with_paths(vec![path(0, 1, &["A", "B", "C"])]);
        let b = result_with_paths(vec![path(0, 1, &["A", "B", "C"])]);
        assert_ne!(a.run_id, b.run_id);
        assert_eq!(a.fingerprint(), b.fingerprint());

        let c = result_with_paths(vec![path(0, 1, &["A", "D", "C"])]);
        assert_ne!(a.fingerprint(), c.fingerprint());
    }

    #[test]
    fn test_paths_between_either_order() {
        let result = result_with_paths(vec![path(0, 1, &["A", "B", "C"])]);
        assert_eq!(result.paths_between(1, 0).len(), 1);
        assert_eq!(result.paths_between(0, 2).len(), 0);
    }

    #[test]
    fn test_serializes_to_json() {
        let result = result_with_paths(vec![path(0, 1, &["A", "B", "C"])]);
        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("\"frontiers_exhausted\""));
        let back: ExpansionResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back.paths, result.paths);
    }
}
