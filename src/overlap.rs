//! Frontier overlap graph.
//!
//! Nodes are frontier indices; an edge joins two frontiers once they
//! have been seen to intersect. The graph only grows during a run.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, VecDeque};

/// An edge in the overlap graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OverlapEdge {
    /// Lower frontier index.
    pub frontier_a: usize,
    /// Higher frontier index.
    pub frontier_b: usize,
    /// Number of meeting vertices observed between the two frontiers.
    pub meetings: usize,
}

impl OverlapEdge {
    /// Create a new overlap edge with a single meeting.
    pub fn new(a: usize, b: usize) -> Self {
        // Ensure canonical ordering
        let (frontier_a, frontier_b) = if a < b { (a, b) } else { (b, a) };
        Self {
            frontier_a,
            frontier_b,
            meetings: 1,
        }
    }

    fn key(&self) -> (usize, usize) {
        (self.frontier_a, self.frontier_b)
    }
}

/// Which frontiers have met which.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlapGraph {
    /// Number of frontiers (nodes).
    pub frontier_count: usize,
    /// Observed intersections, sorted by `(frontier_a, frontier_b)`.
    pub edges: Vec<OverlapEdge>,
}

impl OverlapGraph {
    /// Create a graph with `frontier_count` isolated nodes.
    pub fn new(frontier_count: usize) -> Self {
        Self {
            frontier_count,
            edges: Vec::new(),
        }
    }

    /// Record that frontiers `a` and `b` met.
    ///
    /// Returns `true` if this is the first meeting of the pair. Self-loops
    /// are ignored.
    pub fn record(&mut self, a: usize, b: usize) -> bool {
        if a == b {
            return false;
        }
        let edge = OverlapEdge::new(a, b);
        match self.edges.binary_search_by_key(&edge.key(), OverlapEdge::key) {
            Ok(pos) => {
                self.edges[pos].meetings += 1;
                false
            }
            Err(pos) => {
                self.edges.insert(pos, edge);
                true
            }
        }
    }

    /// The edge between `a` and `b`, if they have met.
    pub fn edge(&self, a: usize, b: usize) -> Option<&OverlapEdge> {
        let key = OverlapEdge::new(a, b).key();
        self.edges
            .binary_search_by_key(&key, OverlapEdge::key)
            .ok()
            .map(|pos| &self.edges[pos])
    }

    /// Frontiers adjacent to `frontier`.
    pub fn neighbors(&self, frontier: usize) -> Vec<usize> {
        self.edges
            .iter()
            .filter_map(|e| {
                if e.frontier_a == frontier {
                    Some(e.frontier_b)
                } else if e.frontier_b == frontier {
                    Some(e.frontier_a)
                } else {
                    None
                }
            })
            .collect()
    }

    /// Frontiers reachable from frontier 0 (including 0 itself).
    pub fn reachable_from_first(&self) -> BTreeSet<usize> {
        let mut seen = BTreeSet::new();
        if self.frontier_count == 0 {
            return seen;
        }
        let mut queue = VecDeque::from([0usize]);
        seen.insert(0);
        while let Some(current) = queue.pop_front() {
            for next in self.neighbors(current) {
                if seen.insert(next) {
                    queue.push_back(next);
                }
            }
        }
        seen
    }

    /// Whether every frontier is transitively linked to every other.
    ///
    /// A graph with fewer than two frontiers is never considered connected:
    /// there is nothing to link.
    pub fn is_connected(&self) -> bool {
        self.frontier_count >= 2 && self.reachable_from_first().len() == self.frontier_count
    }
}
