//! Path records and direction-independent signatures.

use serde::{Deserialize, Serialize};

use super::vertex::VertexId;
use crate::canonical::canonical_hash_hex;

/// A simple path connecting two seeds, found where their frontiers met.
///
/// Records are stored in canonical orientation: `from_seed < to_seed`
/// and `nodes` runs from `seeds[from_seed]` to `seeds[to_seed]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathRecord {
    /// Frontier index of the seed at `nodes[0]`.
    pub from_seed: usize,
    /// Frontier index of the seed at the last node.
    pub to_seed: usize,
    /// Vertices along the path, no repeats.
    pub nodes: Vec<VertexId>,
    /// Salience score computed when the path was accepted.
    pub salience: f64,
}

impl PathRecord {
    /// Build a record from a path discovered in either direction.
    ///
    /// `nodes` must run from `seeds[from_seed]` to `seeds[to_seed]`; the
    /// record is flipped if needed so the lower seed index comes first.
    pub fn canonical(from_seed: usize, to_seed: usize, mut nodes: Vec<VertexId>) -> Self {
        let (from_seed, to_seed) = if from_seed > to_seed {
            nodes.reverse();
            (to_seed, from_seed)
        } else {
            (from_seed, to_seed)
        };
        Self {
            from_seed,
            to_seed,
            nodes,
            salience: 0.0,
        }
    }

    /// Number of edges on the path.
    pub fn hops(&self) -> usize {
        self.nodes.len().saturating_sub(1)
    }

    /// Whether no vertex appears twice.
    pub fn is_simple(&self) -> bool {
        crate::path::is_simple(&self.nodes)
    }

    /// Signature used for duplicate rejection.
    pub fn signature(&self) -> PathSignature {
        PathSignature::new(self.from_seed, self.to_seed, &self.nodes)
    }
}

/// Direction-normalised identity of a path.
///
/// Two discoveries of the same vertex sequence between the same pair of
/// seeds produce equal signatures regardless of which frontier found
/// the meeting point.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PathSignature {
    lo_seed: usize,
    hi_seed: usize,
    nodes: Vec<VertexId>,
}

impl PathSignature {
    /// Build a signature from a path running `from_seed -> to_seed`.
    pub fn new(from_seed: usize, to_seed: usize, nodes: &[VertexId]) -> Self {
        let mut nodes = nodes.to_vec();
        if from_seed > to_seed {
            nodes.reverse();
        }
        Self {
            lo_seed: from_seed.min(to_seed),
            hi_seed: from_seed.max(to_seed),
            nodes,
        }
    }

    /// Seed pair `(lower, higher)`.
    pub fn seeds(&self) -> (usize, usize) {
        (self.lo_seed, self.hi_seed)
    }

    /// Compact hex digest, for logs.
    pub fn digest(&self) -> String {
        canonical_hash_hex(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(names: &[&str]) -> Vec<VertexId> {
        names.iter().map(|n| VertexId::from(*n)).collect()
    }

    #[test]
    fn test_canonical_flips_reverse_discovery() {
        let record = PathRecord::canonical(1, 0, ids(&["C", "B", "A"]));
        assert_eq!(record.from_seed, 0);
        assert_eq!(record.to_seed, 1);
        assert_eq!(record.nodes, ids(&["A", "B", "C"]));
        assert_eq!(record.hops(), 2);
    }

    #[test]
    fn test_signature_is_direction_independent() {
        let forward = PathSignature::new(0, 2, &ids(&["A", "B", "D"]));
        let backward = PathSignature::new(2, 0, &ids(&["D", "B", "A"]));
        assert_eq!(forward, backward);
        assert_eq!(forward.digest(), backward.digest());
        assert_eq!(forward.seeds(), (0, 2));
    }

    #[test]
    fn test_signature_distinguishes_routes() {
        let via_b = PathSignature::new(0, 1, &ids(&["A", "B", "C"]));
        let via_d = PathSignature::new(0, 1, &ids(&["A", "D", "C"]));
        assert_ne!(via_b, via_d);
    }

    #[test]
    fn test_signature_separator_safe() {
        // A delimited string would make these two collide.
        let one = PathSignature::new(0, 1, &ids(&["a|b", "c"]));
        let two = PathSignature::new(0, 1, &ids(&["a", "b|c"]));
        assert_ne!(one, two);
    }

    #[test]
    fn test_is_simple() {
        assert!(PathRecord::canonical(0, 1, ids(&["A", "B", "C"])).is_simple());
        assert!(!PathRecord::canonical(0, 1, ids(&["A", "B", "A"])).is_simple());
    }
}
