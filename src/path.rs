//! Path reconstruction at frontier meeting points.
//!
//! When frontier A discovers a vertex `m` already owned by frontier B,
//! the two parent chains through `m` form a candidate path from A's seed
//! to B's seed:
//!
//! ```text
//! seed_A -> ... -> parent_A(m) -> m -> parent_B(m) -> ... -> seed_B
//! ```
//!
//! The candidate is rejected when it is not simple. That happens when both
//! frontiers reached a shared ancestor before meeting at `m`; the simple
//! path between the same seeds, if any, shows up at another meeting point.

use std::collections::{HashSet, VecDeque};

use crate::frontier::FrontierState;
use crate::types::VertexId;

/// Outcome of a reconstruction attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum Reconstruction {
    /// A simple path from `active`'s seed to `owner`'s seed.
    Path(Vec<VertexId>),
    /// A parent chain did not lead back to its seed.
    BrokenChain,
    /// The joined chains repeat a vertex.
    NotSimple,
}

impl Reconstruction {
    /// The path, if reconstruction succeeded.
    pub fn into_path(self) -> Option<Vec<VertexId>> {
        match self {
            Self::Path(nodes) => Some(nodes),
            _ => None,
        }
    }
}

/// Rebuild the path through meeting vertex `meeting`.
///
/// `active` is the frontier that just discovered `meeting`; `owner` is the
/// frontier that discovered it first. The returned nodes run from
/// `active`'s seed to `owner`'s seed.
pub fn reconstruct(
    meeting: &VertexId,
    active: &FrontierState,
    owner: &FrontierState,
) -> Reconstruction {
    // Active side: meeting back to seed, prepending.
    let mut nodes: VecDeque<VertexId> = VecDeque::new();
    nodes.push_front(meeting.clone());
    let mut current = meeting;
    let mut steps = 0;
    while let Some((parent, _)) = active.parent(current) {
        steps += 1;
        if steps > active.parent_count() {
            return Reconstruction::BrokenChain;
        }
        nodes.push_front(parent.clone());
        current = parent;
    }
    if nodes.front() != Some(active.seed()) {
        return Reconstruction::BrokenChain;
    }

    // Owner side: from meeting's parent on, appending. Empty when the
    // meeting vertex is the owner's seed.
    let mut current = meeting;
    let mut steps = 0;
    while let Some((parent, _)) = owner.parent(current) {
        steps += 1;
        if steps > owner.parent_count() {
            return Reconstruction::BrokenChain;
        }
        nodes.push_back(parent.clone());
        current = parent;
    }
    if current != owner.seed() {
        return Reconstruction::BrokenChain;
    }

    let nodes: Vec<VertexId> = nodes.into();
    if is_simple(&nodes) {
        Reconstruction::Path(nodes)
    } else {
        Reconstruction::NotSimple
    }
}

/// Whether no vertex appears twice.
pub fn is_simple(nodes: &[VertexId]) -> bool {
    let mut seen = HashSet::with_capacity(nodes.len());
    nodes.iter().all(|n| seen.insert(n))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RelationLabel;

    fn v(id: &str) -> VertexId {
        VertexId::from(id)
    }

    fn frontier(index: usize, seed: &str, chain: &[(&str, &str)]) -> FrontierState {
        let mut f = FrontierState::new(index, v(seed), 0.0);
        for (child, parent) in chain {
            f.discover(v(child), v(parent), RelationLabel::default());
        }
        f
    }

    #[test]
    fn test_meeting_in_the_middle() {
        // A - B - C, frontiers from A and C both reached B.
        let a = frontier(0, "A", &[("B", "A")]);
        let c = frontier(1, "C", &[("B", "C")]);

        let path = reconstruct(&v("B"), &c, &a).into_path().unwrap();
        assert_eq!(path, vec![v("C"), v("B"), v("A")]);
    }

    #[test]
    fn test_meeting_at_owner_seed() {
        // Frontier from A reaches C's seed directly.
        let a = frontier(0, "A", &[("B", "A"), ("C", "B")]);
        let c = frontier(1, "C", &[]);

        let path = reconstruct(&v("C"), &a, &c).into_path().unwrap();
        assert_eq!(path, vec![v("A"), v("B"), v("C")]);
    }

    #[test]
    fn test_shared_ancestor_rejected() {
        // Both frontiers passed through B before meeting at D.
        let a = frontier(0, "A", &[("B", "A"), ("D", "B")]);
        let c = frontier(1, "C", &[("B", "C"), ("D", "B")]);

        assert_eq!(reconstruct(&v("D"), &c, &a), Reconstruction::NotSimple);
    }

    #[test]
    fn test_repeated_seed_rejected() {
        // Two frontiers seeded at the same vertex.
        let first = frontier(0, "X", &[("Y", "X")]);
        let second = frontier(1, "X", &[("Y", "X")]);

        assert_eq!(reconstruct(&v("Y"), &second, &first), Reconstruction::NotSimple);
    }

    #[test]
    fn test_broken_owner_chain() {
        let a = frontier(0, "A", &[("M", "A")]);
        // Owner never discovered M and M is not its seed.
        let c = frontier(1, "C", &[]);

        assert_eq!(reconstruct(&v("M"), &a, &c), Reconstruction::BrokenChain);
    }

    #[test]
    fn test_is_simple() {
        assert!(is_simple(&[v("A"), v("B")]));
        assert!(!is_simple(&[v("A"), v("B"), v("A")]));
        assert!(is_simple(&[]));
    }
}
