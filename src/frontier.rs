//! Per-seed exploration state.

use std::collections::{HashMap, HashSet};

use crate::queue::PriorityQueue;
use crate::types::{RelationLabel, VertexId};

/// One frontier: the queue, visited set and parent pointers grown from a
/// single seed.
///
/// `visited` only grows. The seed is visited from construction and has no
/// parent entry; every other visited vertex has exactly one.
#[derive(Debug, Clone)]
pub struct FrontierState {
    index: usize,
    seed: VertexId,
    queue: PriorityQueue<VertexId>,
    visited: HashSet<VertexId>,
    parents: HashMap<VertexId, (VertexId, RelationLabel)>,
}

impl FrontierState {
    /// Create a frontier with its seed queued at `seed_priority`.
    pub fn new(index: usize, seed: VertexId, seed_priority: f64) -> Self {
        let mut queue = PriorityQueue::new();
        queue.push(seed.clone(), seed_priority);
        let mut visited = HashSet::new();
        visited.insert(seed.clone());
        Self {
            index,
            seed,
            queue,
            visited,
            parents: HashMap::new(),
        }
    }

    /// Position of this frontier's seed in the seed list.
    pub fn index(&self) -> usize {
        self.index
    }

    /// The seed vertex.
    pub fn seed(&self) -> &VertexId {
        &self.seed
    }

    /// Whether this frontier has discovered `vertex`.
    pub fn has_visited(&self, vertex: &VertexId) -> bool {
        self.visited.contains(vertex)
    }

    /// All vertices discovered by this frontier.
    pub fn visited(&self) -> &HashSet<VertexId> {
        &self.visited
    }

    /// Parent pointer of `vertex`, if it is not the seed.
    pub fn parent(&self, vertex: &VertexId) -> Option<&(VertexId, RelationLabel)> {
        self.parents.get(vertex)
    }

    /// Number of parent entries.
    pub fn parent_count(&self) -> usize {
        self.parents.len()
    }

    /// Mark `vertex` discovered via `parent`.
    ///
    /// Returns `false` if it was already visited, in which case nothing
    /// changes.
    pub fn discover(&mut self, vertex: VertexId, parent: VertexId, label: RelationLabel) -> bool {
        if !self.visited.insert(vertex.clone()) {
            return false;
        }
        self.parents.insert(vertex, (parent, label));
        true
    }

    /// Queue a discovered vertex for expansion.
    pub fn enqueue(&mut self, vertex: VertexId, priority: f64) -> bool {
        self.queue.push(vertex, priority)
    }

    /// Pop the most favoured queued vertex.
    pub fn pop(&mut self) -> Option<(VertexId, f64)> {
        self.queue.pop()
    }

    /// Smallest queued priority, `f64::INFINITY` when empty.
    pub fn peek_priority(&self) -> f64 {
        self.queue.peek_priority()
    }

    /// Whether nothing is left to expand.
    pub fn is_exhausted(&self) -> bool {
        self.queue.is_empty()
    }

    /// Number of queued vertices.
    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    /// Queued vertices, in no particular order.
    pub fn queued_vertices(&self) -> Vec<VertexId> {
        self.queue.iter().cloned().collect()
    }

    /// Re-score every queued vertex.
    pub fn reprioritize<F>(&mut self, priority_of: F)
    where
        F: FnMut(&VertexId) -> f64,
    {
        self.queue.reprioritize(priority_of);
    }

    /// Consume into the visited set.
    pub fn into_visited(self) -> HashSet<VertexId> {
        self.visited
    }
}
