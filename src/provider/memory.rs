//! In-memory graph provider for tests and benchmarks.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{BTreeMap, BTreeSet};

use super::GraphProvider;
use crate::types::{Neighbor, RelationLabel, VertexId};

/// Error type for the in-memory provider.
#[derive(Debug, Clone, thiserror::Error)]
pub enum InMemoryError {
    /// Vertex was never added to the graph.
    #[error("Unknown vertex: {0}")]
    UnknownVertex(VertexId),
}

/// An edge reported back through [`GraphProvider::record_edge`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedEdge {
    /// Vertex being expanded.
    pub source: VertexId,
    /// Newly discovered vertex.
    pub target: VertexId,
    /// Relationship label of the traversed edge.
    pub label: RelationLabel,
}

/// In-memory graph provider.
///
/// Uses BTreeMap/BTreeSet so neighbour lists come back in a stable order.
/// In undirected mode every edge is reachable from both endpoints; in
/// directed mode only outgoing edges are returned as neighbours. Degree
/// is always out-degree plus in-degree.
#[derive(Debug, Default)]
pub struct InMemoryGraphProvider {
    directed: bool,
    vertices: BTreeSet<VertexId>,
    /// Source -> (target, label).
    outgoing: BTreeMap<VertexId, BTreeSet<Neighbor>>,
    /// Target -> (source, label).
    incoming: BTreeMap<VertexId, BTreeSet<Neighbor>>,
    recorded: Mutex<Vec<RecordedEdge>>,
}

impl InMemoryGraphProvider {
    /// Create an empty undirected graph.
    pub fn undirected() -> Self {
        Self::default()
    }

    /// Create an empty directed graph.
    pub fn directed() -> Self {
        Self {
            directed: true,
            ..Self::default()
        }
    }

    /// Build an undirected graph from `(source, target, label)` triples.
    pub fn from_edges<'a, I>(edges: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str, &'a str)>,
    {
        let mut graph = Self::undirected();
        for (source, target, label) in edges {
            graph.add_edge(source, target, label);
        }
        graph
    }

    /// Whether edges are one-way.
    pub fn is_directed(&self) -> bool {
        self.directed
    }

    /// Add an isolated vertex (no-op if present).
    pub fn add_vertex(&mut self, vertex: impl Into<VertexId>) {
        self.vertices.insert(vertex.into());
    }

    /// Add an edge. Both endpoints are added as vertices.
    pub fn add_edge(
        &mut self,
        source: impl Into<VertexId>,
        target: impl Into<VertexId>,
        label: impl Into<RelationLabel>,
    ) {
        let source = source.into();
        let target = target.into();
        let label = label.into();

        self.vertices.insert(source.clone());
        self.vertices.insert(target.clone());

        self.outgoing
            .entry(source.clone())
            .or_default()
            .insert(Neighbor::new(target.clone(), label.clone()));

        self.incoming
            .entry(target)
            .or_default()
            .insert(Neighbor::new(source, label));
    }

    /// Number of vertices.
    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Number of distinct `(source, target, label)` edges.
    pub fn num_edges(&self) -> usize {
        self.outgoing.values().map(BTreeSet::len).sum()
    }

    /// All vertices in order.
    pub fn vertices(&self) -> impl Iterator<Item = &VertexId> {
        self.vertices.iter()
    }

    /// Edges reported through `record_edge`, in call order.
    pub fn recorded_edges(&self) -> Vec<RecordedEdge> {
        self.recorded.lock().clone()
    }

    /// Clear recorded edges.
    pub fn clear_recorded(&self) {
        self.recorded.lock().clear();
    }

    fn check_known(&self, vertex: &VertexId) -> Result<(), InMemoryError> {
        if self.vertices.contains(vertex) {
            Ok(())
        } else {
            Err(InMemoryError::UnknownVertex(vertex.clone()))
        }
    }

    fn neighbor_set(&self, vertex: &VertexId) -> BTreeSet<Neighbor> {
        let mut result: BTreeSet<Neighbor> = self
            .outgoing
            .get(vertex)
            .cloned()
            .unwrap_or_default();

        if !self.directed {
            if let Some(sources) = self.incoming.get(vertex) {
                result.extend(sources.iter().cloned());
            }
        }
        result
    }
}

#[async_trait]
impl GraphProvider for InMemoryGraphProvider {
    type Error = InMemoryError;

    async fn neighbors(&self, vertex: &VertexId) -> Result<Vec<Neighbor>, Self::Error> {
        self.check_known(vertex)?;
        Ok(self.neighbor_set(vertex).into_iter().collect())
    }

    fn degree(&self, vertex: &VertexId) -> Result<usize, Self::Error> {
        self.check_known(vertex)?;
        let out = self.outgoing.get(vertex).map(BTreeSet::len).unwrap_or(0);
        let inc = self.incoming.get(vertex).map(BTreeSet::len).unwrap_or(0);
        Ok(out + inc)
    }

    fn label_histogram(
        &self,
        vertex: &VertexId,
    ) -> Result<Option<BTreeMap<RelationLabel, usize>>, Self::Error> {
        self.check_known(vertex)?;
        let mut histogram: BTreeMap<RelationLabel, usize> = BTreeMap::new();
        for neighbor in self.neighbor_set(vertex) {
            *histogram.entry(neighbor.label).or_insert(0) += 1;
        }
        Ok(Some(histogram))
    }

    fn record_edge(
        &self,
        source: &VertexId,
        target: &VertexId,
        label: &RelationLabel,
    ) -> Result<(), Self::Error> {
        self.recorded.lock().push(RecordedEdge {
            source: source.clone(),
            target: target.clone(),
            label: label.clone(),
        });
        Ok(())
    }
}
