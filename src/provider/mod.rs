//! Graph data providers.
//!
//! The engine never owns graph data. It queries a [`GraphProvider`] for
//! neighbour lists (the one awaited call per iteration) and for cheap
//! synchronous facts such as degree.

pub mod memory;

use async_trait::async_trait;
use std::collections::BTreeMap;

use crate::policy::{NodeWeights, PRIORITY_EPSILON};
use crate::types::{Neighbor, RelationLabel, VertexId};

/// Source of graph structure for an expansion run.
///
/// Implementations should return neighbour lists in a stable order so
/// that runs are reproducible. If a provider is shared between
/// concurrent runs, its own synchronisation is its responsibility.
#[async_trait]
pub trait GraphProvider: Send + Sync {
    /// Error type for provider operations.
    type Error: std::error::Error + Send + Sync;

    /// Fetch the neighbour list of a vertex.
    async fn neighbors(&self, vertex: &VertexId) -> Result<Vec<Neighbor>, Self::Error>;

    /// Total (out + in) degree of a vertex.
    fn degree(&self, vertex: &VertexId) -> Result<usize, Self::Error>;

    /// Degree-based priority, optionally normalised by node weight.
    ///
    /// ```text
    /// priority = degree / (weight + PRIORITY_EPSILON)
    /// ```
    fn priority(
        &self,
        vertex: &VertexId,
        weights: Option<&NodeWeights>,
    ) -> Result<f64, Self::Error> {
        let degree = self.degree(vertex)? as f64;
        let weight = weights.map(|w| w.get(vertex)).unwrap_or(1.0);
        Ok(degree / (weight + PRIORITY_EPSILON))
    }

    /// Counts of relationship labels among a vertex's neighbours.
    ///
    /// Providers that cannot answer this cheaply return `Ok(None)` and the
    /// engine falls back to whatever neighbour lists it has already seen.
    fn label_histogram(
        &self,
        _vertex: &VertexId,
    ) -> Result<Option<BTreeMap<RelationLabel, usize>>, Self::Error> {
        Ok(None)
    }

    /// Notification that the engine traversed `source -> target`.
    ///
    /// Purely for the caller's bookkeeping; the engine never reads it back.
    fn record_edge(
        &self,
        source: &VertexId,
        target: &VertexId,
        label: &RelationLabel,
    ) -> Result<(), Self::Error>;
}

pub use memory::{InMemoryError, InMemoryGraphProvider, RecordedEdge};
