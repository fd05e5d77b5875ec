//! Vertex and edge identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier of a vertex in the expanded graph.
///
/// The engine only compares, hashes and orders identifiers; it never
/// interprets their content. `Ord` is provided so result containers can
/// be sorted deterministically.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VertexId(String);

impl VertexId {
    /// Create a new vertex identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for VertexId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for VertexId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Relationship label carried by an edge.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RelationLabel(String);

impl RelationLabel {
    /// Create a new relationship label.
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    /// Borrow the label as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for RelationLabel {
    fn default() -> Self {
        Self("related".to_string())
    }
}

impl fmt::Display for RelationLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RelationLabel {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// One entry of a vertex's neighbour list.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Neighbor {
    /// Vertex on the far side of the edge.
    pub target: VertexId,
    /// Relationship label of the edge.
    pub label: RelationLabel,
}

impl Neighbor {
    /// Create a new neighbour entry.
    pub fn new(target: impl Into<VertexId>, label: impl Into<RelationLabel>) -> Self {
        Self {
            target: target.into(),
            label: label.into(),
        }
    }
}

/// Key under which a traversed edge is stored in the sampled edge set.
///
/// Format: `"source->target"`.
pub fn edge_key(source: &VertexId, target: &VertexId) -> String {
    format!("{}->{}", source, target)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_ordering() {
        let a = VertexId::from("a");
        let b = VertexId::from("b");
        assert!(a < b);
        assert_eq!(a, VertexId::new("a".to_string()));
    }

    #[test]
    fn test_edge_key_format() {
        let key = edge_key(&VertexId::from("A"), &VertexId::from("B"));
        assert_eq!(key, "A->B");
    }

    #[test]
    fn test_vertex_serializes_as_plain_string() {
        let json = serde_json::to_string(&VertexId::from("node-7")).unwrap();
        assert_eq!(json, "\"node-7\"");
    }

    #[test]
    fn test_default_label() {
        assert_eq!(RelationLabel::default().as_str(), "related");
    }
}
