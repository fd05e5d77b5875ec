//! Core types for the frontier kernel.

pub mod path;
pub mod result;
pub mod stats;
pub mod vertex;

pub use path::{PathRecord, PathSignature};
pub use result::{ExpansionResult, TerminationReason};
pub use stats::{degree_bucket, ExpansionStats, HubEncounterStats};
pub use vertex::{edge_key, Neighbor, RelationLabel, VertexId};
