//! # frontier-kernel
//!
//! Multi-seed frontier expansion over large graphs.
//!
//! Given a graph exposed through a [`GraphProvider`] and a list of seed
//! vertices, the kernel grows one frontier per seed, always expanding the
//! globally most favoured vertex, and reports every simple path found
//! where two frontiers meet.
//!
//! ## Architecture
//!
//! ```text
//! seeds ─► ExpansionEngine ─► PriorityPolicy ─► FrontierState queues
//!               │    ▲                 │
//!               ▼    │                 ▼
//!         GraphProvider         meeting points ─► PathRecord
//!                                      │
//!                              TerminationPolicy ─► ExpansionResult
//! ```
//!
//! ## Determinism Guarantees
//!
//! - Same graph + same seeds + same policies → identical paths and
//!   sampled subgraph (see [`ExpansionResult::fingerprint`])
//! - Priority ties break by insertion order, frontier ties by seed index
//! - Each logical path is reported once, whichever frontier found it

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod canonical;
pub mod engine;
pub mod frontier;
pub mod overlap;
pub mod path;
pub mod policy;
pub mod provider;
pub mod queue;
pub mod salience;
pub mod types;

// Re-exports
pub use canonical::{canonical_hash, canonical_hash_hex, to_canonical_bytes};
pub use engine::{ExpansionEngine, ExpansionError};
pub use frontier::FrontierState;
pub use overlap::{OverlapEdge, OverlapGraph};
pub use policy::{
    AdaptiveConfig, AdaptiveTermination, DegreePriority, DiscoveryOrderPriority, EntropyPriority,
    ExpansionConfig, FrontierExhaustion, HashedPriority, NodeWeights, PathPotentialPriority,
    Phase, PriorityContext, PriorityPolicy, TerminationContext, TerminationPolicy,
    TransitiveConnectivity,
};
pub use provider::{GraphProvider, InMemoryError, InMemoryGraphProvider, RecordedEdge};
pub use queue::PriorityQueue;
pub use salience::SalienceStats;
pub use types::{
    ExpansionResult, ExpansionStats, HubEncounterStats, Neighbor, PathRecord, PathSignature,
    RelationLabel, TerminationReason, VertexId,
};

/// Version of the [`ExpansionResult`] layout.
pub const FRONTIER_KERNEL_SCHEMA_VERSION: &str = "1.0.0";

/// Config version stamped into [`ExpansionConfig`] by default.
pub const DEFAULT_CONFIG_VERSION: &str = "expansion_config_v1";
