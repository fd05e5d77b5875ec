//! Expansion policies: configuration, priority and termination.

pub mod config;
pub mod priority;
pub mod termination;

pub use config::{AdaptiveConfig, ExpansionConfig, NodeWeights};
pub use priority::{
    shannon_entropy, DegreePriority, DiscoveryOrderPriority, EntropyPriority, HashedPriority,
    PathPotentialPriority, PriorityContext, PriorityPolicy, PRIORITY_EPSILON,
};
pub use termination::{
    AdaptiveTermination, FrontierExhaustion, Phase, PhaseSignals, TerminationContext,
    TerminationPolicy, TransitiveConnectivity,
};
