//! Termination policies.
//!
//! The engine asks its termination policy once per iteration, before
//! selecting a frontier. Independently of any policy, a run always ends
//! when every frontier queue is empty.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::config::AdaptiveConfig;
use crate::frontier::FrontierState;
use crate::overlap::OverlapGraph;
use crate::salience::{path_diversity, rolling_improvement};
use crate::types::{ExpansionStats, PathRecord};

/// Adaptive expansion phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Collecting the first paths.
    #[default]
    Discovery,
    /// Biasing expansion with salience feedback.
    Exploitation,
    /// Salience has plateaued; waiting for diverse enough paths to stop.
    Stability,
}

/// Inputs to a phase transition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhaseSignals {
    /// Paths discovered so far.
    pub path_count: usize,
    /// Paths needed to leave Discovery.
    pub min_paths: usize,
    /// Whether mean path salience has stopped improving.
    pub plateaued: bool,
}

impl Phase {
    /// Next phase given the current signals. Phases only move forward,
    /// one step per call.
    pub fn next(self, signals: &PhaseSignals) -> Phase {
        match self {
            Phase::Discovery if signals.path_count >= signals.min_paths => Phase::Exploitation,
            Phase::Discovery => Phase::Discovery,
            Phase::Exploitation if signals.plateaued => Phase::Stability,
            Phase::Exploitation => Phase::Exploitation,
            Phase::Stability => Phase::Stability,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Discovery => write!(f, "discovery"),
            Self::Exploitation => write!(f, "exploitation"),
            Self::Stability => write!(f, "stability"),
        }
    }
}

/// Read-only view of engine state handed to termination policies.
#[derive(Debug, Clone, Copy)]
pub struct TerminationContext<'a> {
    /// All frontiers.
    pub frontiers: &'a [FrontierState],
    /// Paths accepted so far, in discovery order.
    pub paths: &'a [PathRecord],
    /// Frontier overlap graph.
    pub overlap: &'a OverlapGraph,
    /// Counters so far.
    pub stats: &'a ExpansionStats,
}

/// A pluggable stopping rule.
pub trait TerminationPolicy: Send {
    /// Short identifier, for logs and results.
    fn name(&self) -> &'static str;

    /// Whether the run should stop now.
    fn should_stop(&mut self, ctx: &TerminationContext<'_>) -> bool;

    /// Current adaptive phase. Non-adaptive policies stay in Discovery.
    fn phase(&self) -> Phase {
        Phase::Discovery
    }

    /// Called once for every accepted path, in discovery order.
    fn on_path(&mut self, _path: &PathRecord) {}

    /// Hash of the policy's own parameters, folded into the run's
    /// `params_hash`. Parameterless policies return `None`.
    fn params_hash(&self) -> Option<String> {
        None
    }
}

/// Run until every frontier queue is empty.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrontierExhaustion;

impl TerminationPolicy for FrontierExhaustion {
    fn name(&self) -> &'static str {
        "frontier_exhaustion"
    }

    fn should_stop(&mut self, ctx: &TerminationContext<'_>) -> bool {
        ctx.frontiers.iter().all(FrontierState::is_exhausted)
    }
}

/// Stop once every seed is transitively linked to every other through
/// observed frontier intersections. Never fires with fewer than two seeds.
#[derive(Debug, Clone, Copy, Default)]
pub struct TransitiveConnectivity;

impl TerminationPolicy for TransitiveConnectivity {
    fn name(&self) -> &'static str {
        "transitive_connectivity"
    }

    fn should_stop(&mut self, ctx: &TerminationContext<'_>) -> bool {
        ctx.overlap.is_connected()
    }
}

/// Three-phase adaptive termination.
///
/// 1. Discovery -> Exploitation once `min_paths` paths exist.
/// 2. Exploitation -> Stability once mean path salience plateaus over two
///    consecutive windows of `plateau_window_size` paths.
/// 3. Stability stops when `min_paths` is met and path diversity reaches
///    `diversity_threshold`.
#[derive(Debug, Clone)]
pub struct AdaptiveTermination {
    config: AdaptiveConfig,
    phase: Phase,
    salience_history: Vec<f64>,
}

impl AdaptiveTermination {
    /// Create a policy starting in Discovery.
    pub fn new(config: AdaptiveConfig) -> Self {
        Self {
            config,
            phase: Phase::Discovery,
            salience_history: Vec::new(),
        }
    }

    /// The adaptive parameters.
    pub fn config(&self) -> &AdaptiveConfig {
        &self.config
    }

    fn plateaued(&self) -> bool {
        rolling_improvement(&self.salience_history, self.config.plateau_window_size)
            .map(|improvement| improvement < self.config.plateau_threshold)
            .unwrap_or(false)
    }
}

impl TerminationPolicy for AdaptiveTermination {
    fn name(&self) -> &'static str {
        "adaptive"
    }

    fn should_stop(&mut self, ctx: &TerminationContext<'_>) -> bool {
        let signals = PhaseSignals {
            path_count: ctx.paths.len(),
            min_paths: self.config.min_paths,
            plateaued: self.phase == Phase::Exploitation && self.plateaued(),
        };
        let next = self.phase.next(&signals);
        if next != self.phase {
            tracing::debug!(
                from = %self.phase,
                to = %next,
                paths = ctx.paths.len(),
                "Phase transition"
            );
            self.phase = next;
        }

        self.phase == Phase::Stability
            && ctx.paths.len() >= self.config.min_paths
            && path_diversity(ctx.paths) >= self.config.diversity_threshold
    }

    fn phase(&self) -> Phase {
        self.phase
    }

    fn on_path(&mut self, path: &PathRecord) {
        self.salience_history.push(path.salience);
    }

    fn params_hash(&self) -> Option<String> {
        Some(self.config.params_hash())
    }
}
