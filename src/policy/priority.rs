//! Priority policies for frontier expansion.
//!
//! A policy maps a newly discovered vertex to a scalar. Lower values are
//! expanded sooner, both within a frontier and across frontiers.

use std::collections::{BTreeMap, HashMap};
use xxhash_rust::xxh64::xxh64;

use super::config::NodeWeights;
use super::termination::Phase;
use crate::frontier::FrontierState;
use crate::provider::GraphProvider;
use crate::types::{Neighbor, RelationLabel, VertexId};

/// Guard against division by zero in priority formulas.
pub const PRIORITY_EPSILON: f64 = 1e-6;

/// Read-only view of engine state handed to priority policies.
#[derive(Debug, Clone, Copy)]
pub struct PriorityContext<'a> {
    /// Index of the frontier that discovered the vertex.
    pub frontier: usize,
    /// Current adaptive phase.
    pub phase: Phase,
    /// All frontiers. Empty while seeds are being prioritised.
    pub frontiers: &'a [FrontierState],
    /// Neighbour lists of every vertex expanded so far. Left empty for
    /// policies that do not use it.
    pub neighbor_cache: &'a HashMap<VertexId, Vec<Neighbor>>,
    /// Salience attributed to vertices by discovered paths.
    pub salience_feedback: &'a HashMap<VertexId, f64>,
}

/// A pluggable priority function.
pub trait PriorityPolicy: Send {
    /// Short identifier, for logs and results.
    fn name(&self) -> &'static str;

    /// Priority of `vertex`; lower is expanded sooner.
    fn priority<P: GraphProvider>(
        &mut self,
        vertex: &VertexId,
        ctx: &PriorityContext<'_>,
        provider: &P,
    ) -> Result<f64, P::Error>;

    /// Whether priorities depend on the adaptive phase, so queued vertices
    /// should be re-scored when it changes.
    fn phase_sensitive(&self) -> bool {
        false
    }

    /// Whether the policy reads `PriorityContext::neighbor_cache`. The
    /// engine only caches neighbour lists for policies that do.
    fn uses_neighbor_cache(&self) -> bool {
        false
    }
}

/// Degree divided by node weight. Hub-avoiding.
///
/// ```text
/// priority = (out_degree + in_degree) / (weight + PRIORITY_EPSILON)
/// ```
#[derive(Debug, Clone, Default)]
pub struct DegreePriority {
    weights: Option<NodeWeights>,
}

impl DegreePriority {
    /// Unweighted degree priority.
    pub fn new() -> Self {
        Self::default()
    }

    /// Degree priority normalised by `weights`.
    pub fn with_weights(weights: NodeWeights) -> Self {
        Self {
            weights: Some(weights),
        }
    }
}

impl PriorityPolicy for DegreePriority {
    fn name(&self) -> &'static str {
        "degree"
    }

    fn priority<P: GraphProvider>(
        &mut self,
        vertex: &VertexId,
        _ctx: &PriorityContext<'_>,
        provider: &P,
    ) -> Result<f64, P::Error> {
        provider.priority(vertex, self.weights.as_ref())
    }
}

/// Base-2 Shannon entropy of a count distribution.
pub fn shannon_entropy<I>(counts: I) -> f64
where
    I: IntoIterator<Item = usize>,
{
    let counts: Vec<usize> = counts.into_iter().filter(|&c| c > 0).collect();
    let total: usize = counts.iter().sum();
    if total == 0 {
        return 0.0;
    }
    let total = total as f64;
    counts
        .iter()
        .map(|&c| {
            let p = c as f64 / total;
            -p * p.log2()
        })
        .sum()
}

/// Heterogeneity-aware priority.
///
/// ```text
/// priority = ln(degree + 1) / (H_local + PRIORITY_EPSILON)
/// ```
///
/// `H_local` is the entropy of relationship labels around the vertex.
/// Homogeneous neighbourhoods (entropy 0) get very large, finite values
/// and are deferred, steering expansion towards heterogeneous regions.
#[derive(Debug, Clone, Default)]
pub struct EntropyPriority {
    cache: HashMap<VertexId, f64>,
}

impl EntropyPriority {
    /// Create a policy with an empty entropy cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Local label entropy of `vertex`.
    ///
    /// Asks the provider first, then the engine's neighbour cache. Only
    /// values computed from real label data are cached; with no data the
    /// entropy is 0 and may be refined later.
    pub fn local_entropy<P: GraphProvider>(
        &mut self,
        vertex: &VertexId,
        ctx: &PriorityContext<'_>,
        provider: &P,
    ) -> Result<f64, P::Error> {
        if let Some(&h) = self.cache.get(vertex) {
            return Ok(h);
        }

        let reported = provider.label_histogram(vertex)?;
        let histogram: Option<BTreeMap<RelationLabel, usize>> = match reported {
            Some(h) => Some(h),
            None => ctx.neighbor_cache.get(vertex).map(|neighbors| {
                let mut h = BTreeMap::new();
                for n in neighbors {
                    *h.entry(n.label.clone()).or_insert(0) += 1;
                }
                h
            }),
        };

        match histogram {
            Some(h) => {
                let entropy = shannon_entropy(h.into_values());
                self.cache.insert(vertex.clone(), entropy);
                Ok(entropy)
            }
            None => Ok(0.0),
        }
    }

    /// Number of cached entropy values.
    pub fn cached(&self) -> usize {
        self.cache.len()
    }
}

impl PriorityPolicy for EntropyPriority {
    fn name(&self) -> &'static str {
        "entropy"
    }

    fn priority<P: GraphProvider>(
        &mut self,
        vertex: &VertexId,
        ctx: &PriorityContext<'_>,
        provider: &P,
    ) -> Result<f64, P::Error> {
        let degree = provider.degree(vertex)? as f64;
        let entropy = self.local_entropy(vertex, ctx, provider)?;
        Ok((degree + 1.0).ln() / (entropy + PRIORITY_EPSILON))
    }

    fn uses_neighbor_cache(&self) -> bool {
        true
    }
}

/// Path-potential priority with salience feedback.
///
/// Discovery phase:
///
/// ```text
/// priority = degree / (1 + path_potential)
/// ```
///
/// where path potential counts the vertex's known neighbours that other
/// frontiers have already visited. In Exploitation and Stability the
/// result is further divided by `1 + lambda * salience_feedback(v)`.
#[derive(Debug, Clone)]
pub struct PathPotentialPriority {
    feedback_weight: f64,
}

impl PathPotentialPriority {
    /// Create a policy with salience feedback weight `lambda`.
    pub fn new(feedback_weight: f64) -> Self {
        Self {
            feedback_weight: feedback_weight.max(0.0),
        }
    }

    /// Known neighbours of `vertex` visited by a frontier other than the
    /// active one.
    pub fn path_potential(vertex: &VertexId, ctx: &PriorityContext<'_>) -> usize {
        let Some(neighbors) = ctx.neighbor_cache.get(vertex) else {
            return 0;
        };
        neighbors
            .iter()
            .filter(|n| {
                ctx.frontiers
                    .iter()
                    .any(|f| f.index() != ctx.frontier && f.has_visited(&n.target))
            })
            .count()
    }
}

impl Default for PathPotentialPriority {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl PriorityPolicy for PathPotentialPriority {
    fn name(&self) -> &'static str {
        "path_potential"
    }

    fn priority<P: GraphProvider>(
        &mut self,
        vertex: &VertexId,
        ctx: &PriorityContext<'_>,
        provider: &P,
    ) -> Result<f64, P::Error> {
        let degree = provider.degree(vertex)? as f64;
        let base = degree / (1.0 + Self::path_potential(vertex, ctx) as f64);

        match ctx.phase {
            Phase::Discovery => Ok(base),
            Phase::Exploitation | Phase::Stability => {
                let feedback = ctx.salience_feedback.get(vertex).copied().unwrap_or(0.0);
                Ok(base / (1.0 + self.feedback_weight * feedback))
            }
        }
    }

    fn phase_sensitive(&self) -> bool {
        true
    }

    fn uses_neighbor_cache(&self) -> bool {
        true
    }
}

/// First discovered, first expanded. Gives breadth-first order per frontier.
#[derive(Debug, Clone, Default)]
pub struct DiscoveryOrderPriority {
    counter: u64,
}

impl DiscoveryOrderPriority {
    /// Create a policy starting at 0.
    pub fn new() -> Self {
        Self::default()
    }
}

impl PriorityPolicy for DiscoveryOrderPriority {
    fn name(&self) -> &'static str {
        "discovery_order"
    }

    fn priority<P: GraphProvider>(
        &mut self,
        _vertex: &VertexId,
        _ctx: &PriorityContext<'_>,
        _provider: &P,
    ) -> Result<f64, P::Error> {
        let priority = self.counter as f64;
        self.counter += 1;
        Ok(priority)
    }
}

/// Deterministic pseudo-random order: xxh64 of the vertex id, scaled to
/// `[0, 1)`.
#[derive(Debug, Clone, Default)]
pub struct HashedPriority {
    seed: u64,
}

impl HashedPriority {
    /// Create a policy with the given hash seed.
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }
}

impl PriorityPolicy for HashedPriority {
    fn name(&self) -> &'static str {
        "hashed"
    }

    fn priority<P: GraphProvider>(
        &mut self,
        vertex: &VertexId,
        _ctx: &PriorityContext<'_>,
        _provider: &P,
    ) -> Result<f64, P::Error> {
        let hash = xxh64(vertex.as_str().as_bytes(), self.seed);
        Ok((hash >> 11) as f64 / (1u64 << 53) as f64)
    }
}
