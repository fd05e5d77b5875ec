//! Multi-frontier expansion engine.
//!
//! Grows one frontier per seed. Each iteration expands the single most
//! favoured queued vertex across all frontiers, records what it reaches,
//! and detects paths wherever two frontiers meet.

use chrono::Utc;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info, info_span, trace, Instrument};
use uuid::Uuid;

use crate::canonical::canonical_hash_hex;
use crate::frontier::FrontierState;
use crate::overlap::OverlapGraph;
use crate::path::{reconstruct, Reconstruction};
use crate::policy::{
    AdaptiveConfig, AdaptiveTermination, DegreePriority, EntropyPriority, ExpansionConfig,
    FrontierExhaustion, PathPotentialPriority, Phase, PriorityContext, PriorityPolicy,
    TerminationContext, TerminationPolicy, TransitiveConnectivity,
};
use crate::provider::GraphProvider;
use crate::salience::path_salience;
use crate::types::{
    edge_key, ExpansionResult, ExpansionStats, HubEncounterStats, Neighbor, PathRecord,
    PathSignature, TerminationReason, VertexId,
};

/// Error type for engine operations.
#[derive(Debug, thiserror::Error)]
pub enum ExpansionError {
    /// No seeds were supplied.
    #[error("Seed list is empty")]
    EmptySeedList,
    /// The graph provider failed. The run cannot be resumed.
    #[error("Provider error: {0}")]
    Provider(String),
    /// A configuration document could not be parsed.
    #[error("Config error: {0}")]
    Config(#[from] serde_json::Error),
}

impl ExpansionError {
    /// Create a provider error from any error type.
    pub fn from_provider<E: std::error::Error>(e: E) -> Self {
        Self::Provider(e.to_string())
    }
}

/// Mutable bookkeeping owned by one run.
#[derive(Debug)]
struct RunState {
    frontiers: Vec<FrontierState>,
    /// First frontier to discover each vertex. Written once per key.
    owners: HashMap<VertexId, usize>,
    signatures: HashSet<PathSignature>,
    paths: Vec<PathRecord>,
    discovery_iteration: HashMap<VertexId, usize>,
    hub_positions: BTreeMap<VertexId, usize>,
    sampled_edges: BTreeSet<String>,
    neighbor_cache: HashMap<VertexId, Vec<Neighbor>>,
    salience_feedback: HashMap<VertexId, f64>,
    overlap: OverlapGraph,
    stats: ExpansionStats,
}

impl RunState {
    fn new(seeds: &[VertexId]) -> Self {
        let mut owners = HashMap::new();
        let mut discovery_iteration = HashMap::new();
        let frontiers = seeds
            .iter()
            .enumerate()
            .map(|(index, seed)| {
                owners.entry(seed.clone()).or_insert(index);
                discovery_iteration.entry(seed.clone()).or_insert(0);
                FrontierState::new(index, seed.clone(), 0.0)
            })
            .collect();

        Self {
            frontiers,
            owners,
            signatures: HashSet::new(),
            paths: Vec::new(),
            discovery_iteration,
            hub_positions: BTreeMap::new(),
            sampled_edges: BTreeSet::new(),
            neighbor_cache: HashMap::new(),
            salience_feedback: HashMap::new(),
            overlap: OverlapGraph::new(seeds.len()),
            stats: ExpansionStats::default(),
        }
    }

    fn priority_context(&self, frontier: usize, phase: Phase) -> PriorityContext<'_> {
        PriorityContext {
            frontier,
            phase,
            frontiers: &self.frontiers,
            neighbor_cache: &self.neighbor_cache,
            salience_feedback: &self.salience_feedback,
        }
    }

    fn termination_context(&self) -> TerminationContext<'_> {
        TerminationContext {
            frontiers: &self.frontiers,
            paths: &self.paths,
            overlap: &self.overlap,
            stats: &self.stats,
        }
    }

    /// Non-empty frontier with the smallest head priority; lowest index
    /// wins ties.
    fn select_frontier(&self) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for frontier in &self.frontiers {
            if frontier.is_exhausted() {
                continue;
            }
            let head = frontier.peek_priority();
            match best {
                Some((_, best_head)) if head >= best_head || head.is_nan() => {}
                _ => best = Some((frontier.index(), head)),
            }
        }
        best.map(|(index, _)| index)
    }

    /// Attribute a path's salience to its members (full) and their known
    /// neighbours (half), keeping the maximum seen per vertex.
    fn spread_salience(&mut self, nodes: &[VertexId], salience: f64) {
        let raise = |vertex: &VertexId, value: f64, feedback: &mut HashMap<VertexId, f64>| {
            let entry = feedback.entry(vertex.clone()).or_insert(0.0);
            if value > *entry {
                *entry = value;
            }
        };
        for node in nodes {
            raise(node, salience, &mut self.salience_feedback);
            if let Some(neighbors) = self.neighbor_cache.get(node) {
                for neighbor in neighbors {
                    raise(&neighbor.target, salience / 2.0, &mut self.salience_feedback);
                }
            }
        }
    }
}

/// Multi-frontier expansion engine.
///
/// Generic over the graph provider, the priority policy and the
/// termination policy. The defaults give hub-avoiding degree priority run
/// to frontier exhaustion.
///
/// ## Algorithm
///
/// 1. Stop if every frontier is empty, or the termination policy says so
/// 2. Pick the frontier whose head priority is globally smallest
/// 3. Pop its head `v`; stop if the vertex budget is spent
/// 4. Fetch `v`'s neighbours from the provider (the one await)
/// 5. For each neighbour this frontier has not visited:
///    - record the edge, visit it, set its parent to `v`
///    - if another frontier already owns it, reconstruct and keep the path
///    - claim ownership if nobody owns it yet
///    - queue it under the priority policy
///
/// Ownership is read before it is written in step 5, so the frontier that
/// discovers a vertex second always sees the first frontier's claim.
///
/// ## State
///
/// All mutable state belongs to the engine value and `run` consumes it,
/// so concurrent runs never share state and a failed run cannot be
/// resumed.
pub struct ExpansionEngine<P, Q = DegreePriority, T = FrontierExhaustion>
where
    P: GraphProvider,
    Q: PriorityPolicy,
    T: TerminationPolicy,
{
    provider: Arc<P>,
    seeds: Vec<VertexId>,
    config: ExpansionConfig,
    priority: Q,
    termination: T,
    state: RunState,
}

impl<P: GraphProvider> ExpansionEngine<P> {
    /// Degree priority (weighted by `config.node_weights`) run to frontier
    /// exhaustion.
    pub fn new(
        provider: Arc<P>,
        seeds: Vec<VertexId>,
        config: ExpansionConfig,
    ) -> Result<Self, ExpansionError> {
        let priority = if config.node_weights.is_empty() {
            DegreePriority::new()
        } else {
            DegreePriority::with_weights(config.node_weights.clone())
        };
        Self::with_policies(provider, seeds, config, priority, FrontierExhaustion)
    }
}

impl<P: GraphProvider> ExpansionEngine<P, EntropyPriority, TransitiveConnectivity> {
    /// Entropy-guided priority, stopping once all seeds are linked.
    pub fn entropy_guided(
        provider: Arc<P>,
        seeds: Vec<VertexId>,
        config: ExpansionConfig,
    ) -> Result<Self, ExpansionError> {
        Self::with_policies(
            provider,
            seeds,
            config,
            EntropyPriority::new(),
            TransitiveConnectivity,
        )
    }
}

impl<P: GraphProvider> ExpansionEngine<P, PathPotentialPriority, AdaptiveTermination> {
    /// Path-potential priority with salience feedback and three-phase
    /// adaptive termination.
    pub fn adaptive(
        provider: Arc<P>,
        seeds: Vec<VertexId>,
        config: ExpansionConfig,
        adaptive: AdaptiveConfig,
    ) -> Result<Self, ExpansionError> {
        let priority = PathPotentialPriority::new(adaptive.salience_feedback_weight);
        Self::with_policies(
            provider,
            seeds,
            config,
            priority,
            AdaptiveTermination::new(adaptive),
        )
    }
}

impl<P, Q, T> ExpansionEngine<P, Q, T>
where
    P: GraphProvider,
    Q: PriorityPolicy,
    T: TerminationPolicy,
{
    /// Create an engine with explicit policies.
    ///
    /// Fails only if `seeds` is empty. Each seed starts its own frontier;
    /// a seed listed twice is owned by its first index.
    pub fn with_policies(
        provider: Arc<P>,
        seeds: Vec<VertexId>,
        config: ExpansionConfig,
        priority: Q,
        termination: T,
    ) -> Result<Self, ExpansionError> {
        if seeds.is_empty() {
            return Err(ExpansionError::EmptySeedList);
        }
        let state = RunState::new(&seeds);
        Ok(Self {
            provider,
            seeds,
            config,
            priority,
            termination,
            state,
        })
    }

    /// Replace the priority policy.
    pub fn with_priority<Q2: PriorityPolicy>(self, priority: Q2) -> ExpansionEngine<P, Q2, T> {
        ExpansionEngine {
            provider: self.provider,
            seeds: self.seeds,
            config: self.config,
            priority,
            termination: self.termination,
            state: self.state,
        }
    }

    /// Replace the termination policy.
    pub fn with_termination<T2: TerminationPolicy>(
        self,
        termination: T2,
    ) -> ExpansionEngine<P, Q, T2> {
        ExpansionEngine {
            provider: self.provider,
            seeds: self.seeds,
            config: self.config,
            priority: self.priority,
            termination,
            state: self.state,
        }
    }

    /// Seeds in frontier-index order.
    pub fn seeds(&self) -> &[VertexId] {
        &self.seeds
    }

    /// Get the config.
    pub fn config(&self) -> &ExpansionConfig {
        &self.config
    }

    /// Get a reference to the provider.
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Current frontier states.
    pub fn frontiers(&self) -> &[FrontierState] {
        &self.state.frontiers
    }

    /// Run the expansion to completion.
    ///
    /// Provider errors abort the run and are returned as
    /// [`ExpansionError::Provider`].
    pub async fn run(mut self) -> Result<ExpansionResult, ExpansionError> {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        let span = info_span!(
            "expansion_run",
            %run_id,
            seeds = self.seeds.len(),
            priority = self.priority.name(),
            termination = self.termination.name(),
        );

        let termination = self.expand().instrument(span.clone()).await?;
        let result = self.finish(run_id, started_at, termination);

        span.in_scope(|| {
            info!(
                termination = %result.termination,
                vertices_expanded = result.stats.vertices_expanded,
                edges_traversed = result.stats.edges_traversed,
                paths = result.paths.len(),
                sampled_nodes = result.sampled_nodes.len(),
                "Expansion finished"
            )
        });
        Ok(result)
    }

    async fn expand(&mut self) -> Result<TerminationReason, ExpansionError> {
        info!(config = self.config.config_id(), "Starting expansion");

        loop {
            if self.state.frontiers.iter().all(FrontierState::is_exhausted) {
                return Ok(TerminationReason::FrontiersExhausted);
            }

            let phase_before = self.termination.phase();
            let stop = self.termination.should_stop(&self.state.termination_context());
            let phase_after = self.termination.phase();
            if phase_after != phase_before && self.priority.phase_sensitive() {
                self.reprioritize(phase_after)?;
            }
            if stop {
                return Ok(TerminationReason::PolicySatisfied);
            }

            let Some(active) = self.state.select_frontier() else {
                return Ok(TerminationReason::FrontiersExhausted);
            };
            let Some((vertex, priority)) = self.state.frontiers[active].pop() else {
                return Ok(TerminationReason::FrontiersExhausted);
            };
            self.state.stats.iterations += 1;

            if let Some(max) = self.config.max_vertices {
                if self.state.stats.vertices_expanded >= max {
                    debug!(max_vertices = max, "Vertex budget exhausted");
                    return Ok(TerminationReason::BudgetExhausted);
                }
            }
            self.state.stats.vertices_expanded += 1;
            self.record_degree(&vertex)?;

            trace!(frontier = active, vertex = %vertex, priority, "Expanding vertex");

            let neighbors = self
                .provider
                .neighbors(&vertex)
                .await
                .map_err(ExpansionError::from_provider)?;
            if self.priority.uses_neighbor_cache() {
                self.state
                    .neighbor_cache
                    .insert(vertex.clone(), neighbors.clone());
            }

            for neighbor in &neighbors {
                self.visit(active, &vertex, neighbor)?;
            }
        }
    }

    fn record_degree(&mut self, vertex: &VertexId) -> Result<(), ExpansionError> {
        let degree = self
            .provider
            .degree(vertex)
            .map_err(ExpansionError::from_provider)?;
        self.state.stats.record_degree(degree);

        if let Some(threshold) = self.config.hub_degree_threshold {
            if degree >= threshold {
                let position = self.state.stats.vertices_expanded;
                self.state
                    .hub_positions
                    .entry(vertex.clone())
                    .or_insert(position);
            }
        }
        Ok(())
    }

    /// Process one neighbour of the vertex being expanded by `active`.
    fn visit(
        &mut self,
        active: usize,
        source: &VertexId,
        neighbor: &Neighbor,
    ) -> Result<(), ExpansionError> {
        let target = &neighbor.target;
        if self.state.frontiers[active].has_visited(target) {
            return Ok(());
        }

        self.state.stats.edges_traversed += 1;
        self.provider
            .record_edge(source, target, &neighbor.label)
            .map_err(ExpansionError::from_provider)?;
        self.state.sampled_edges.insert(edge_key(source, target));

        self.state.frontiers[active].discover(
            target.clone(),
            source.clone(),
            neighbor.label.clone(),
        );

        let iteration = self.state.stats.iterations;
        self.state
            .discovery_iteration
            .entry(target.clone())
            .or_insert(iteration);

        // Read ownership before claiming it.
        if let Some(&owner) = self.state.owners.get(target) {
            if owner != active {
                self.on_meeting(target, active, owner)?;
            }
        }
        self.state.owners.entry(target.clone()).or_insert(active);

        let phase = self.termination.phase();
        let priority = self
            .priority
            .priority(target, &self.state.priority_context(active, phase), &*self.provider)
            .map_err(ExpansionError::from_provider)?;
        self.state.frontiers[active].enqueue(target.clone(), priority);
        Ok(())
    }

    /// Handle `meeting`, just discovered by `active` and owned by `owner`.
    fn on_meeting(
        &mut self,
        meeting: &VertexId,
        active: usize,
        owner: usize,
    ) -> Result<(), ExpansionError> {
        if self.state.overlap.record(active, owner) {
            debug!(frontier_a = active, frontier_b = owner, meeting = %meeting, "Frontiers met");
        }

        let nodes = match reconstruct(
            meeting,
            &self.state.frontiers[active],
            &self.state.frontiers[owner],
        ) {
            Reconstruction::Path(nodes) => nodes,
            rejected => {
                self.state.stats.invalid_paths_rejected += 1;
                trace!(
                    meeting = %meeting,
                    reason = ?rejected,
                    "Meeting point yields no simple path"
                );
                return Ok(());
            }
        };

        let mut record = PathRecord::canonical(active, owner, nodes);
        let signature = record.signature();
        if self.state.signatures.contains(&signature) {
            self.state.stats.duplicate_paths_rejected += 1;
            trace!(signature = %signature.digest(), "Duplicate path");
            return Ok(());
        }

        let degrees = record
            .nodes
            .iter()
            .map(|node| self.provider.degree(node))
            .collect::<Result<Vec<_>, _>>()
            .map_err(ExpansionError::from_provider)?;
        record.salience = path_salience(&degrees);

        self.state.signatures.insert(signature);
        self.state.spread_salience(&record.nodes, record.salience);
        self.state.stats.paths_found += 1;
        self.termination.on_path(&record);
        debug!(
            from_seed = record.from_seed,
            to_seed = record.to_seed,
            hops = record.hops(),
            salience = record.salience,
            "Path found"
        );
        self.state.paths.push(record);
        Ok(())
    }

    /// Re-score every queued vertex after a phase change.
    fn reprioritize(&mut self, phase: Phase) -> Result<(), ExpansionError> {
        debug!(phase = %phase, "Re-scoring frontier queues");
        for index in 0..self.state.frontiers.len() {
            let queued = self.state.frontiers[index].queued_vertices();
            let mut scores: HashMap<VertexId, f64> = HashMap::with_capacity(queued.len());
            for vertex in queued {
                let score = self
                    .priority
                    .priority(&vertex, &self.state.priority_context(index, phase), &*self.provider)
                    .map_err(ExpansionError::from_provider)?;
                scores.insert(vertex, score);
            }
            self.state.frontiers[index]
                .reprioritize(|vertex| scores.get(vertex).copied().unwrap_or(f64::INFINITY));
        }
        Ok(())
    }

    fn finish(
        self,
        run_id: Uuid,
        started_at: chrono::DateTime<Utc>,
        termination: TerminationReason,
    ) -> ExpansionResult {
        let final_phase = self.termination.phase();
        let priority_policy = self.priority.name().to_string();
        let termination_policy = self.termination.name().to_string();
        let params_hash = match self.termination.params_hash() {
            Some(policy_hash) => canonical_hash_hex(&(self.config.params_hash(), policy_hash)),
            None => self.config.params_hash(),
        };
        let hub_threshold = self.config.hub_degree_threshold;

        let mut state = self.state;
        if let Some(threshold) = hub_threshold {
            state.stats.hubs = Some(HubEncounterStats::from_positions(
                threshold,
                &state.hub_positions,
                state.stats.vertices_expanded,
            ));
        }

        let frontier_visited: Vec<BTreeSet<VertexId>> = state
            .frontiers
            .into_iter()
            .map(|f| f.into_visited().into_iter().collect())
            .collect();
        let sampled_nodes: BTreeSet<VertexId> = frontier_visited
            .iter()
            .flat_map(|visited| visited.iter().cloned())
            .collect();

        ExpansionResult {
            run_id,
            started_at,
            finished_at: Utc::now(),
            seeds: self.seeds,
            priority_policy,
            termination_policy,
            params_hash,
            schema_version: crate::FRONTIER_KERNEL_SCHEMA_VERSION.to_string(),
            paths: state.paths,
            sampled_nodes,
            sampled_edges: state.sampled_edges,
            frontier_visited,
            stats: state.stats,
            discovery_iteration: state.discovery_iteration.into_iter().collect(),
            hub_encounters: state.hub_positions,
            overlap: state.overlap,
            termination,
            final_phase,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::InMemoryGraphProvider;

    fn v(id: &str) -> VertexId {
        VertexId::from(id)
    }

    fn feedback(state: &RunState, id: &str) -> Option<f64> {
        state.salience_feedback.get(&v(id)).copied()
    }

    #[test]
    fn test_spread_salience_members_full_neighbours_half() {
        let mut state = RunState::new(&[v("a"), v("b")]);
        state
            .neighbor_cache
            .insert(v("m"), vec![Neighbor::new("x", "r"), Neighbor::new("y", "r")]);
        state.neighbor_cache.insert(v("a"), vec![Neighbor::new("m", "r")]);

        state.spread_salience(&[v("a"), v("m"), v("b")], 0.8);
        assert_eq!(feedback(&state, "a"), Some(0.8));
        // Also a neighbour of `a`, but membership wins.
        assert_eq!(feedback(&state, "m"), Some(0.8));
        assert_eq!(feedback(&state, "b"), Some(0.8));
        assert_eq!(feedback(&state, "x"), Some(0.4));
        assert_eq!(feedback(&state, "y"), Some(0.4));
        assert_eq!(feedback(&state, "z"), None);
    }

    #[test]
    fn test_spread_salience_keeps_maximum() {
        let mut state = RunState::new(&[v("a"), v("b")]);
        state
            .neighbor_cache
            .insert(v("m"), vec![Neighbor::new("x", "r")]);

        state.spread_salience(&[v("a"), v("m"), v("b")], 0.8);
        state.spread_salience(&[v("a"), v("m"), v("b")], 0.2);
        assert_eq!(feedback(&state, "m"), Some(0.8));
        assert_eq!(feedback(&state, "x"), Some(0.4));

        state.spread_salience(&[v("x")], 0.6);
        assert_eq!(feedback(&state, "x"), Some(0.6));
    }

    #[tokio::test]
    async fn test_neighbor_cache_only_filled_when_used() {
        let graph = Arc::new(InMemoryGraphProvider::from_edges([
            ("A", "B", "r"),
            ("B", "C", "s"),
        ]));
        let seeds = vec![v("A"), v("C")];

        let mut degree =
            ExpansionEngine::new(graph.clone(), seeds.clone(), ExpansionConfig::default())
                .unwrap();
        degree.expand().await.unwrap();
        assert!(degree.state.stats.vertices_expanded > 0);
        assert!(degree.state.neighbor_cache.is_empty());

        let mut entropy = ExpansionEngine::new(graph, seeds, ExpansionConfig::default())
            .unwrap()
            .with_priority(EntropyPriority::new());
        entropy.expand().await.unwrap();
        assert!(entropy.state.neighbor_cache.contains_key(&v("A")));
        assert!(entropy.state.neighbor_cache.contains_key(&v("B")));
    }
}
