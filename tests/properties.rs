//! Property tests over random undirected graphs.

use proptest::prelude::*;
use std::collections::{BTreeSet, HashSet, VecDeque};
use std::sync::Arc;

use frontier_kernel::{
    DiscoveryOrderPriority, EntropyPriority, ExpansionConfig, ExpansionEngine, ExpansionResult,
    HashedPriority, InMemoryGraphProvider, PathPotentialPriority, PathSignature, PriorityPolicy,
    TerminationReason, VertexId,
};

const LABELS: [&str; 3] = ["cites", "mentions", "related"];

#[derive(Debug, Clone)]
struct GraphCase {
    vertices: usize,
    edges: Vec<(usize, usize, usize)>,
    seeds: Vec<usize>,
}

fn name(i: usize) -> VertexId {
    VertexId::new(format!("v{i:02}"))
}

fn graph_case() -> impl Strategy<Value = GraphCase> {
    (2usize..14).prop_flat_map(|n| {
        (
            Just(n),
            prop::collection::vec((0..n, 0..n, 0..LABELS.len()), 0..(n * 2)),
            prop::collection::vec(0..n, 1..5),
        )
            .prop_map(|(vertices, edges, seeds)| GraphCase {
                vertices,
                edges,
                seeds,
            })
    })
}

fn build(case: &GraphCase) -> Arc<InMemoryGraphProvider> {
    let mut graph = InMemoryGraphProvider::undirected();
    for i in 0..case.vertices {
        graph.add_vertex(name(i));
    }
    for &(a, b, label) in &case.edges {
        graph.add_edge(name(a), name(b), LABELS[label]);
    }
    Arc::new(graph)
}

/// Vertices reachable from `seed`, by plain BFS over the edge list.
fn component(case: &GraphCase, seed: usize) -> BTreeSet<VertexId> {
    let mut seen = HashSet::from([seed]);
    let mut queue = VecDeque::from([seed]);
    while let Some(current) = queue.pop_front() {
        for &(a, b, _) in &case.edges {
            let next = if a == current {
                b
            } else if b == current {
                a
            } else {
                continue;
            };
            if seen.insert(next) {
                queue.push_back(next);
            }
        }
    }
    seen.into_iter().map(name).collect()
}

fn run_with<Q: PriorityPolicy>(case: &GraphCase, priority: Q) -> ExpansionResult {
    let seeds: Vec<VertexId> = case.seeds.iter().map(|&s| name(s)).collect();
    let engine = ExpansionEngine::new(build(case), seeds, ExpansionConfig::default())
        .unwrap()
        .with_priority(priority);
    tokio::runtime::Runtime::new()
        .unwrap()
        .block_on(engine.run())
        .unwrap()
}

fn run_degree(case: &GraphCase) -> ExpansionResult {
    let seeds: Vec<VertexId> = case.seeds.iter().map(|&s| name(s)).collect();
    let engine = ExpansionEngine::new(build(case), seeds, ExpansionConfig::default()).unwrap();
    tokio::runtime::Runtime::new()
        .unwrap()
        .block_on(engine.run())
        .unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_frontiers_cover_their_components(case in graph_case()) {
        let result = run_degree(&case);
        prop_assert_eq!(result.termination, TerminationReason::FrontiersExhausted);

        let mut expected_expansions = 0;
        for (index, &seed) in case.seeds.iter().enumerate() {
            let reachable = component(&case, seed);
            expected_expansions += reachable.len();
            prop_assert_eq!(&result.frontier_visited[index], &reachable);
        }
        prop_assert_eq!(result.stats.vertices_expanded, expected_expansions);
    }

    #[test]
    fn prop_sampled_nodes_are_union_of_frontiers(case in graph_case()) {
        let result = run_degree(&case);
        let union: BTreeSet<VertexId> = result
            .frontier_visited
            .iter()
            .flat_map(|visited| visited.iter().cloned())
            .collect();
        prop_assert_eq!(result.sampled_nodes, union);
    }

    #[test]
    fn prop_paths_are_simple_and_anchored(case in graph_case()) {
        let result = run_degree(&case);
        for path in &result.paths {
            prop_assert!(path.is_simple());
            prop_assert!(path.from_seed < path.to_seed);
            prop_assert_eq!(path.nodes.first(), Some(&result.seeds[path.from_seed]));
            prop_assert_eq!(path.nodes.last(), Some(&result.seeds[path.to_seed]));
            prop_assert!(path.salience > 0.0 && path.salience <= 1.0);
        }
    }

    #[test]
    fn prop_signatures_unique_and_direction_free(case in graph_case()) {
        let result = run_degree(&case);
        let mut seen = HashSet::new();
        for path in &result.paths {
            let signature = path.signature();
            let mut reversed = path.nodes.clone();
            reversed.reverse();
            prop_assert_eq!(
                &PathSignature::new(path.to_seed, path.from_seed, &reversed),
                &signature
            );
            prop_assert!(seen.insert(signature));
        }
    }

    #[test]
    fn prop_priority_policy_does_not_change_reach(case in graph_case()) {
        let baseline = run_degree(&case).frontier_visited;

        let bfs = run_with(&case, DiscoveryOrderPriority::new());
        prop_assert_eq!(&bfs.frontier_visited, &baseline);
        let hashed = run_with(&case, HashedPriority::new(42));
        prop_assert_eq!(&hashed.frontier_visited, &baseline);
        let entropy = run_with(&case, EntropyPriority::new());
        prop_assert_eq!(&entropy.frontier_visited, &baseline);
        let potential = run_with(&case, PathPotentialPriority::default());
        prop_assert_eq!(&potential.frontier_visited, &baseline);
    }

    #[test]
    fn prop_runs_are_deterministic(case in graph_case()) {
        let first = run_degree(&case);
        let second = run_degree(&case);
        prop_assert_eq!(first.fingerprint(), second.fingerprint());
        prop_assert_eq!(first.stats, second.stats);
    }
}
