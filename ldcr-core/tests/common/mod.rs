//! Helpers shared by the integration suites.

use ldcr_core::{DcrGraph, GraphBuilder, MemoryJournal, SeededRandom};

/// Graph type produced by [`GraphBuilder::build`].
pub type Graph = DcrGraph<SeededRandom, MemoryJournal>;

/// Builds and seeds a graph with one probability shared by every cluster.
#[must_use]
pub fn seeded_graph(sizes: &[usize], p_in: f64, p_out: f64, seed: u64) -> Graph {
    let mut graph = GraphBuilder::new()
        .with_p_out(p_out)
        .with_rng_seed(seed)
        .build()
        .expect("builder parameters are valid");
    graph
        .init_erdos_renyi(sizes, &vec![p_in; sizes.len()])
        .expect("initial clustering is valid");
    graph
}

/// Panics with every violation when the graph is inconsistent.
pub fn assert_valid(graph: &Graph, context: &str) {
    let violations = graph.invariants().collect_all();
    assert!(
        violations.is_empty(),
        "{context}: {} violation(s): {violations:?}",
        violations.len()
    );
}
