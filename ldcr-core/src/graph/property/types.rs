//! Fixtures and operation seeds driving the graph property suite.

use test_strategy::Arbitrary;

/// One step of a generated operation sequence.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Arbitrary)]
pub(super) enum GraphOperationSeed {
    /// Insert a random non-edge.
    #[weight(6)]
    AddEdge,
    /// Delete a random edge.
    #[weight(6)]
    RemoveEdge,
    /// Let the graph pick insertion or deletion.
    #[weight(4)]
    EdgeStep,
    /// Add an isolated node.
    #[weight(2)]
    AddNode,
    /// Add a node wired to the rest of the graph.
    #[weight(2)]
    AddAndConnectNode,
    /// Remove a random node.
    #[weight(2)]
    RemoveNode,
    /// Start a split.
    #[weight(1)]
    Split,
    /// Start a merge.
    #[weight(1)]
    Merge,
    /// Finish complete operations and advance the clock.
    #[weight(2)]
    NextTimeStep,
}

/// Initial layout and parameters of a generated graph.
#[derive(Clone, Debug)]
pub(super) struct GraphFixture {
    /// Expected initial cluster sizes.
    pub sizes: Vec<usize>,
    /// Intra-cluster probability per cluster.
    pub p_in: Vec<f64>,
    /// Inter-cluster probability.
    pub p_out: f64,
    /// Completion weight shared by all operations.
    pub theta: f64,
    /// Seed of the graph's random source.
    pub seed: u64,
}

/// Fixture plus the operations to replay on it.
#[derive(Clone, Debug)]
pub(super) struct GraphPlan {
    /// Graph to start from.
    pub fixture: GraphFixture,
    /// Operations in replay order.
    pub operations: Vec<GraphOperationSeed>,
}
