//! Structural invariant checks for the dynamic clustered graph.
//!
//! The checkers are surfaced via [`DcrGraph::invariants`] so property-based
//! and integration tests can assert graph health after each operation without
//! reimplementing internal bookkeeping.

mod counts;
mod edges;
mod indices;
mod operations;
mod weights;

use std::collections::BTreeMap;

use thiserror::Error;

use crate::{
    adjacency,
    arena::Arena,
    cluster::{ClusterId, ClusterRef, OrdinaryCluster, PseudoCluster},
    clustering::{ClusterList, GroundTruth},
    graph::DcrGraph,
    node::{Node, NodeId},
    operation::{ClusterOperation, OperationId},
    selection_tree::SelectionTree,
};

use self::{
    counts::{check_edge_counts, check_max_intra_total},
    edges::{check_edge_symmetry, check_reference_only_isolation},
    indices::check_index_validity,
    operations::check_crossing_counts,
    weights::check_tree_weights,
};

/// Enumerates the structural invariants maintained by [`DcrGraph`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum GraphInvariant {
    /// Every stored edge has its twin at the other endpoint and the edge
    /// kind matches the ground-truth clusters of its endpoints.
    EdgeSymmetry,
    /// Per-cluster counters, samplers and the pseudo cluster agree on the
    /// number of intra- and inter-cluster edges.
    EdgeCounts,
    /// Both global trees hold exactly the weights their clusters report.
    TreeWeights,
    /// Every stored slot, view index and free-list index points back at its
    /// owner.
    IndexValidity,
    /// Clusters visible only in the reference view hold no edges.
    ReferenceOnlyIsolation,
    /// The running pair total equals the pairs inside ground-truth clusters.
    MaxIntraTotal,
    /// Each running split or merge counts exactly the edges joining its two
    /// halves.
    CrossingCount,
}

impl GraphInvariant {
    /// Returns all invariants in the order they should be evaluated.
    #[must_use]
    pub const fn all() -> [Self; 7] {
        [
            Self::IndexValidity,
            Self::EdgeSymmetry,
            Self::EdgeCounts,
            Self::ReferenceOnlyIsolation,
            Self::MaxIntraTotal,
            Self::CrossingCount,
            Self::TreeWeights,
        ]
    }
}

/// Which global selection tree a weight violation concerns.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TreeKind {
    /// Tree drawing the cluster of the next edge insertion.
    Insertion,
    /// Tree drawing the cluster of the next edge deletion.
    Deletion,
}

/// Reports an invariant violation surfaced by [`GraphInvariantChecker`].
///
/// Node and cluster numbers are journal identifiers.
#[derive(Clone, Debug, Error, PartialEq)]
#[non_exhaustive]
pub enum GraphInvariantViolation {
    /// An adjacency entry lacks its counterpart at the other endpoint.
    #[error("edge {origin}->{target} is missing its twin")]
    MissingTwin {
        /// Node holding the one-way entry.
        origin: u64,
        /// Node lacking the reverse entry.
        target: u64,
    },
    /// An edge is stored under the wrong kind for its endpoints' clusters.
    #[error("edge {origin}->{target} is stored as {stored} but its endpoints say otherwise")]
    MisclassifiedEdge {
        /// First endpoint.
        origin: u64,
        /// Second endpoint.
        target: u64,
        /// Kind the edge is stored under.
        stored: &'static str,
    },
    /// An adjacency entry has no matching pair in the pseudo cluster.
    #[error("edge {origin}-{target} is absent from the graph-wide sampler")]
    UnsampledEdge {
        /// First endpoint.
        origin: u64,
        /// Second endpoint.
        target: u64,
    },
    /// Two bookkeeping sources disagree on a count.
    #[error("{quantity}: expected {expected}, found {actual}")]
    CountMismatch {
        /// What was counted.
        quantity: &'static str,
        /// Count derived from the primary structure.
        expected: u64,
        /// Count reported by the secondary structure.
        actual: u64,
    },
    /// A tree entry carries a stale weight.
    #[error("{tree:?} weight of cluster {cluster} is {actual}, expected {expected}")]
    WeightMismatch {
        /// Tree holding the entry.
        tree: TreeKind,
        /// Cluster owning the entry; zero stands for the pseudo cluster.
        cluster: u64,
        /// Weight the cluster reports.
        expected: f64,
        /// Weight stored in the tree.
        actual: f64,
    },
    /// A cluster lacks a tree entry or keeps one it should not have.
    #[error("{tree:?} tree entry of cluster {cluster} is {state}")]
    TreeEntry {
        /// Tree concerned.
        tree: TreeKind,
        /// Cluster concerned; zero stands for the pseudo cluster.
        cluster: u64,
        /// Description of the faulty state.
        state: &'static str,
    },
    /// A stored index does not point back at its owner.
    #[error("{structure} index of {owner} is {index:?}, which points elsewhere")]
    DanglingIndex {
        /// Structure holding the index.
        structure: &'static str,
        /// Node or cluster the index belongs to.
        owner: u64,
        /// Offending index, if any was stored.
        index: Option<usize>,
    },
    /// A running operation's crossing counter drifted from the edges that
    /// actually join its halves.
    #[error("operation {operation} counts {counted} crossing edges but {actual} exist")]
    CrossingMismatch {
        /// Operation index.
        operation: u64,
        /// Value of the incremental counter.
        counted: u64,
        /// Edges found between the two halves.
        actual: u64,
    },
    /// A reference-only cluster still holds edges.
    #[error("reference-only cluster {cluster} holds {edges} edge entries")]
    ReferenceOnlyEdges {
        /// Offending cluster.
        cluster: u64,
        /// Number of stored intra and inter entries.
        edges: u64,
    },
}

/// Helper returned by [`DcrGraph::invariants`] to run structural checks.
#[derive(Debug)]
pub struct GraphInvariantChecker<'graph> {
    ctx: GraphContext<'graph>,
}

impl<'graph> GraphInvariantChecker<'graph> {
    pub(crate) const fn new(ctx: GraphContext<'graph>) -> Self {
        Self { ctx }
    }

    /// Runs all invariants, returning the first violation encountered.
    ///
    /// # Errors
    /// Returns the first [`GraphInvariantViolation`] found.
    ///
    /// # Examples
    /// ```
    /// use ldcr_core::GraphBuilder;
    ///
    /// let mut graph = GraphBuilder::new().with_rng_seed(3).build()?;
    /// graph.init_erdos_renyi(&[5, 5], &[0.5, 0.5])?;
    /// graph.split()?;
    /// graph.invariants().check_all().expect("graph must be valid");
    /// # Ok::<(), ldcr_core::GraphError>(())
    /// ```
    pub fn check_all(&self) -> Result<(), GraphInvariantViolation> {
        self.check_many(GraphInvariant::all())
    }

    /// Runs a custom subset of invariants in the provided order.
    ///
    /// # Errors
    /// Returns the first [`GraphInvariantViolation`] found.
    pub fn check_many(
        &self,
        invariants: impl IntoIterator<Item = GraphInvariant>,
    ) -> Result<(), GraphInvariantViolation> {
        self.run_with_mode(invariants, &mut EvaluationMode::FailFast)
    }

    /// Runs a single invariant.
    ///
    /// # Errors
    /// Returns the first [`GraphInvariantViolation`] found.
    pub fn check(&self, invariant: GraphInvariant) -> Result<(), GraphInvariantViolation> {
        self.check_many([invariant])
    }

    /// Executes every invariant and returns the full set of violations.
    #[must_use]
    pub fn collect_all(&self) -> Vec<GraphInvariantViolation> {
        self.collect_many(GraphInvariant::all())
    }

    /// Executes the selected invariants and returns every violation
    /// discovered.
    #[must_use]
    pub fn collect_many(
        &self,
        invariants: impl IntoIterator<Item = GraphInvariant>,
    ) -> Vec<GraphInvariantViolation> {
        let mut violations = Vec::new();
        let mut mode = EvaluationMode::Collect(&mut violations);
        if let Err(violation) = self.run_with_mode(invariants, &mut mode) {
            violations.push(violation);
        }
        violations
    }

    fn run_with_mode(
        &self,
        invariants: impl IntoIterator<Item = GraphInvariant>,
        mode: &mut EvaluationMode<'_>,
    ) -> Result<(), GraphInvariantViolation> {
        for invariant in invariants {
            dispatch(self.ctx, invariant, mode)?;
        }
        Ok(())
    }
}

fn dispatch(
    ctx: GraphContext<'_>,
    invariant: GraphInvariant,
    mode: &mut EvaluationMode<'_>,
) -> Result<(), GraphInvariantViolation> {
    match invariant {
        GraphInvariant::EdgeSymmetry => check_edge_symmetry(ctx, mode),
        GraphInvariant::EdgeCounts => check_edge_counts(ctx, mode),
        GraphInvariant::TreeWeights => check_tree_weights(ctx, mode),
        GraphInvariant::IndexValidity => check_index_validity(ctx, mode),
        GraphInvariant::ReferenceOnlyIsolation => check_reference_only_isolation(ctx, mode),
        GraphInvariant::MaxIntraTotal => check_max_intra_total(ctx, mode),
        GraphInvariant::CrossingCount => check_crossing_counts(ctx, mode),
    }
}

/// Borrowed view of the graph parts the checks inspect.
#[derive(Clone, Copy, Debug)]
pub(crate) struct GraphContext<'a> {
    pub(crate) nodes: &'a Arena<Node>,
    pub(crate) clusters: &'a Arena<OrdinaryCluster>,
    pub(crate) pseudo: &'a PseudoCluster,
    pub(crate) ground_truth: &'a GroundTruth,
    pub(crate) reference: &'a ClusterList,
    pub(crate) insertion_tree: &'a SelectionTree<ClusterRef>,
    pub(crate) deletion_tree: &'a SelectionTree<ClusterRef>,
    pub(crate) operations: &'a BTreeMap<OperationId, ClusterOperation>,
    pub(crate) p_out: f64,
    pub(crate) max_intra_edges: u64,
}

impl<'a> GraphContext<'a> {
    /// Ground-truth clusters that still resolve, paired with their handles.
    fn ground_truth_clusters(self) -> impl Iterator<Item = (ClusterId, &'a OrdinaryCluster)> {
        let clusters = self.clusters;
        self.ground_truth
            .list()
            .clusters()
            .iter()
            .filter_map(move |&id| clusters.get(id).map(|cluster| (id, cluster)))
    }

    fn node_label(self, id: NodeId) -> u64 {
        adjacency::journal_id(self.nodes, id)
    }
}

pub(crate) enum EvaluationMode<'a> {
    FailFast,
    Collect(&'a mut Vec<GraphInvariantViolation>),
}

impl EvaluationMode<'_> {
    fn record(&mut self, violation: GraphInvariantViolation) -> Result<(), GraphInvariantViolation> {
        match self {
            Self::FailFast => Err(violation),
            Self::Collect(sink) => {
                sink.push(violation);
                Ok(())
            }
        }
    }
}

impl<R, J> DcrGraph<R, J> {
    /// Returns a handle for checking structural invariants.
    #[must_use]
    pub fn invariants(&self) -> GraphInvariantChecker<'_> {
        GraphInvariantChecker::new(GraphContext {
            nodes: &self.nodes,
            clusters: &self.clusters,
            pseudo: &self.pseudo,
            ground_truth: &self.ground_truth,
            reference: &self.reference,
            insertion_tree: &self.insertion_tree,
            deletion_tree: &self.deletion_tree,
            operations: &self.operations,
            p_out: self.config.p_out,
            max_intra_edges: self.counters.max_intra_edges,
        })
    }
}
