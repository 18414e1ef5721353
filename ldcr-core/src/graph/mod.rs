//! The dynamic clustered graph.
//!
//! [`DcrGraph`] owns every node and cluster, the graph-wide pseudo cluster,
//! both clustering views, the two global selection trees and the running
//! split and merge operations. Every public mutation either completes fully
//! or, when nothing can be done (no edge left to delete, no cluster eligible
//! for a split), leaves the graph untouched and reports the skip through its
//! return value.

mod edges;
mod init;
mod lifecycle;
mod merge;
mod nodes;
mod queries;
mod split;

use std::collections::BTreeMap;

use crate::{
    adjacency,
    arena::Arena,
    builder::{GraphConfig, PInSampler},
    cluster::{ClusterId, ClusterRef, OrdinaryCluster, PseudoCluster, WeightedCluster},
    clustering::{self, ClusterList, GroundTruth, View},
    error::{GraphError, Result},
    journal::JournalSink,
    node::{Node, NodeId},
    operation::{ClusterOperation, OperationId},
    pair_index::max_edge_count,
    random::RandomSource,
    selection_tree::SelectionTree,
};

/// Running totals maintained alongside the structure.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub(crate) struct Counters {
    pub(crate) time_step: u64,
    pub(crate) small_operations: u64,
    pub(crate) large_operations: u64,
    pub(crate) finished_operations: u64,
    /// Summed pair count of every ground-truth cluster.
    pub(crate) max_intra_edges: u64,
}

/// Allocator for node, cluster and operation indices.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
struct Sequences {
    node: u64,
    cluster: u64,
    operation: u64,
}

impl Default for Sequences {
    fn default() -> Self {
        Self {
            node: 2,
            cluster: 1,
            operation: 1,
        }
    }
}

impl Sequences {
    fn next_node(&mut self) -> u64 {
        let sequence = self.node;
        self.node += 1;
        sequence
    }

    fn next_cluster(&mut self) -> u64 {
        let sequence = self.cluster;
        self.cluster += 1;
        sequence
    }

    fn next_operation(&mut self) -> OperationId {
        let id = OperationId::new(self.operation);
        self.operation += 1;
        id
    }
}

/// Dynamic clustered random graph with a ground-truth and a reference
/// clustering.
///
/// Construct one through [`crate::GraphBuilder`], seed it with
/// [`DcrGraph::init_erdos_renyi`], then drive it with node, edge and cluster
/// operations, or hand it to a [`crate::Generator`].
///
/// # Examples
/// ```
/// use ldcr_core::GraphBuilder;
///
/// let mut graph = GraphBuilder::new().with_p_out(0.05).build()?;
/// graph.init_erdos_renyi(&[6, 4], &[0.8, 0.6])?;
/// assert_eq!(graph.node_count(), 10);
/// assert_eq!(graph.ground_truth_clusters().len(), 2);
/// assert!(graph.clusterings_agree());
/// # Ok::<(), ldcr_core::GraphError>(())
/// ```
#[derive(Clone, Debug)]
pub struct DcrGraph<R, J> {
    pub(crate) nodes: Arena<Node>,
    pub(crate) clusters: Arena<OrdinaryCluster>,
    pub(crate) pseudo: PseudoCluster,
    pub(crate) ground_truth: GroundTruth,
    pub(crate) reference: ClusterList,
    pub(crate) insertion_tree: SelectionTree<ClusterRef>,
    pub(crate) deletion_tree: SelectionTree<ClusterRef>,
    pub(crate) operations: BTreeMap<OperationId, ClusterOperation>,
    pub(crate) config: GraphConfig,
    pub(crate) counters: Counters,
    sequences: Sequences,
    random: R,
    journal: J,
}

impl<R, J> DcrGraph<R, J>
where
    R: RandomSource,
    J: JournalSink,
{
    pub(crate) fn new(config: GraphConfig, random: R, journal: J) -> Self {
        let mut pseudo = PseudoCluster::default();
        let mut insertion_tree = SelectionTree::new();
        let mut deletion_tree = SelectionTree::new();
        pseudo.weights.insertion = Some(insertion_tree.insert(ClusterRef::Pseudo, 0.0));
        pseudo.weights.deletion = Some(deletion_tree.insert(ClusterRef::Pseudo, 0.0));
        Self {
            nodes: Arena::default(),
            clusters: Arena::default(),
            pseudo,
            ground_truth: GroundTruth::default(),
            reference: ClusterList::new(View::Reference),
            insertion_tree,
            deletion_tree,
            operations: BTreeMap::new(),
            config,
            counters: Counters::default(),
            sequences: Sequences::default(),
            random,
            journal,
        }
    }

    /// Returns the random source driving the graph.
    pub fn random_mut(&mut self) -> &mut R {
        &mut self.random
    }

    /// Returns the journal receiving the graph's events.
    pub fn journal(&self) -> &J {
        &self.journal
    }

    /// Consumes the graph and returns its journal.
    pub fn into_journal(self) -> J {
        self.journal
    }

    /// Recomputes the weights `target` contributes to both global trees.
    pub(crate) fn refresh_weights(&mut self, target: ClusterRef) -> Result<()> {
        let p_out = self.config.p_out;
        let (insertion, deletion, entries) = match target {
            ClusterRef::Pseudo => (
                self.pseudo.insertion_weight(p_out),
                self.pseudo.deletion_weight(p_out),
                self.pseudo.weight_entries(),
            ),
            ClusterRef::Ordinary(id) => {
                let cluster = self.cluster(id)?;
                (
                    cluster.insertion_weight(p_out),
                    cluster.deletion_weight(p_out),
                    cluster.weight_entries(),
                )
            }
        };
        if let Some(handle) = entries.insertion {
            self.insertion_tree.set_weight(handle, insertion.max(0.0))?;
        }
        if let Some(handle) = entries.deletion {
            self.deletion_tree.set_weight(handle, deletion.max(0.0))?;
        }
        Ok(())
    }

    /// Adds `id` to the ground-truth view together with its tree entries.
    pub(crate) fn enter_ground_truth(&mut self, id: ClusterId) -> Result<()> {
        self.ground_truth.add(id, &mut self.clusters, &mut self.nodes)?;
        let cluster = ordinary_mut(&mut self.clusters, id)?;
        let entries = cluster.weight_entries_mut();
        entries.insertion = Some(self.insertion_tree.insert(ClusterRef::Ordinary(id), 0.0));
        entries.deletion = Some(self.deletion_tree.insert(ClusterRef::Ordinary(id), 0.0));
        let size = cluster.node_count() as u64;
        self.counters.max_intra_edges += max_edge_count(size);
        self.refresh_weights(ClusterRef::Ordinary(id))
    }

    /// Removes `id` from the ground-truth view and drops its tree entries.
    pub(crate) fn leave_ground_truth(&mut self, id: ClusterId) -> Result<()> {
        self.ground_truth.remove(id, &mut self.clusters, &mut self.nodes)?;
        let cluster = ordinary_mut(&mut self.clusters, id)?;
        let size = cluster.node_count() as u64;
        let entries = std::mem::take(cluster.weight_entries_mut());
        if let Some(handle) = entries.insertion {
            self.insertion_tree.remove(handle)?;
        }
        if let Some(handle) = entries.deletion {
            self.deletion_tree.remove(handle)?;
        }
        self.counters.max_intra_edges -= max_edge_count(size);
        Ok(())
    }

    pub(crate) fn create_cluster(&mut self, p_in: f64, expected_size: usize) -> ClusterId {
        let sequence = self.sequences.next_cluster();
        self.clusters
            .insert_with(|id| OrdinaryCluster::new(id, sequence, p_in, expected_size))
    }

    pub(crate) fn next_operation_id(&mut self) -> OperationId {
        self.sequences.next_operation()
    }

    pub(crate) fn next_node_sequence(&mut self) -> u64 {
        self.sequences.next_node()
    }

    /// Forwards a crossing-edge change to the operation whose halves the
    /// endpoints sit on.
    pub(crate) fn notify_operation(&mut self, first: NodeId, second: NodeId, inserted: bool) -> Result<()> {
        let crossing = self.node(first)?.crossing_operation(self.node(second)?);
        if let Some(operation) = crossing.and_then(|id| self.operations.get_mut(&id)) {
            if inserted {
                operation.notify_edge_inserted();
            } else {
                operation.notify_edge_deleted()?;
            }
        }
        Ok(())
    }

    pub(crate) fn count_small_operations(&mut self, count: u64) {
        self.counters.small_operations += count;
        record_small_operations(count);
    }
}

impl<R, J> DcrGraph<R, J> {
    /// Returns the inter-cluster edge probability.
    #[must_use]
    pub fn p_out(&self) -> f64 {
        self.config.p_out
    }

    /// Returns the completeness fraction of splits and merges.
    #[must_use]
    pub fn theta(&self) -> f64 {
        self.config.theta
    }

    /// Returns the sampler used for the probability of new clusters.
    #[must_use]
    pub fn p_in_sampler(&self) -> PInSampler {
        self.config.p_in_sampler
    }

    /// Returns the cluster behind `id`.
    ///
    /// # Errors
    /// Returns [`GraphError::UnknownCluster`] for retired or foreign handles.
    pub fn cluster(&self, id: ClusterId) -> Result<&OrdinaryCluster> {
        self.clusters.get(id).ok_or(GraphError::UnknownCluster {
            cluster: id.index() as u64,
        })
    }

    /// Returns the node behind `id`.
    ///
    /// # Errors
    /// Returns [`GraphError::UnknownNode`] for removed or foreign handles.
    pub fn node(&self, id: NodeId) -> Result<&Node> {
        self.nodes.get(id).ok_or(GraphError::UnknownNode {
            node: id.index() as u64,
        })
    }

    pub(crate) fn ground_truth_of(&self, id: NodeId) -> Result<ClusterId> {
        self.node(id)?.ground_truth_cluster().ok_or_else(|| {
            GraphError::invariant(format!(
                "node {} has no ground-truth cluster",
                self.node_journal_id(id)
            ))
        })
    }

    /// Every neighbour of `id`, intra-cluster ones first.
    pub(crate) fn neighbours(&self, id: NodeId) -> Result<Vec<NodeId>> {
        let cluster = self.cluster(self.ground_truth_of(id)?)?;
        let slot = cluster.slot(id, &self.nodes)?;
        Ok(cluster
            .adjacency
            .intra_neighbours(slot)
            .iter()
            .chain(cluster.adjacency.inter_neighbours(slot))
            .copied()
            .collect())
    }

    pub(crate) fn node_journal_id(&self, id: NodeId) -> u64 {
        adjacency::journal_id(&self.nodes, id)
    }

    pub(crate) fn cluster_journal_id(&self, id: ClusterId) -> u64 {
        clustering::cluster_journal_id(&self.clusters, id)
    }
}

pub(crate) fn ordinary_mut(
    clusters: &mut Arena<OrdinaryCluster>,
    id: ClusterId,
) -> Result<&mut OrdinaryCluster> {
    clusters.get_mut(id).ok_or(GraphError::UnknownCluster {
        cluster: id.index() as u64,
    })
}

#[cfg(feature = "metrics")]
fn record_small_operations(count: u64) {
    metrics::counter!("ldcr.graph.small_ops").increment(count);
}

#[cfg(not(feature = "metrics"))]
fn record_small_operations(_count: u64) {}

#[cfg(feature = "metrics")]
fn record_large_operation() {
    metrics::counter!("ldcr.graph.large_ops").increment(1);
}

#[cfg(not(feature = "metrics"))]
fn record_large_operation() {}

#[cfg(feature = "metrics")]
fn record_finished_operation() {
    metrics::counter!("ldcr.operations.finished").increment(1);
}

#[cfg(not(feature = "metrics"))]
fn record_finished_operation() {}

#[cfg(feature = "metrics")]
fn record_graph_size(nodes: usize, edges: u64) {
    metrics::gauge!("ldcr.graph.nodes").set(nodes as f64);
    metrics::gauge!("ldcr.graph.edges").set(edges as f64);
}

#[cfg(not(feature = "metrics"))]
fn record_graph_size(_nodes: usize, _edges: u64) {}


#[cfg(test)]
mod property;
