//! Ordinary clusters of the ground-truth and reference views.

use crate::{
    adjacency::{AdjacencyStore, Views},
    arena::Arena,
    clustering::View,
    edge::{Edge, EdgeKind},
    error::{GraphError, Result},
    node::{Node, NodeId},
    operation::OperationId,
    pair_index::{max_edge_count, pair_from_index, pair_index},
    random::RandomSource,
    sampler::DomainSampler,
};

use super::{ClusterId, WeightEntries, WeightedCluster, as_weight};

/// Cluster of the generated graph with its own edge probability.
///
/// The domain sampler runs over the pair space of the cluster's ground-truth
/// slots and holds exactly the intra-cluster edges.
#[derive(Clone, Debug)]
pub struct OrdinaryCluster {
    sequence: u64,
    p_in: f64,
    expected_size: usize,
    pub(crate) adjacency: AdjacencyStore,
    pub(crate) sampler: DomainSampler,
    pub(crate) ground_truth_slot: Option<usize>,
    pub(crate) reference_slot: Option<usize>,
    pub(crate) unlocked_slot: Option<usize>,
    pub(crate) weights: WeightEntries,
    pub(crate) operation: Option<OperationId>,
}

impl OrdinaryCluster {
    pub(crate) fn new(id: ClusterId, sequence: u64, p_in: f64, expected_size: usize) -> Self {
        Self {
            sequence,
            p_in,
            expected_size,
            adjacency: AdjacencyStore::new(id),
            sampler: DomainSampler::new(0),
            ground_truth_slot: None,
            reference_slot: None,
            unlocked_slot: None,
            weights: WeightEntries::default(),
            operation: None,
        }
    }

    /// Returns the 1-based identifier written to the journal.
    #[must_use]
    pub const fn journal_id(&self) -> u64 {
        self.sequence
    }

    /// Returns the intra-cluster edge probability.
    #[must_use]
    pub const fn p_in(&self) -> f64 {
        self.p_in
    }

    /// Returns the expected size used for weighted node placement.
    #[must_use]
    pub const fn expected_size(&self) -> usize {
        self.expected_size
    }

    /// Returns the number of nodes currently stored.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.adjacency.node_count()
    }

    /// Returns the stored nodes in slot order.
    #[must_use]
    pub fn nodes(&self) -> &[NodeId] {
        self.adjacency.nodes()
    }

    /// Returns the number of intra-cluster edges.
    #[must_use]
    pub fn intra_edge_count(&self) -> usize {
        self.adjacency.intra_edge_count()
    }

    /// Returns the number of inter-cluster edges with an endpoint here.
    #[must_use]
    pub fn inter_edge_count(&self) -> usize {
        self.adjacency.inter_edge_count()
    }

    /// Returns the number of unconnected pairs inside the cluster.
    #[must_use]
    pub fn intra_non_edge_count(&self) -> u64 {
        max_edge_count(self.node_count() as u64) - self.intra_edge_count() as u64
    }

    /// Returns whether the cluster is part of the ground-truth view.
    #[must_use]
    pub const fn in_ground_truth(&self) -> bool {
        self.ground_truth_slot.is_some()
    }

    /// Returns whether the cluster is part of the reference view.
    #[must_use]
    pub const fn in_reference(&self) -> bool {
        self.reference_slot.is_some()
    }

    /// Returns whether a running operation owns the cluster.
    #[must_use]
    pub const fn is_locked(&self) -> bool {
        self.operation.is_some()
    }

    /// Returns the operation owning the cluster, if any.
    #[must_use]
    pub const fn operation(&self) -> Option<OperationId> {
        self.operation
    }

    pub(crate) const fn views(&self) -> Views {
        Views {
            ground_truth: self.in_ground_truth(),
            reference: self.in_reference(),
        }
    }

    /// Records the cluster's slot in `view` and refreshes node placements when
    /// the cluster enters or leaves that view.
    pub(crate) fn set_view_slot(&mut self, view: View, slot: Option<usize>, nodes: &mut Arena<Node>) {
        let current = match view {
            View::GroundTruth => &mut self.ground_truth_slot,
            View::Reference => &mut self.reference_slot,
        };
        let flipped = current.is_some() != slot.is_some();
        *current = slot;
        if flipped {
            self.adjacency.assign_view(nodes, view, slot.is_some());
        }
    }

    /// Adds `id` to the adjacency store without touching the pseudo cluster.
    pub(crate) fn add_node_locally(&mut self, id: NodeId, nodes: &mut Arena<Node>) -> Result<usize> {
        let slot = self.adjacency.add_node(id, nodes, self.views())?;
        self.sampler.resize(max_edge_count(self.node_count() as u64))?;
        Ok(slot)
    }

    /// Removes the isolated node `id`, re-indexing the sampler entries of the
    /// node that moves into the vacated slot.
    ///
    /// The moved node's intra-cluster pairs are deselected at their old index
    /// and reselected at the new one before the sampler shrinks, so no
    /// selected element ever lies outside the shrunken domain.
    pub(crate) fn remove_node_locally(&mut self, id: NodeId, nodes: &mut Arena<Node>) -> Result<()> {
        let removed_slot = self.slot(id, nodes)?;
        let degree = self.adjacency.degree(removed_slot);
        if degree > 0 {
            return Err(GraphError::NodeNotIsolated {
                node: crate::adjacency::journal_id(nodes, id),
                degree,
            });
        }
        let moved = self.adjacency.last_node().filter(|&last| last != id);
        let moved_neighbours = match moved {
            Some(last) => {
                let last_slot = self.slot(last, nodes)?;
                let neighbours = self.adjacency.intra_neighbours(last_slot).to_vec();
                for &neighbour in &neighbours {
                    let index = pair_index(last_slot as u64, self.slot(neighbour, nodes)? as u64);
                    self.sampler.delete(index)?;
                }
                neighbours
            }
            None => Vec::new(),
        };
        self.adjacency.remove_node(id, nodes, self.views())?;
        if let Some(last) = moved {
            let last_slot = self.slot(last, nodes)?;
            for &neighbour in &moved_neighbours {
                let index = pair_index(last_slot as u64, self.slot(neighbour, nodes)? as u64);
                self.sampler.select(index)?;
            }
        }
        self.sampler
            .fast_resize(max_edge_count(self.node_count() as u64))
    }

    pub(crate) fn add_intra_edge(&mut self, edge: Edge, nodes: &Arena<Node>) -> Result<()> {
        self.adjacency.add_edge(edge, EdgeKind::Intra, nodes)?;
        let index = self.local_pair_index(edge, nodes)?;
        self.sampler.select(index)
    }

    pub(crate) fn remove_intra_edge(&mut self, edge: Edge, nodes: &Arena<Node>) -> Result<()> {
        let index = self.local_pair_index(edge, nodes)?;
        self.adjacency.remove_edge(edge, nodes)?;
        self.sampler.delete(index)
    }

    /// Stores the inter-cluster twin `edge` whose source lives here.
    pub(crate) fn add_inter_twin(&mut self, edge: Edge, nodes: &Arena<Node>) -> Result<()> {
        self.adjacency.add_edge(edge, EdgeKind::Inter, nodes)
    }

    pub(crate) fn remove_inter_twin(&mut self, edge: Edge, nodes: &Arena<Node>) -> Result<()> {
        self.adjacency.remove_edge(edge, nodes).map(|_| ())
    }

    /// Drops every edge and empties the sampler, keeping the nodes.
    pub(crate) fn clear_edges(&mut self) {
        self.adjacency.clear_edges();
        self.sampler.clear();
    }

    /// Draws a uniformly random intra-cluster edge without removing it.
    pub(crate) fn find_edge(&self, random: &mut impl RandomSource) -> Option<Edge> {
        let index = self.sampler.propose_for_deletion(random)?;
        self.pair_at(index).map(|(source, target)| Edge::new(source, target))
    }

    /// Draws a uniformly random unconnected pair inside the cluster.
    pub(crate) fn find_non_edge(&self, random: &mut impl RandomSource) -> Option<(NodeId, NodeId)> {
        let index = self.sampler.propose_for_selection(random)?;
        self.pair_at(index)
    }

    fn pair_at(&self, index: u64) -> Option<(NodeId, NodeId)> {
        let (high, low) = pair_from_index(index);
        let first = self.adjacency.node_at(usize::try_from(high).ok()?)?;
        let second = self.adjacency.node_at(usize::try_from(low).ok()?)?;
        Some((first, second))
    }

    pub(crate) fn slot(&self, id: NodeId, nodes: &Arena<Node>) -> Result<usize> {
        nodes
            .get(id)
            .filter(|node| self.adjacency.contains_node(id, node))
            .and_then(|node| self.adjacency.slot_of(node))
            .ok_or_else(|| GraphError::UnknownNode {
                node: crate::adjacency::journal_id(nodes, id),
            })
    }

    fn local_pair_index(&self, edge: Edge, nodes: &Arena<Node>) -> Result<u64> {
        let source = self.slot(edge.source(), nodes)? as u64;
        let target = self.slot(edge.target(), nodes)? as u64;
        Ok(pair_index(source, target))
    }
}

impl WeightedCluster for OrdinaryCluster {
    fn insertion_weight(&self, p_out: f64) -> f64 {
        as_weight(self.intra_non_edge_count()) * (self.p_in - p_out)
    }

    fn deletion_weight(&self, _p_out: f64) -> f64 {
        as_weight(self.intra_edge_count() as u64) * (1.0 - self.p_in)
    }

    fn weight_entries(&self) -> WeightEntries {
        self.weights
    }

    fn weight_entries_mut(&mut self) -> &mut WeightEntries {
        &mut self.weights
    }
}
