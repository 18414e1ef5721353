//! Read-only views of the graph.

use crate::{
    cluster::ClusterId,
    edge::Edge,
    error::Result,
    node::NodeId,
    operation::OperationStatus,
    pair_index::max_edge_count,
};

use super::DcrGraph;

impl<R, J> DcrGraph<R, J> {
    /// Returns the number of nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.pseudo.node_count()
    }

    /// Returns the number of edges.
    #[must_use]
    pub const fn edge_count(&self) -> u64 {
        self.pseudo.edge_count()
    }

    /// Returns the number of edges whose endpoints share a ground-truth
    /// cluster.
    #[must_use]
    pub fn intra_edge_count(&self) -> u64 {
        self.edge_count() - self.inter_edge_count()
    }

    /// Returns the number of edges joining two ground-truth clusters.
    #[must_use]
    pub fn inter_edge_count(&self) -> u64 {
        self.pseudo.inter_edge_count() as u64
    }

    /// Returns the number of node pairs without an edge.
    #[must_use]
    pub fn non_edge_count(&self) -> u64 {
        self.pseudo.non_edge_count()
    }

    /// Returns the number of pairs across ground-truth clusters without an
    /// edge.
    #[must_use]
    pub fn inter_non_edge_count(&self) -> u64 {
        let pairs = max_edge_count(self.node_count() as u64) - self.counters.max_intra_edges;
        pairs - self.inter_edge_count()
    }

    /// Returns the number of pairs inside ground-truth clusters.
    #[must_use]
    pub const fn max_intra_edge_count(&self) -> u64 {
        self.counters.max_intra_edges
    }

    /// Returns the degree of `id`.
    ///
    /// # Errors
    /// Returns [`crate::GraphError::UnknownNode`] when `id` does not exist.
    pub fn degree(&self, id: NodeId) -> Result<usize> {
        let cluster = self.cluster(self.ground_truth_of(id)?)?;
        Ok(cluster.adjacency.degree(cluster.slot(id, &self.nodes)?))
    }

    /// Returns whether `first` and `second` are joined by an edge.
    ///
    /// # Errors
    /// Returns [`crate::GraphError::UnknownNode`] for a missing endpoint.
    pub fn has_edge(&self, first: NodeId, second: NodeId) -> Result<bool> {
        if first == second {
            self.node(first)?;
            return Ok(false);
        }
        self.pseudo.contains_pair(first, second, &self.nodes)
    }

    /// Returns the number of completed time steps.
    #[must_use]
    pub const fn time_step(&self) -> u64 {
        self.counters.time_step
    }

    /// Returns the number of small-scale operations performed, counting one
    /// per edge touched by node insertions and removals.
    #[must_use]
    pub const fn small_operation_count(&self) -> u64 {
        self.counters.small_operations
    }

    /// Returns the number of splits and merges started.
    #[must_use]
    pub const fn large_operation_count(&self) -> u64 {
        self.counters.large_operations
    }

    /// Returns the number of splits and merges finished.
    #[must_use]
    pub const fn finished_operation_count(&self) -> u64 {
        self.counters.finished_operations
    }

    /// Clusters of the ground-truth view.
    #[must_use]
    pub fn ground_truth_clusters(&self) -> &[ClusterId] {
        self.ground_truth.list().clusters()
    }

    /// Clusters of the reference view.
    #[must_use]
    pub fn reference_clusters(&self) -> &[ClusterId] {
        self.reference.clusters()
    }

    /// Clusters no running operation owns.
    #[must_use]
    pub fn unlocked_clusters(&self) -> &[ClusterId] {
        self.ground_truth.unlocked()
    }

    /// Nodes of `cluster`.
    ///
    /// # Errors
    /// Returns [`crate::GraphError::UnknownCluster`] for retired handles.
    pub fn cluster_nodes(&self, cluster: ClusterId) -> Result<&[NodeId]> {
        Ok(self.cluster(cluster)?.nodes())
    }

    /// Every node of the graph.
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.pseudo.nodes().iter().copied()
    }

    /// Every edge of `id`, intra-cluster ones first, each oriented away from
    /// `id`.
    ///
    /// # Errors
    /// Returns [`crate::GraphError::UnknownNode`] when `id` does not exist.
    pub fn edges_of(&self, id: NodeId) -> Result<impl Iterator<Item = Edge> + '_> {
        let cluster = self.cluster(self.ground_truth_of(id)?)?;
        let slot = cluster.slot(id, &self.nodes)?;
        Ok(cluster.adjacency.edges_of(slot))
    }

    /// Intra-cluster edges of the ground-truth cluster `cluster`, each once.
    ///
    /// # Errors
    /// Returns [`crate::GraphError::UnknownCluster`] for retired handles.
    pub fn intra_edges(&self, cluster: ClusterId) -> Result<impl Iterator<Item = Edge> + '_> {
        Ok(self.cluster(cluster)?.adjacency.intra_edges())
    }

    /// Inter-cluster edges leaving the ground-truth cluster `cluster`.
    ///
    /// # Errors
    /// Returns [`crate::GraphError::UnknownCluster`] for retired handles.
    pub fn inter_edges(&self, cluster: ClusterId) -> Result<impl Iterator<Item = Edge> + '_> {
        Ok(self.cluster(cluster)?.adjacency.inter_edges())
    }

    /// Inter-cluster edges leaving `cluster` toward `other`.
    ///
    /// # Errors
    /// Returns [`crate::GraphError::UnknownCluster`] for retired handles.
    pub fn inter_edges_between(
        &self,
        cluster: ClusterId,
        other: ClusterId,
    ) -> Result<impl Iterator<Item = Edge> + '_> {
        let nodes = &self.nodes;
        Ok(self
            .cluster(cluster)?
            .adjacency
            .inter_edges()
            .filter(move |edge| {
                nodes
                    .get(edge.target())
                    .and_then(|node| node.ground_truth_cluster())
                    == Some(other)
            }))
    }

    /// Every edge of the graph, each once.
    pub fn edges(&self) -> impl Iterator<Item = Edge> + '_ {
        self.ground_truth_clusters()
            .iter()
            .filter_map(|&id| self.clusters.get(id))
            .flat_map(|cluster| cluster.adjacency.intra_edges())
            .chain(self.pseudo.inter_edges().iter().copied())
    }

    /// Snapshot of every running split and merge.
    #[must_use]
    pub fn running_operations(&self) -> Vec<OperationStatus> {
        self.operations
            .values()
            .map(|operation| operation.status(self.config.theta))
            .collect()
    }

    /// Returns whether both clustering views hold the same clusters, which
    /// is the case exactly when no operation is running.
    #[must_use]
    pub fn clusterings_agree(&self) -> bool {
        self.ground_truth.list().same_clusters(&self.reference)
    }
}
