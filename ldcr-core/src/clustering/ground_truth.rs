//! Ground-truth view with expected-size placement and operation locking.

use std::collections::HashMap;

use crate::{
    arena::Arena,
    cluster::{ClusterId, OrdinaryCluster, as_weight},
    error::{GraphError, Result},
    node::Node,
    operation::OperationId,
    random::RandomSource,
    selection_tree::{SelectionTree, TreeHandle},
};

use super::{ClusterList, View, cluster_journal_id};

/// Ground-truth clustering.
///
/// Besides the cluster list it keeps a selection tree weighted by expected
/// size, answering where a new node goes, and a free list of clusters no
/// running operation owns, together with their summed node count.
#[derive(Clone, Debug)]
pub(crate) struct GroundTruth {
    list: ClusterList,
    sizes: SelectionTree<ClusterId>,
    size_handles: HashMap<ClusterId, TreeHandle>,
    unlocked: Vec<ClusterId>,
    unlocked_nodes: usize,
}

impl Default for GroundTruth {
    fn default() -> Self {
        Self {
            list: ClusterList::new(View::GroundTruth),
            sizes: SelectionTree::new(),
            size_handles: HashMap::new(),
            unlocked: Vec::new(),
            unlocked_nodes: 0,
        }
    }
}

impl GroundTruth {
    pub(crate) const fn list(&self) -> &ClusterList {
        &self.list
    }

    pub(crate) fn unlocked(&self) -> &[ClusterId] {
        &self.unlocked
    }

    pub(crate) const fn unlocked_node_count(&self) -> usize {
        self.unlocked_nodes
    }

    pub(crate) fn add(
        &mut self,
        id: ClusterId,
        clusters: &mut Arena<OrdinaryCluster>,
        nodes: &mut Arena<Node>,
    ) -> Result<()> {
        self.list.add(id, clusters, nodes)?;
        let expected = clusters
            .get(id)
            .map_or(0, OrdinaryCluster::expected_size);
        let handle = self.sizes.insert(id, as_weight(expected as u64));
        self.size_handles.insert(id, handle);
        self.push_unlocked(id, clusters);
        Ok(())
    }

    pub(crate) fn remove(
        &mut self,
        id: ClusterId,
        clusters: &mut Arena<OrdinaryCluster>,
        nodes: &mut Arena<Node>,
    ) -> Result<()> {
        self.list.remove(id, clusters, nodes)?;
        if let Some(handle) = self.size_handles.remove(&id) {
            self.sizes.remove(handle)?;
        }
        self.pull_unlocked(id, clusters)
    }

    /// Hands `id` to `operation`, taking it off the free list.
    pub(crate) fn lock(
        &mut self,
        id: ClusterId,
        operation: OperationId,
        clusters: &mut Arena<OrdinaryCluster>,
    ) -> Result<()> {
        if !self.list.contains(id, clusters) {
            return Err(GraphError::UnknownCluster {
                cluster: cluster_journal_id(clusters, id),
            });
        }
        self.pull_unlocked(id, clusters)?;
        if let Some(cluster) = clusters.get_mut(id) {
            cluster.operation = Some(operation);
        }
        Ok(())
    }

    /// Returns `id` to the free list.
    pub(crate) fn unlock(&mut self, id: ClusterId, clusters: &mut Arena<OrdinaryCluster>) {
        if let Some(cluster) = clusters.get_mut(id) {
            cluster.operation = None;
        }
        self.push_unlocked(id, clusters);
    }

    pub(crate) fn notify_node_added(&mut self) {
        self.unlocked_nodes += 1;
    }

    pub(crate) fn notify_node_removed(&mut self) -> Result<()> {
        self.release_unlocked_nodes(1)
    }

    fn release_unlocked_nodes(&mut self, count: usize) -> Result<()> {
        debug_assert!(self.unlocked_nodes >= count, "unlocked node counter underflow");
        self.unlocked_nodes = self.unlocked_nodes.checked_sub(count).ok_or_else(|| {
            GraphError::invariant(format!(
                "releasing {count} unlocked nodes but only {} are counted",
                self.unlocked_nodes
            ))
        })?;
        Ok(())
    }

    /// Draws a cluster for a new node, weighted by expected size.
    pub(crate) fn propose_cluster_for_new_node(&self, random: &mut impl RandomSource) -> Result<ClusterId> {
        self.sizes.select(random)
    }

    /// Draws an unlocked cluster holding at least two nodes.
    ///
    /// Returns `None` unless the unlocked clusters hold more nodes than there
    /// are unlocked clusters, which guarantees the rejection loop finds one.
    pub(crate) fn propose_cluster_for_split(
        &self,
        clusters: &Arena<OrdinaryCluster>,
        random: &mut impl RandomSource,
    ) -> Option<ClusterId> {
        if self.unlocked.is_empty() || self.unlocked_nodes < self.unlocked.len() + 1 {
            return None;
        }
        loop {
            let candidate = self.unlocked.get(random.next_below(self.unlocked.len()))?;
            let size = clusters.get(*candidate).map_or(0, OrdinaryCluster::node_count);
            if size >= 2 {
                return Some(*candidate);
            }
        }
    }

    /// Draws two distinct unlocked clusters.
    pub(crate) fn propose_clusters_for_merge(
        &self,
        random: &mut impl RandomSource,
    ) -> Option<(ClusterId, ClusterId)> {
        if self.unlocked.len() < 2 {
            return None;
        }
        let (first, second) = random.next_distinct_pair(self.unlocked.len());
        Some((*self.unlocked.get(first)?, *self.unlocked.get(second)?))
    }

    fn push_unlocked(&mut self, id: ClusterId, clusters: &mut Arena<OrdinaryCluster>) {
        let Some(cluster) = clusters.get_mut(id) else {
            return;
        };
        if cluster.unlocked_slot.is_some() {
            return;
        }
        cluster.unlocked_slot = Some(self.unlocked.len());
        self.unlocked_nodes += cluster.node_count();
        self.unlocked.push(id);
    }

    fn pull_unlocked(
        &mut self,
        id: ClusterId,
        clusters: &mut Arena<OrdinaryCluster>,
    ) -> Result<()> {
        let Some(cluster) = clusters.get_mut(id) else {
            return Ok(());
        };
        let Some(slot) = cluster.unlocked_slot.take() else {
            return Ok(());
        };
        let count = cluster.node_count();
        self.release_unlocked_nodes(count)?;
        self.unlocked.swap_remove(slot);
        if let Some(moved) = self.unlocked.get(slot).copied() {
            if let Some(other) = clusters.get_mut(moved) {
                other.unlocked_slot = Some(slot);
            }
        }
        Ok(())
    }
}
