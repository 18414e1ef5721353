//! Ground-truth and reference clusterings.
//!
//! Both views are index-stable lists of ordinary clusters with `O(1)` add and
//! remove through swap-with-last. Adding a cluster to a view assigns its slot
//! for that view and updates the placement of every node it holds.

mod ground_truth;

pub(crate) use self::ground_truth::GroundTruth;

use std::collections::HashSet;

use crate::{
    arena::Arena,
    cluster::{ClusterId, OrdinaryCluster},
    error::{GraphError, Result},
    node::Node,
};

/// The two clustering views maintained by the graph.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum View {
    /// The clustering reflecting the current structure of the graph.
    GroundTruth,
    /// The externally observable clustering, which lags behind during a
    /// running split or merge.
    Reference,
}

/// Dense list of clusters forming one view.
#[derive(Clone, Debug)]
pub(crate) struct ClusterList {
    view: View,
    clusters: Vec<ClusterId>,
    p_in: Vec<f64>,
    expected_sizes: Vec<usize>,
}

impl ClusterList {
    pub(crate) const fn new(view: View) -> Self {
        Self {
            view,
            clusters: Vec::new(),
            p_in: Vec::new(),
            expected_sizes: Vec::new(),
        }
    }

    pub(crate) const fn view(&self) -> View {
        self.view
    }

    pub(crate) fn len(&self) -> usize {
        self.clusters.len()
    }

    pub(crate) fn clusters(&self) -> &[ClusterId] {
        &self.clusters
    }

    pub(crate) fn get(&self, slot: usize) -> Option<ClusterId> {
        self.clusters.get(slot).copied()
    }

    pub(crate) fn p_in_values(&self) -> &[f64] {
        &self.p_in
    }

    pub(crate) fn expected_sizes(&self) -> &[usize] {
        &self.expected_sizes
    }

    pub(crate) fn slot_of(&self, cluster: &OrdinaryCluster) -> Option<usize> {
        match self.view {
            View::GroundTruth => cluster.ground_truth_slot,
            View::Reference => cluster.reference_slot,
        }
    }

    pub(crate) fn contains(&self, id: ClusterId, clusters: &Arena<OrdinaryCluster>) -> bool {
        clusters
            .get(id)
            .and_then(|cluster| self.slot_of(cluster))
            .and_then(|slot| self.get(slot))
            .is_some_and(|stored| stored == id)
    }

    pub(crate) fn add(
        &mut self,
        id: ClusterId,
        clusters: &mut Arena<OrdinaryCluster>,
        nodes: &mut Arena<Node>,
    ) -> Result<()> {
        let cluster = clusters.get_mut(id).ok_or(GraphError::UnknownCluster {
            cluster: id.index() as u64,
        })?;
        if self.slot_of(cluster).is_some() {
            return Err(GraphError::invariant(format!(
                "cluster {} is already in the {:?} view",
                cluster.journal_id(),
                self.view
            )));
        }
        self.p_in.push(cluster.p_in());
        self.expected_sizes.push(cluster.expected_size());
        self.clusters.push(id);
        cluster.set_view_slot(self.view, Some(self.clusters.len() - 1), nodes);
        Ok(())
    }

    pub(crate) fn remove(
        &mut self,
        id: ClusterId,
        clusters: &mut Arena<OrdinaryCluster>,
        nodes: &mut Arena<Node>,
    ) -> Result<()> {
        if !self.contains(id, clusters) {
            return Err(GraphError::UnknownCluster {
                cluster: cluster_journal_id(clusters, id),
            });
        }
        let slot = clusters
            .get(id)
            .and_then(|cluster| self.slot_of(cluster))
            .ok_or_else(|| GraphError::invariant("cluster slot vanished"))?;
        self.clusters.swap_remove(slot);
        self.p_in.swap_remove(slot);
        self.expected_sizes.swap_remove(slot);
        if let Some(moved) = self.clusters.get(slot).copied() {
            if let Some(cluster) = clusters.get_mut(moved) {
                cluster.set_view_slot(self.view, Some(slot), nodes);
            }
        }
        if let Some(cluster) = clusters.get_mut(id) {
            cluster.set_view_slot(self.view, None, nodes);
        }
        Ok(())
    }

    /// Returns whether both lists hold the same set of clusters.
    pub(crate) fn same_clusters(&self, other: &Self) -> bool {
        let mine: HashSet<ClusterId> = self.clusters.iter().copied().collect();
        let theirs: HashSet<ClusterId> = other.clusters.iter().copied().collect();
        mine == theirs
    }
}

pub(crate) fn cluster_journal_id(clusters: &Arena<OrdinaryCluster>, id: ClusterId) -> u64 {
    clusters
        .get(id)
        .map_or(id.index() as u64, OrdinaryCluster::journal_id)
}

#[cfg(test)]
mod tests;
