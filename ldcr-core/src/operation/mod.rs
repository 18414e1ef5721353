//! Split and merge operations.
//!
//! An operation is created by [`crate::DcrGraph::split`] or
//! [`crate::DcrGraph::merge`], which relocate nodes and edges immediately in
//! the ground-truth view. The operation then only tracks how many edges cross
//! its two logical halves until the count passes the completeness threshold,
//! at which point the reference view catches up.

mod parameters;

pub(crate) use self::parameters::{sample_expected_size, sample_merged_size, sample_p_in};

use std::fmt;

use crate::{
    arena::Arena,
    cluster::{ClusterId, OrdinaryCluster},
    error::{GraphError, Result},
    node::Side,
    random::RandomSource,
};

/// Globally unique, monotonically increasing operation index.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct OperationId(u64);

impl OperationId {
    pub(crate) const fn new(index: u64) -> Self {
        Self(index)
    }

    /// Returns the raw index, starting at one.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for OperationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "op{}", self.0)
    }
}

/// Kind of a cluster operation.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum OperationKind {
    /// One cluster becomes two.
    Split,
    /// Two clusters become one.
    Merge,
}

/// Lifecycle of a cluster operation.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum OperationState {
    /// Parameters are being sampled.
    Created,
    /// Nodes were relocated and edge churn is being tracked.
    Running,
    /// The crossing-edge count passed the threshold.
    Complete,
    /// The reference view caught up; terminal.
    Finished,
}

/// Clusters taking part in an operation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum OperationClusters {
    Split {
        initial: ClusterId,
        first: ClusterId,
        second: ClusterId,
    },
    Merge {
        first: ClusterId,
        second: ClusterId,
        merged: ClusterId,
    },
}

/// Read-only snapshot of a running operation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OperationStatus {
    /// Operation index.
    pub id: OperationId,
    /// Whether the operation splits or merges.
    pub kind: OperationKind,
    /// Current lifecycle state.
    pub state: OperationState,
    /// Edges currently crossing the two halves.
    pub crossing_edges: u64,
    /// Crossing count the operation must reach.
    pub threshold: f64,
    /// Whether the threshold has been reached.
    pub complete: bool,
}

#[derive(Clone, Debug)]
pub(crate) struct ClusterOperation {
    id: OperationId,
    clusters: OperationClusters,
    state: OperationState,
    crossing_edges: u64,
    expected_intra: f64,
    expected_inter: f64,
    p_in_single: f64,
}

impl ClusterOperation {
    pub(crate) const fn new(id: OperationId, clusters: OperationClusters, p_in_single: f64) -> Self {
        Self {
            id,
            clusters,
            state: OperationState::Created,
            crossing_edges: 0,
            expected_intra: 0.0,
            expected_inter: 0.0,
            p_in_single,
        }
    }

    pub(crate) const fn id(&self) -> OperationId {
        self.id
    }

    pub(crate) const fn clusters(&self) -> OperationClusters {
        self.clusters
    }

    pub(crate) const fn kind(&self) -> OperationKind {
        match self.clusters {
            OperationClusters::Split { .. } => OperationKind::Split,
            OperationClusters::Merge { .. } => OperationKind::Merge,
        }
    }

    #[cfg(test)]
    pub(crate) const fn state(&self) -> OperationState {
        self.state
    }

    pub(crate) const fn crossing_edges(&self) -> u64 {
        self.crossing_edges
    }

    pub(crate) fn set_running(&mut self, crossing_edges: u64) {
        self.crossing_edges = crossing_edges;
        self.state = OperationState::Running;
    }

    pub(crate) fn set_finished(&mut self) {
        self.state = OperationState::Finished;
    }

    pub(crate) fn notify_edge_inserted(&mut self) {
        self.crossing_edges += 1;
    }

    pub(crate) fn notify_edge_deleted(&mut self) -> Result<()> {
        debug_assert!(self.crossing_edges > 0, "crossing edge counter underflow");
        self.crossing_edges = self.crossing_edges.checked_sub(1).ok_or_else(|| {
            GraphError::invariant(format!(
                "operation {} lost a crossing edge it never counted",
                self.id
            ))
        })?;
        Ok(())
    }

    /// Recomputes the expected crossing counts from the current sizes of the
    /// two halves.
    pub(crate) fn update_densities(&mut self, clusters: &Arena<OrdinaryCluster>, p_out: f64) {
        let (left, right) = match self.clusters {
            OperationClusters::Split { first, second, .. } => (first, second),
            OperationClusters::Merge { first, second, .. } => (first, second),
        };
        let size = |id| clusters.get(id).map_or(0, OrdinaryCluster::node_count);
        let pairs = (size(left) * size(right)) as f64;
        self.expected_intra = pairs * self.p_in_single;
        self.expected_inter = pairs * p_out;
    }

    pub(crate) fn threshold(&self, theta: f64) -> f64 {
        theta * self.expected_intra + (1.0 - theta) * self.expected_inter
    }

    /// A split completes once few enough edges cross its halves, a merge once
    /// enough do. Completion is sticky.
    pub(crate) fn is_complete(&mut self, theta: f64) -> bool {
        if self.state == OperationState::Complete {
            return true;
        }
        if self.state != OperationState::Running {
            return false;
        }
        let crossing = self.crossing_edges as f64;
        let threshold = self.threshold(theta);
        let complete = match self.kind() {
            OperationKind::Split => crossing <= threshold,
            OperationKind::Merge => crossing >= threshold,
        };
        if complete {
            self.state = OperationState::Complete;
        }
        complete
    }

    /// Picks the reference cluster and half for a node that just joined the
    /// locked ground-truth cluster `joined`.
    ///
    /// During a split the node is observed in the initial cluster and sits on
    /// the half it joined. During a merge it is observed in one of the two
    /// initial clusters, chosen in proportion to their sizes.
    pub(crate) fn reference_for_new_node(
        &self,
        joined: ClusterId,
        clusters: &Arena<OrdinaryCluster>,
        random: &mut impl RandomSource,
    ) -> (ClusterId, Side) {
        match self.clusters {
            OperationClusters::Split { initial, first, .. } => {
                let side = if joined == first { Side::First } else { Side::Second };
                (initial, side)
            }
            OperationClusters::Merge { first, second, .. } => {
                let size = |id| clusters.get(id).map_or(0, OrdinaryCluster::node_count);
                let (left, right) = (size(first), size(second));
                let total = (left + right) as f64;
                if random.next_f64() * total < left as f64 {
                    (first, Side::Second)
                } else {
                    (second, Side::First)
                }
            }
        }
    }

    pub(crate) fn status(&self, theta: f64) -> OperationStatus {
        let threshold = self.threshold(theta);
        let crossing = self.crossing_edges as f64;
        let complete = self.state == OperationState::Complete
            || match self.kind() {
                OperationKind::Split => crossing <= threshold,
                OperationKind::Merge => crossing >= threshold,
            };
        OperationStatus {
            id: self.id,
            kind: self.kind(),
            state: self.state,
            crossing_edges: self.crossing_edges,
            threshold,
            complete,
        }
    }
}

#[cfg(test)]
mod tests;
