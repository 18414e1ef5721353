//! Ordinary clusters and the graph-wide pseudo cluster.
//!
//! Both kinds feed the two global selection trees through the shared
//! [`WeightedCluster`] contract. The trees store a [`ClusterRef`] tag, so the
//! graph dispatches on the tag when a selected cluster must sample an edge or
//! a non-edge.

mod ordinary;
mod pseudo;

pub use self::ordinary::OrdinaryCluster;
pub(crate) use self::pseudo::PseudoCluster;

use crate::{arena::Id, selection_tree::TreeHandle};

/// Stable handle to an [`OrdinaryCluster`] owned by a [`crate::DcrGraph`].
pub type ClusterId = Id<OrdinaryCluster>;

/// Item stored in the global insertion and deletion trees.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub(crate) enum ClusterRef {
    Pseudo,
    Ordinary(ClusterId),
}

/// Handles of a cluster's entries in the two global trees.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub(crate) struct WeightEntries {
    pub(crate) insertion: Option<TreeHandle>,
    pub(crate) deletion: Option<TreeHandle>,
}

/// Weights a cluster contributes to the global selection trees.
pub(crate) trait WeightedCluster {
    /// Weight of drawing an edge insertion from this cluster.
    fn insertion_weight(&self, p_out: f64) -> f64;

    /// Weight of drawing an edge deletion from this cluster.
    fn deletion_weight(&self, p_out: f64) -> f64;

    fn weight_entries(&self) -> WeightEntries;

    fn weight_entries_mut(&mut self) -> &mut WeightEntries;
}

/// Converts a pair count into a tree weight.
///
/// Counts stay far below 2^52 for any graph that fits in memory, so the
/// conversion is exact.
pub(crate) const fn as_weight(count: u64) -> f64 {
    count as f64
}

#[cfg(test)]
mod tests;
