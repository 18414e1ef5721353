//! Graph vertices and the per-view bookkeeping they carry.
//!
//! A node lives in up to three adjacency stores at once: the store of its
//! ground-truth cluster, the store of its reference cluster, and the graph-wide
//! pseudo cluster. Each membership is an optional [`Placement`], so "absent
//! from this view" is a typed state rather than a sentinel slot.

use crate::{arena::Id, cluster::ClusterId, operation::OperationId};

/// Stable handle to a node owned by a [`crate::DcrGraph`].
pub type NodeId = Id<Node>;

/// Position of a node inside one cluster's adjacency store.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct Placement {
    pub(crate) cluster: ClusterId,
    pub(crate) slot: usize,
}

/// Logical half of a running split or merge that a node belongs to.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Side {
    /// The first resulting cluster of a split, or the second initial cluster
    /// of a merge.
    First,
    /// The second resulting cluster of a split, or the first initial cluster
    /// of a merge.
    Second,
}

impl Side {
    /// Returns the other half.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::First => Self::Second,
            Self::Second => Self::First,
        }
    }
}

/// Tag linking a node to the operation currently relocating it.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct OperationMark {
    operation: OperationId,
    side: Side,
}

impl OperationMark {
    pub(crate) const fn new(operation: OperationId, side: Side) -> Self {
        Self { operation, side }
    }

    /// Returns the operation the node takes part in.
    #[must_use]
    pub const fn operation(self) -> OperationId {
        self.operation
    }

    /// Returns the half of the operation the node sits on.
    #[must_use]
    pub const fn side(self) -> Side {
        self.side
    }

    /// Returns the signed operation index: `+k` for [`Side::First`] and `-k`
    /// for [`Side::Second`].
    #[must_use]
    pub const fn signed_index(self) -> i64 {
        let index = self.operation.get() as i64;
        match self.side {
            Side::First => index,
            Side::Second => -index,
        }
    }
}

/// Vertex of the generated graph.
#[derive(Clone, Debug)]
pub struct Node {
    sequence: u64,
    pub(crate) ground_truth: Option<Placement>,
    pub(crate) reference: Option<Placement>,
    pub(crate) pseudo_slot: Option<usize>,
    pub(crate) mark: Option<OperationMark>,
}

impl Node {
    pub(crate) const fn new(sequence: u64) -> Self {
        Self {
            sequence,
            ground_truth: None,
            reference: None,
            pseudo_slot: None,
            mark: None,
        }
    }

    /// Returns the immutable global index of the node.
    ///
    /// Global indices start at two and never repeat within one graph.
    #[must_use]
    pub const fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Returns the 1-based identifier written to the journal.
    #[must_use]
    pub const fn journal_id(&self) -> u64 {
        self.sequence - 1
    }

    /// Returns the ground-truth cluster the node currently belongs to.
    #[must_use]
    pub fn ground_truth_cluster(&self) -> Option<ClusterId> {
        self.ground_truth.map(|placement| placement.cluster)
    }

    /// Returns the reference cluster the node currently belongs to.
    #[must_use]
    pub fn reference_cluster(&self) -> Option<ClusterId> {
        self.reference.map(|placement| placement.cluster)
    }

    /// Returns the running operation relocating this node, if any.
    #[must_use]
    pub const fn operation_mark(&self) -> Option<OperationMark> {
        self.mark
    }

    /// Returns the operation whose boundary an edge between `self` and
    /// `other` would cross.
    pub(crate) fn crossing_operation(&self, other: &Self) -> Option<OperationId> {
        match (self.mark, other.mark) {
            (Some(left), Some(right))
                if left.operation == right.operation && left.side != right.side =>
            {
                Some(left.operation)
            }
            _ => None,
        }
    }
}
