//! Undirected edges expressed as a pair of directed twins.

use crate::node::NodeId;

/// Directed instance of an undirected edge.
///
/// Every undirected edge is represented by two twins, `(u, v)` and `(v, u)`.
/// Stores key their position lookups by the directed twin they hold.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Edge {
    source: NodeId,
    target: NodeId,
}

impl Edge {
    /// Creates the directed twin from `source` to `target`.
    #[must_use]
    pub const fn new(source: NodeId, target: NodeId) -> Self {
        Self { source, target }
    }

    /// Returns the endpoint the twin starts at.
    #[must_use]
    pub const fn source(self) -> NodeId {
        self.source
    }

    /// Returns the endpoint the twin points to.
    #[must_use]
    pub const fn target(self) -> NodeId {
        self.target
    }

    /// Returns the opposite twin.
    #[must_use]
    pub const fn reversed(self) -> Self {
        Self {
            source: self.target,
            target: self.source,
        }
    }

    /// Returns the twin whose source is the smaller handle.
    #[must_use]
    pub fn canonical(self) -> Self {
        if self.source <= self.target {
            self
        } else {
            self.reversed()
        }
    }

    /// Returns whether `node` is one of the endpoints.
    #[must_use]
    pub fn touches(self, node: NodeId) -> bool {
        self.source == node || self.target == node
    }
}

/// Classification of an edge relative to the ground-truth clustering.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum EdgeKind {
    /// Both endpoints share a ground-truth cluster.
    Intra,
    /// The endpoints sit in different ground-truth clusters.
    Inter,
}
