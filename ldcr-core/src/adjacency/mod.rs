//! Dual-indexed adjacency storage for a single cluster.
//!
//! Every node slot owns two neighbour lists, one for intra-cluster and one
//! for inter-cluster edges. A lookup map from directed twin to list position
//! keeps edge removal `O(1)` through swap-with-last, and node removal uses the
//! same trick on the slot arrays. Intra-cluster edges are stored as both
//! twins; an inter-cluster edge stores only the twin leaving this cluster.

use std::collections::HashMap;

use crate::{
    arena::Arena,
    cluster::ClusterId,
    clustering::View,
    edge::{Edge, EdgeKind},
    error::{GraphError, Result},
    node::{Node, NodeId, Placement},
};

/// Views through which a cluster is currently visible.
///
/// Adding or moving a node refreshes the node's placement for every view the
/// owning cluster is part of.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub(crate) struct Views {
    pub(crate) ground_truth: bool,
    pub(crate) reference: bool,
}

#[derive(Clone, Copy, Debug)]
struct Position {
    kind: EdgeKind,
    index: usize,
}

#[derive(Clone, Debug)]
pub(crate) struct AdjacencyStore {
    cluster: ClusterId,
    nodes: Vec<NodeId>,
    intra: Vec<Vec<NodeId>>,
    inter: Vec<Vec<NodeId>>,
    positions: HashMap<Edge, Position>,
    intra_edges: usize,
    inter_edges: usize,
}

impl AdjacencyStore {
    pub(crate) fn new(cluster: ClusterId) -> Self {
        Self {
            cluster,
            nodes: Vec::new(),
            intra: Vec::new(),
            inter: Vec::new(),
            positions: HashMap::new(),
            intra_edges: 0,
            inter_edges: 0,
        }
    }

    pub(crate) fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub(crate) fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    pub(crate) fn node_at(&self, slot: usize) -> Option<NodeId> {
        self.nodes.get(slot).copied()
    }

    pub(crate) fn last_node(&self) -> Option<NodeId> {
        self.nodes.last().copied()
    }

    /// Number of undirected intra-cluster edges.
    pub(crate) const fn intra_edge_count(&self) -> usize {
        self.intra_edges
    }

    /// Number of inter-cluster twins leaving this cluster.
    pub(crate) const fn inter_edge_count(&self) -> usize {
        self.inter_edges
    }

    /// Resolves the slot `node` occupies in this store.
    ///
    /// The ground-truth placement wins; when a cluster is in both views the
    /// two placements agree.
    pub(crate) fn slot_of(&self, node: &Node) -> Option<usize> {
        [node.ground_truth, node.reference]
            .into_iter()
            .flatten()
            .find(|placement| placement.cluster == self.cluster)
            .map(|placement| placement.slot)
    }

    pub(crate) fn contains_node(&self, id: NodeId, node: &Node) -> bool {
        self.slot_of(node)
            .and_then(|slot| self.node_at(slot))
            .is_some_and(|stored| stored == id)
    }

    pub(crate) fn contains_edge(&self, edge: Edge) -> bool {
        self.positions.contains_key(&edge)
    }

    pub(crate) fn kind_of(&self, edge: Edge) -> Option<EdgeKind> {
        self.positions.get(&edge).map(|position| position.kind)
    }

    pub(crate) fn intra_neighbours(&self, slot: usize) -> &[NodeId] {
        self.intra.get(slot).map_or(&[], Vec::as_slice)
    }

    pub(crate) fn inter_neighbours(&self, slot: usize) -> &[NodeId] {
        self.inter.get(slot).map_or(&[], Vec::as_slice)
    }

    pub(crate) fn degree(&self, slot: usize) -> usize {
        self.intra_neighbours(slot).len() + self.inter_neighbours(slot).len()
    }

    /// Iterates over the twins leaving the node in `slot`, intra-cluster ones
    /// first.
    pub(crate) fn edges_of(&self, slot: usize) -> impl Iterator<Item = Edge> + '_ {
        let source = self.node_at(slot);
        self.intra_neighbours(slot)
            .iter()
            .chain(self.inter_neighbours(slot))
            .filter_map(move |&target| source.map(|source| Edge::new(source, target)))
    }

    /// Iterates over every intra-cluster edge once, as its canonical twin.
    pub(crate) fn intra_edges(&self) -> impl Iterator<Item = Edge> + '_ {
        self.nodes
            .iter()
            .zip(&self.intra)
            .flat_map(|(&source, targets)| {
                targets
                    .iter()
                    .map(move |&target| Edge::new(source, target))
            })
            .filter(|edge| edge.source() < edge.target())
    }

    /// Iterates over every inter-cluster twin leaving this cluster.
    pub(crate) fn inter_edges(&self) -> impl Iterator<Item = Edge> + '_ {
        self.nodes
            .iter()
            .zip(&self.inter)
            .flat_map(|(&source, targets)| {
                targets
                    .iter()
                    .map(move |&target| Edge::new(source, target))
            })
    }

    /// Appends `id` to the store and records its placement for `views`.
    pub(crate) fn add_node(
        &mut self,
        id: NodeId,
        nodes: &mut Arena<Node>,
        views: Views,
    ) -> Result<usize> {
        let slot = self.nodes.len();
        let node = nodes.get_mut(id).ok_or(GraphError::UnknownNode {
            node: id.index() as u64,
        })?;
        self.nodes.push(id);
        self.intra.push(Vec::new());
        self.inter.push(Vec::new());
        place(node, self.cluster, slot, views);
        Ok(slot)
    }

    /// Removes the isolated node `id`, moving the last node into its slot.
    ///
    /// # Errors
    /// Returns [`GraphError::NodeNotIsolated`] when `id` still has edges and
    /// [`GraphError::UnknownNode`] when it is not stored here.
    pub(crate) fn remove_node(
        &mut self,
        id: NodeId,
        nodes: &mut Arena<Node>,
        views: Views,
    ) -> Result<()> {
        let slot = self.require_slot(id, nodes)?;
        let degree = self.degree(slot);
        if degree > 0 {
            return Err(GraphError::NodeNotIsolated {
                node: journal_id(nodes, id),
                degree,
            });
        }
        self.nodes.swap_remove(slot);
        self.intra.swap_remove(slot);
        self.inter.swap_remove(slot);
        if let Some(moved) = self.nodes.get(slot).copied() {
            if let Some(node) = nodes.get_mut(moved) {
                place(node, self.cluster, slot, views);
            }
        }
        if let Some(node) = nodes.get_mut(id) {
            unplace(node, self.cluster);
        }
        Ok(())
    }

    /// Stores `edge`, both twins for an intra-cluster edge.
    ///
    /// # Errors
    /// Returns [`GraphError::DuplicateEdge`] when the twin is already stored
    /// and [`GraphError::UnknownNode`] when an endpoint that must live here
    /// does not.
    pub(crate) fn add_edge(&mut self, edge: Edge, kind: EdgeKind, nodes: &Arena<Node>) -> Result<()> {
        if self.contains_edge(edge) {
            return Err(GraphError::DuplicateEdge {
                first: journal_id(nodes, edge.source()),
                second: journal_id(nodes, edge.target()),
            });
        }
        let source_slot = self.require_slot(edge.source(), nodes)?;
        match kind {
            EdgeKind::Intra => {
                let target_slot = self.require_slot(edge.target(), nodes)?;
                self.push_twin(edge, source_slot, kind);
                self.push_twin(edge.reversed(), target_slot, kind);
                self.intra_edges += 1;
            }
            EdgeKind::Inter => {
                self.push_twin(edge, source_slot, kind);
                self.inter_edges += 1;
            }
        }
        Ok(())
    }

    /// Removes `edge` and returns how it was classified.
    ///
    /// # Errors
    /// Returns [`GraphError::MissingEdge`] when the twin is not stored.
    pub(crate) fn remove_edge(&mut self, edge: Edge, nodes: &Arena<Node>) -> Result<EdgeKind> {
        let kind = self.kind_of(edge).ok_or(GraphError::MissingEdge {
            first: journal_id(nodes, edge.source()),
            second: journal_id(nodes, edge.target()),
        })?;
        self.drop_twin(edge, nodes)?;
        match kind {
            EdgeKind::Intra => {
                self.drop_twin(edge.reversed(), nodes)?;
                self.intra_edges -= 1;
            }
            EdgeKind::Inter => self.inter_edges -= 1,
        }
        Ok(kind)
    }

    /// Drops every edge while keeping the nodes in place.
    pub(crate) fn clear_edges(&mut self) {
        self.intra.iter_mut().for_each(Vec::clear);
        self.inter.iter_mut().for_each(Vec::clear);
        self.positions.clear();
        self.intra_edges = 0;
        self.inter_edges = 0;
    }

    /// Rewrites the placement of every stored node after the owning cluster
    /// entered or left a view.
    pub(crate) fn assign_view(&self, nodes: &mut Arena<Node>, view: View, present: bool) {
        for (slot, &id) in self.nodes.iter().enumerate() {
            let Some(node) = nodes.get_mut(id) else {
                continue;
            };
            let placement = present.then_some(Placement {
                cluster: self.cluster,
                slot,
            });
            match view {
                View::GroundTruth => node.ground_truth = placement,
                View::Reference => node.reference = placement,
            }
        }
    }

    fn require_slot(&self, id: NodeId, nodes: &Arena<Node>) -> Result<usize> {
        nodes
            .get(id)
            .filter(|node| self.contains_node(id, node))
            .and_then(|node| self.slot_of(node))
            .ok_or_else(|| GraphError::UnknownNode {
                node: journal_id(nodes, id),
            })
    }

    fn list_mut(&mut self, slot: usize, kind: EdgeKind) -> Option<&mut Vec<NodeId>> {
        match kind {
            EdgeKind::Intra => self.intra.get_mut(slot),
            EdgeKind::Inter => self.inter.get_mut(slot),
        }
    }

    fn push_twin(&mut self, edge: Edge, slot: usize, kind: EdgeKind) {
        if let Some(list) = self.list_mut(slot, kind) {
            list.push(edge.target());
            let index = list.len() - 1;
            self.positions.insert(edge, Position { kind, index });
        }
    }

    fn drop_twin(&mut self, edge: Edge, nodes: &Arena<Node>) -> Result<()> {
        let position = self.positions.remove(&edge).ok_or_else(|| {
            GraphError::invariant(format!("twin of {edge:?} is missing from its store"))
        })?;
        let slot = self.require_slot(edge.source(), nodes)?;
        let list = self.list_mut(slot, position.kind).ok_or_else(|| {
            GraphError::invariant(format!("slot {slot} has no adjacency list"))
        })?;
        list.swap_remove(position.index);
        let moved = list.get(position.index).copied();
        if let Some(target) = moved {
            self.positions.insert(Edge::new(edge.source(), target), position);
        }
        Ok(())
    }
}

fn place(node: &mut Node, cluster: ClusterId, slot: usize, views: Views) {
    let placement = Some(Placement { cluster, slot });
    if views.ground_truth {
        node.ground_truth = placement;
    }
    if views.reference {
        node.reference = placement;
    }
}

fn unplace(node: &mut Node, cluster: ClusterId) {
    if node.ground_truth.is_some_and(|placement| placement.cluster == cluster) {
        node.ground_truth = None;
    }
    if node.reference.is_some_and(|placement| placement.cluster == cluster) {
        node.reference = None;
    }
}

/// Journal identifier of `id`, falling back to the raw handle for nodes that
/// no longer exist.
pub(crate) fn journal_id(nodes: &Arena<Node>, id: NodeId) -> u64 {
    nodes
        .get(id)
        .map_or(id.index() as u64, Node::journal_id)
}
