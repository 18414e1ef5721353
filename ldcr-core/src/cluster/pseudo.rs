//! The graph-wide pseudo cluster.
//!
//! Every ground-truth node is also stored here. The sampler runs over the
//! pair space of the pseudo slots and holds every edge of the graph, so the
//! pseudo cluster can draw global non-edges; the separate inter-cluster list
//! answers uniform inter-cluster edge draws.

use std::collections::HashMap;

use crate::{
    adjacency::journal_id,
    arena::Arena,
    edge::{Edge, EdgeKind},
    error::{GraphError, Result},
    node::{Node, NodeId},
    pair_index::{max_edge_count, pair_from_index, pair_index},
    random::RandomSource,
    sampler::DomainSampler,
};

use super::{WeightEntries, WeightedCluster, as_weight};

#[derive(Clone, Debug, Default)]
pub(crate) struct PseudoCluster {
    nodes: Vec<NodeId>,
    sampler: DomainSampler,
    inter_edges: Vec<Edge>,
    inter_positions: HashMap<Edge, usize>,
    pub(crate) weights: WeightEntries,
}

impl PseudoCluster {
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

    /// Number of edges in the whole graph.
    pub(crate) const fn edge_count(&self) -> u64 {
        self.sampler.len()
    }

    pub(crate) fn inter_edge_count(&self) -> usize {
        self.inter_edges.len()
    }

    pub(crate) fn inter_edges(&self) -> &[Edge] {
        &self.inter_edges
    }

    pub(crate) fn non_edge_count(&self) -> u64 {
        max_edge_count(self.nodes.len() as u64) - self.edge_count()
    }

    pub(crate) fn contains_pair(&self, first: NodeId, second: NodeId, nodes: &Arena<Node>) -> Result<bool> {
        let index = self.pair_index(first, second, nodes)?;
        Ok(self.sampler.contains(index))
    }

    pub(crate) fn add_node(&mut self, id: NodeId, nodes: &mut Arena<Node>) -> Result<()> {
        let node = nodes.get_mut(id).ok_or(GraphError::UnknownNode {
            node: id.index() as u64,
        })?;
        node.pseudo_slot = Some(self.nodes.len());
        self.nodes.push(id);
        self.sampler.resize(max_edge_count(self.nodes.len() as u64))
    }

    /// Removes the isolated node `id`.
    ///
    /// `last_neighbours` must list every neighbour of [`Self::last_node`]; the
    /// pairs of that node are re-indexed because it moves into the vacated
    /// slot.
    pub(crate) fn remove_node(
        &mut self,
        id: NodeId,
        nodes: &mut Arena<Node>,
        last_neighbours: &[NodeId],
    ) -> Result<()> {
        let slot = self.slot(id, nodes)?;
        let moved = self.last_node().filter(|&last| last != id);
        if let Some(last) = moved {
            for &neighbour in last_neighbours {
                let index = self.pair_index(last, neighbour, nodes)?;
                self.sampler.delete(index)?;
            }
        }
        self.nodes.swap_remove(slot);
        if let Some(node) = nodes.get_mut(id) {
            node.pseudo_slot = None;
        }
        if let Some(last) = moved {
            if let Some(node) = nodes.get_mut(last) {
                node.pseudo_slot = Some(slot);
            }
            for &neighbour in last_neighbours {
                let index = self.pair_index(last, neighbour, nodes)?;
                self.sampler.select(index)?;
            }
        }
        self.sampler
            .fast_resize(max_edge_count(self.nodes.len() as u64))
    }

    pub(crate) fn add_edge(&mut self, edge: Edge, kind: EdgeKind, nodes: &Arena<Node>) -> Result<()> {
        let index = self.pair_index(edge.source(), edge.target(), nodes)?;
        self.sampler.select(index).map_err(|_| GraphError::DuplicateEdge {
            first: journal_id(nodes, edge.source()),
            second: journal_id(nodes, edge.target()),
        })?;
        if kind == EdgeKind::Inter {
            self.list_inter_edge(edge);
        }
        Ok(())
    }

    pub(crate) fn remove_edge(&mut self, edge: Edge, nodes: &Arena<Node>) -> Result<()> {
        let index = self.pair_index(edge.source(), edge.target(), nodes)?;
        self.sampler.delete(index).map_err(|_| GraphError::MissingEdge {
            first: journal_id(nodes, edge.source()),
            second: journal_id(nodes, edge.target()),
        })?;
        self.unlist_inter_edge(edge);
        Ok(())
    }

    /// Moves `edge` into or out of the inter-cluster list after its endpoints
    /// changed ground-truth clusters.
    pub(crate) fn update_status(&mut self, edge: Edge, kind: EdgeKind) {
        let listed = self.inter_positions.contains_key(&edge.canonical());
        match kind {
            EdgeKind::Inter if !listed => self.list_inter_edge(edge),
            EdgeKind::Intra if listed => self.unlist_inter_edge(edge),
            EdgeKind::Inter | EdgeKind::Intra => {}
        }
    }

    /// Draws a uniformly random inter-cluster edge without removing it.
    pub(crate) fn find_edge(&self, random: &mut impl RandomSource) -> Option<Edge> {
        if self.inter_edges.is_empty() {
            return None;
        }
        self.inter_edges
            .get(random.next_below(self.inter_edges.len()))
            .copied()
    }

    /// Draws a uniformly random unconnected pair of the whole graph.
    pub(crate) fn find_non_edge(&self, random: &mut impl RandomSource) -> Option<(NodeId, NodeId)> {
        let index = self.sampler.propose_for_selection(random)?;
        let (high, low) = pair_from_index(index);
        let first = self.node_at(usize::try_from(high).ok()?)?;
        let second = self.node_at(usize::try_from(low).ok()?)?;
        Some((first, second))
    }

    fn list_inter_edge(&mut self, edge: Edge) {
        let canonical = edge.canonical();
        self.inter_positions.insert(canonical, self.inter_edges.len());
        self.inter_edges.push(canonical);
    }

    fn unlist_inter_edge(&mut self, edge: Edge) {
        let Some(position) = self.inter_positions.remove(&edge.canonical()) else {
            return;
        };
        self.inter_edges.swap_remove(position);
        if let Some(&moved) = self.inter_edges.get(position) {
            self.inter_positions.insert(moved, position);
        }
    }

    fn slot(&self, id: NodeId, nodes: &Arena<Node>) -> Result<usize> {
        nodes
            .get(id)
            .and_then(|node| node.pseudo_slot)
            .filter(|&slot| self.node_at(slot) == Some(id))
            .ok_or_else(|| GraphError::UnknownNode {
                node: journal_id(nodes, id),
            })
    }

    fn pair_index(&self, first: NodeId, second: NodeId, nodes: &Arena<Node>) -> Result<u64> {
        if first == second {
            return Err(GraphError::SelfLoop {
                node: journal_id(nodes, first),
            });
        }
        let first = self.slot(first, nodes)? as u64;
        let second = self.slot(second, nodes)? as u64;
        Ok(pair_index(first, second))
    }
}

impl WeightedCluster for PseudoCluster {
    fn insertion_weight(&self, p_out: f64) -> f64 {
        as_weight(self.non_edge_count()) * p_out
    }

    fn deletion_weight(&self, p_out: f64) -> f64 {
        as_weight(self.inter_edge_count() as u64) * (1.0 - p_out)
    }

    fn weight_entries(&self) -> WeightEntries {
        self.weights
    }

    fn weight_entries_mut(&mut self) -> &mut WeightEntries {
        &mut self.weights
    }
}
