//! Edge insertion and removal.

use tracing::{debug, instrument};

use crate::{
    cluster::{ClusterId, ClusterRef},
    edge::{Edge, EdgeKind},
    error::{GraphError, Result},
    journal::{GraphEvent, JournalSink},
    node::NodeId,
    random::RandomSource,
};

use super::{DcrGraph, ordinary_mut};

impl<R, J> DcrGraph<R, J>
where
    R: RandomSource,
    J: JournalSink,
{
    /// Decides whether the next edge operation inserts or deletes.
    ///
    /// Insertion wins with probability `I / (I + D)`, where `I` and `D` are
    /// the total weights of the insertion and deletion trees. An empty graph
    /// with no weight at all always answers insertion.
    pub fn shall_do_edge_insertion(&mut self) -> bool {
        let insertion = self.insertion_tree.total_weight();
        let total = insertion + self.deletion_tree.total_weight();
        if total <= 0.0 {
            return true;
        }
        self.random.next_f64() * total < insertion
    }

    /// Inserts a random non-edge drawn through the insertion tree.
    ///
    /// Returns `None` when no non-edge is left.
    ///
    /// # Errors
    /// Propagates structural contract failures as [`GraphError`].
    #[instrument(name = "graph.add_edge", err, skip(self), fields(time_step = self.counters.time_step))]
    pub fn add_edge(&mut self) -> Result<Option<Edge>> {
        if self.insertion_tree.total_weight() <= 0.0 {
            debug!("no non-edge left to insert");
            return Ok(None);
        }
        let pair = match self.insertion_tree.select(&mut self.random)? {
            ClusterRef::Pseudo => self.pseudo.find_non_edge(&mut self.random),
            ClusterRef::Ordinary(id) => self
                .clusters
                .get(id)
                .ok_or(GraphError::UnknownCluster {
                    cluster: id.index() as u64,
                })?
                .find_non_edge(&mut self.random),
        };
        let Some((first, second)) = pair else {
            debug!("selected cluster has no non-edge left");
            return Ok(None);
        };
        self.insert_edge(first, second)?;
        self.count_small_operations(1);
        Ok(Some(Edge::new(first, second)))
    }

    /// Deletes a random edge drawn through the deletion tree.
    ///
    /// Returns `None` when no edge is left.
    ///
    /// # Errors
    /// Propagates structural contract failures as [`GraphError`].
    #[instrument(name = "graph.remove_edge", err, skip(self), fields(time_step = self.counters.time_step))]
    pub fn remove_edge(&mut self) -> Result<Option<Edge>> {
        if self.deletion_tree.total_weight() <= 0.0 {
            debug!("no edge left to delete");
            return Ok(None);
        }
        let edge = match self.deletion_tree.select(&mut self.random)? {
            ClusterRef::Pseudo => self.pseudo.find_edge(&mut self.random),
            ClusterRef::Ordinary(id) => self
                .clusters
                .get(id)
                .ok_or(GraphError::UnknownCluster {
                    cluster: id.index() as u64,
                })?
                .find_edge(&mut self.random),
        };
        let Some(edge) = edge else {
            debug!("selected cluster has no edge left");
            return Ok(None);
        };
        self.delete_edge(edge.source(), edge.target())?;
        self.count_small_operations(1);
        Ok(Some(edge))
    }

    /// Inserts the edge between `first` and `second`.
    ///
    /// # Errors
    /// Returns [`GraphError::SelfLoop`] when both endpoints coincide,
    /// [`GraphError::DuplicateEdge`] when the edge exists and
    /// [`GraphError::UnknownNode`] for a missing endpoint.
    #[instrument(name = "graph.add_edge_between", err, skip(self))]
    pub fn add_edge_between(&mut self, first: NodeId, second: NodeId) -> Result<()> {
        self.insert_edge(first, second)?;
        self.count_small_operations(1);
        Ok(())
    }

    /// Deletes the edge between `first` and `second`.
    ///
    /// # Errors
    /// Returns [`GraphError::MissingEdge`] when the edge does not exist and
    /// [`GraphError::UnknownNode`] for a missing endpoint.
    #[instrument(name = "graph.remove_edge_between", err, skip(self))]
    pub fn remove_edge_between(&mut self, first: NodeId, second: NodeId) -> Result<()> {
        self.delete_edge(first, second)?;
        self.count_small_operations(1);
        Ok(())
    }

    pub(crate) fn insert_edge(&mut self, first: NodeId, second: NodeId) -> Result<()> {
        if first == second {
            return Err(GraphError::SelfLoop {
                node: self.node_journal_id(first),
            });
        }
        let home = self.ground_truth_of(first)?;
        let away = self.ground_truth_of(second)?;
        if self.pseudo.contains_pair(first, second, &self.nodes)? {
            return Err(GraphError::DuplicateEdge {
                first: self.node_journal_id(first),
                second: self.node_journal_id(second),
            });
        }
        let edge = Edge::new(first, second);
        let kind = if home == away {
            ordinary_mut(&mut self.clusters, home)?.add_intra_edge(edge, &self.nodes)?;
            EdgeKind::Intra
        } else {
            ordinary_mut(&mut self.clusters, home)?.add_inter_twin(edge, &self.nodes)?;
            ordinary_mut(&mut self.clusters, away)?.add_inter_twin(edge.reversed(), &self.nodes)?;
            EdgeKind::Inter
        };
        self.pseudo.add_edge(edge, kind, &self.nodes)?;
        self.notify_operation(first, second, true)?;
        self.after_edge_change(home, away)?;
        let event = GraphEvent::CreateEdge {
            source: self.node_journal_id(first),
            target: self.node_journal_id(second),
        };
        self.journal.record_graph(event);
        Ok(())
    }

    pub(crate) fn delete_edge(&mut self, first: NodeId, second: NodeId) -> Result<()> {
        let home = self.ground_truth_of(first)?;
        let away = self.ground_truth_of(second)?;
        if first == second || !self.pseudo.contains_pair(first, second, &self.nodes)? {
            return Err(GraphError::MissingEdge {
                first: self.node_journal_id(first),
                second: self.node_journal_id(second),
            });
        }
        let edge = Edge::new(first, second);
        if home == away {
            ordinary_mut(&mut self.clusters, home)?.remove_intra_edge(edge, &self.nodes)?;
        } else {
            ordinary_mut(&mut self.clusters, home)?.remove_inter_twin(edge, &self.nodes)?;
            ordinary_mut(&mut self.clusters, away)?.remove_inter_twin(edge.reversed(), &self.nodes)?;
        }
        self.pseudo.remove_edge(edge, &self.nodes)?;
        self.notify_operation(first, second, false)?;
        self.after_edge_change(home, away)?;
        let event = GraphEvent::RemoveEdge {
            source: self.node_journal_id(first),
            target: self.node_journal_id(second),
        };
        self.journal.record_graph(event);
        Ok(())
    }

    fn after_edge_change(&mut self, home: ClusterId, away: ClusterId) -> Result<()> {
        self.refresh_weights(ClusterRef::Ordinary(home))?;
        if home != away {
            self.refresh_weights(ClusterRef::Ordinary(away))?;
        }
        self.refresh_weights(ClusterRef::Pseudo)
    }
}
