//! Append-only event streams describing a generation run.
//!
//! The graph writes two channels: structural events (nodes, edges and
//! cluster membership) and clustering events (time steps and the start and
//! end of splits and merges). Node and cluster identifiers are the 1-based
//! journal identifiers assigned at creation.

/// Event on the graph channel.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum GraphEvent {
    /// A node was created in the given ground-truth and reference clusters.
    CreateNode {
        /// Ground-truth cluster of the new node.
        cluster: u64,
        /// Reference cluster of the new node.
        reference: u64,
    },
    /// A node was removed.
    RemoveNode {
        /// Removed node.
        node: u64,
    },
    /// An edge was created.
    CreateEdge {
        /// First endpoint.
        source: u64,
        /// Second endpoint.
        target: u64,
    },
    /// An edge was removed.
    RemoveEdge {
        /// First endpoint.
        source: u64,
        /// Second endpoint.
        target: u64,
    },
    /// A node moved to another ground-truth cluster.
    SetCluster {
        /// Relocated node.
        node: u64,
        /// New ground-truth cluster.
        cluster: u64,
    },
    /// A node moved to another reference cluster.
    SetRefCluster {
        /// Relocated node.
        node: u64,
        /// New reference cluster.
        cluster: u64,
    },
    /// The time step advanced.
    NextStep,
}

impl GraphEvent {
    /// Returns the stable opcode of the event.
    #[must_use]
    pub const fn opcode(self) -> u8 {
        match self {
            Self::CreateNode { .. } => 1,
            Self::RemoveNode { .. } => 2,
            Self::CreateEdge { .. } => 3,
            Self::RemoveEdge { .. } => 4,
            Self::SetCluster { .. } => 5,
            Self::SetRefCluster { .. } => 6,
            Self::NextStep => 7,
        }
    }
}

/// Event on the clustering channel.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ClusteringEvent {
    /// The time step advanced.
    NextStep,
    /// Clusters `first` and `second` started merging into `merged`.
    Merge {
        /// First initial cluster.
        first: u64,
        /// Second initial cluster.
        second: u64,
        /// Resulting cluster.
        merged: u64,
    },
    /// Cluster `initial` started splitting into `first` and `second`.
    Split {
        /// Cluster being split.
        initial: u64,
        /// First resulting cluster.
        first: u64,
        /// Second resulting cluster.
        second: u64,
    },
    /// A merge reached its threshold.
    MergeDone {
        /// First initial cluster.
        first: u64,
        /// Second initial cluster.
        second: u64,
        /// Resulting cluster.
        merged: u64,
    },
    /// A split reached its threshold.
    SplitDone {
        /// Cluster that was split.
        initial: u64,
        /// First resulting cluster.
        first: u64,
        /// Second resulting cluster.
        second: u64,
    },
}

impl ClusteringEvent {
    /// Returns the stable opcode of the event.
    #[must_use]
    pub const fn opcode(self) -> u8 {
        match self {
            Self::NextStep => 0,
            Self::Merge { .. } => 1,
            Self::Split { .. } => 2,
            Self::MergeDone { .. } => 3,
            Self::SplitDone { .. } => 4,
        }
    }
}

/// Receiver of journal events.
pub trait JournalSink {
    /// Appends an event to the graph channel.
    fn record_graph(&mut self, event: GraphEvent);

    /// Appends an event to the clustering channel.
    fn record_clustering(&mut self, event: ClusteringEvent);
}

/// Journal keeping both channels in memory.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct MemoryJournal {
    graph: Vec<GraphEvent>,
    clustering: Vec<ClusteringEvent>,
}

impl MemoryJournal {
    /// Creates an empty journal.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the graph channel in recording order.
    #[must_use]
    pub fn graph_events(&self) -> &[GraphEvent] {
        &self.graph
    }

    /// Returns the clustering channel in recording order.
    #[must_use]
    pub fn clustering_events(&self) -> &[ClusteringEvent] {
        &self.clustering
    }
}

impl JournalSink for MemoryJournal {
    fn record_graph(&mut self, event: GraphEvent) {
        self.graph.push(event);
    }

    fn record_clustering(&mut self, event: ClusteringEvent) {
        self.clustering.push(event);
    }
}

/// Journal discarding every event.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct NullJournal;

impl JournalSink for NullJournal {
    fn record_graph(&mut self, _event: GraphEvent) {}

    fn record_clustering(&mut self, _event: ClusteringEvent) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opcodes_are_stable() {
        let graph = [
            GraphEvent::CreateNode {
                cluster: 1,
                reference: 1,
            },
            GraphEvent::RemoveNode { node: 1 },
            GraphEvent::CreateEdge { source: 1, target: 2 },
            GraphEvent::RemoveEdge { source: 1, target: 2 },
            GraphEvent::SetCluster { node: 1, cluster: 2 },
            GraphEvent::SetRefCluster { node: 1, cluster: 2 },
            GraphEvent::NextStep,
        ];
        let codes: Vec<u8> = graph.iter().map(|event| event.opcode()).collect();
        assert_eq!(codes, vec![1, 2, 3, 4, 5, 6, 7]);
        assert_eq!(ClusteringEvent::NextStep.opcode(), 0);
        assert_eq!(
            ClusteringEvent::SplitDone {
                initial: 1,
                first: 2,
                second: 3,
            }
            .opcode(),
            4
        );
    }

    #[test]
    fn memory_journal_keeps_channels_apart() {
        let mut journal = MemoryJournal::new();
        journal.record_graph(GraphEvent::NextStep);
        journal.record_clustering(ClusteringEvent::NextStep);
        journal.record_graph(GraphEvent::RemoveNode { node: 3 });
        assert_eq!(journal.graph_events().len(), 2);
        assert_eq!(journal.clustering_events(), &[ClusteringEvent::NextStep]);
    }
}
