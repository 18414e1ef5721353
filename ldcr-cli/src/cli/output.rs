//! Rendering of run summaries and journal exports.

use std::io::{self, Write};

use ldcr_core::{ClusteringEvent, GenerationSummary, GraphEvent, MemoryJournal};
use serde::Serialize;

use super::commands::{GenerationReport, OutputFormat};

/// Summary of one run, tagged with its index and derived seed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RunRecord {
    /// Zero-based run index.
    pub run: usize,
    /// Seed the run was generated from.
    pub seed: u64,
    /// Completed time steps.
    pub time_step: u64,
    /// Final node count.
    pub nodes: usize,
    /// Final edge count.
    pub edges: u64,
    /// Final intra-cluster edge count.
    pub intra_edges: u64,
    /// Final inter-cluster edge count.
    pub inter_edges: u64,
    /// Final ground-truth cluster count.
    pub ground_truth_clusters: usize,
    /// Final reference cluster count.
    pub reference_clusters: usize,
    /// Splits and merges still running at the end.
    pub running_operations: usize,
    /// Splits and merges that finished.
    pub finished_operations: u64,
    /// Small-scale operations performed.
    pub small_operations: u64,
    /// Large-scale operations started.
    pub large_operations: u64,
}

impl RunRecord {
    /// Tags `summary` with its run index and seed.
    #[must_use]
    pub const fn new(run: usize, seed: u64, summary: &GenerationSummary) -> Self {
        Self {
            run,
            seed,
            time_step: summary.time_step,
            nodes: summary.nodes,
            edges: summary.edges,
            intra_edges: summary.intra_edges,
            inter_edges: summary.inter_edges,
            ground_truth_clusters: summary.ground_truth_clusters,
            reference_clusters: summary.reference_clusters,
            running_operations: summary.running_operations,
            finished_operations: summary.finished_operations,
            small_operations: summary.small_operations,
            large_operations: summary.large_operations,
        }
    }
}

/// Renders every run of `report` to `writer` in the requested format.
///
/// # Errors
/// Returns [`io::Error`] if writing to the supplied writer fails.
///
/// # Examples
/// ```
/// use ldcr_cli::cli::{GenerationReport, OutputFormat, RunRecord, render_report};
/// use ldcr_core::GenerationSummary;
///
/// let report = GenerationReport {
///     format: OutputFormat::Json,
///     runs: vec![RunRecord::new(0, 7, &GenerationSummary::default())],
///     exported_events: None,
/// };
/// let mut buffer = Vec::new();
/// render_report(&report, &mut buffer)?;
/// let line = String::from_utf8(buffer).expect("utf-8");
/// assert!(line.starts_with("{\"run\":0,\"seed\":7,"));
/// # Ok::<(), std::io::Error>(())
/// ```
pub fn render_report(report: &GenerationReport, mut writer: impl Write) -> io::Result<()> {
    for record in &report.runs {
        match report.format {
            OutputFormat::Human => render_human(record, &mut writer)?,
            OutputFormat::Json => {
                serde_json::to_writer(&mut writer, record)?;
                writeln!(writer)?;
            }
        }
    }
    Ok(())
}

fn render_human(record: &RunRecord, mut writer: impl Write) -> io::Result<()> {
    writeln!(writer, "run {} (seed {})", record.run, record.seed)?;
    writeln!(writer, "  time steps: {}", record.time_step)?;
    writeln!(writer, "  nodes: {}", record.nodes)?;
    writeln!(
        writer,
        "  edges: {} (intra {}, inter {})",
        record.edges, record.intra_edges, record.inter_edges
    )?;
    writeln!(
        writer,
        "  clusters: {} ground truth, {} reference",
        record.ground_truth_clusters, record.reference_clusters
    )?;
    writeln!(
        writer,
        "  large-scale operations: {} started, {} finished, {} running",
        record.large_operations, record.finished_operations, record.running_operations
    )?;
    writeln!(writer, "  small-scale operations: {}", record.small_operations)
}

#[derive(Debug, Serialize)]
struct JournalLine {
    channel: &'static str,
    opcode: u8,
    #[serde(flatten)]
    event: EventFields,
}

#[derive(Debug, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
enum EventFields {
    CreateNode { cluster: u64, reference: u64 },
    RemoveNode { node: u64 },
    CreateEdge { source: u64, target: u64 },
    RemoveEdge { source: u64, target: u64 },
    SetCluster { node: u64, cluster: u64 },
    SetRefCluster { node: u64, cluster: u64 },
    NextStep,
    MergeStart { first: u64, second: u64, merged: u64 },
    SplitStart { initial: u64, first: u64, second: u64 },
    MergeDone { first: u64, second: u64, merged: u64 },
    SplitDone { initial: u64, first: u64, second: u64 },
}

impl From<GraphEvent> for JournalLine {
    fn from(event: GraphEvent) -> Self {
        let fields = match event {
            GraphEvent::CreateNode { cluster, reference } => {
                EventFields::CreateNode { cluster, reference }
            }
            GraphEvent::RemoveNode { node } => EventFields::RemoveNode { node },
            GraphEvent::CreateEdge { source, target } => EventFields::CreateEdge { source, target },
            GraphEvent::RemoveEdge { source, target } => EventFields::RemoveEdge { source, target },
            GraphEvent::SetCluster { node, cluster } => EventFields::SetCluster { node, cluster },
            GraphEvent::SetRefCluster { node, cluster } => {
                EventFields::SetRefCluster { node, cluster }
            }
            GraphEvent::NextStep => EventFields::NextStep,
        };
        Self {
            channel: "graph",
            opcode: event.opcode(),
            event: fields,
        }
    }
}

impl From<ClusteringEvent> for JournalLine {
    fn from(event: ClusteringEvent) -> Self {
        let fields = match event {
            ClusteringEvent::NextStep => EventFields::NextStep,
            ClusteringEvent::Merge {
                first,
                second,
                merged,
            } => EventFields::MergeStart {
                first,
                second,
                merged,
            },
            ClusteringEvent::Split {
                initial,
                first,
                second,
            } => EventFields::SplitStart {
                initial,
                first,
                second,
            },
            ClusteringEvent::MergeDone {
                first,
                second,
                merged,
            } => EventFields::MergeDone {
                first,
                second,
                merged,
            },
            ClusteringEvent::SplitDone {
                initial,
                first,
                second,
            } => EventFields::SplitDone {
                initial,
                first,
                second,
            },
        };
        Self {
            channel: "clustering",
            opcode: event.opcode(),
            event: fields,
        }
    }
}

/// Writes the graph channel and then the clustering channel of `journal`
/// as JSON lines, returning the number of lines written.
///
/// # Errors
/// Returns [`io::Error`] if writing to the supplied writer fails.
pub fn write_journal(journal: &MemoryJournal, mut writer: impl Write) -> io::Result<usize> {
    let graph = journal.graph_events().iter().copied().map(JournalLine::from);
    let clustering = journal
        .clustering_events()
        .iter()
        .copied()
        .map(JournalLine::from);
    let mut written = 0;
    for line in graph.chain(clustering) {
        serde_json::to_writer(&mut writer, &line)?;
        writeln!(writer)?;
        written += 1;
    }
    Ok(written)
}
