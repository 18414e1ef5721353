//! Command implementations and argument parsing for the `ldcr` CLI.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};
use ldcr_core::{
    DEFAULT_SEED, Generator, GraphBuilder, GraphError, InstanceParams, InterDensity,
    IntraDensity, PInSampler, ProcessParams, derive_run_seed, run_batch,
};
use thiserror::Error;
use tracing::{Span, field, info, instrument};

use super::output::{RunRecord, write_journal};

const DEFAULT_NODES: usize = 60;
const DEFAULT_CLUSTERS: usize = 2;

/// Top-level CLI options parsed by [`clap`].
#[derive(Debug, Parser, Clone)]
#[command(name = "ldcr", about = "Generate dynamic clustered random graphs.")]
pub struct Cli {
    /// Command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported CLI commands.
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Run the generator and report one summary per run.
    Generate(GenerateCommand),
}

/// Options accepted by the `generate` command.
#[derive(Debug, Args, Clone, Default)]
pub struct GenerateCommand {
    /// Node count and cluster layout.
    #[command(flatten)]
    pub layout: LayoutArgs,
    /// Intra-cluster density source.
    #[command(flatten)]
    pub intra: IntraArgs,
    /// Inter-cluster density source.
    #[command(flatten)]
    pub inter: InterArgs,
    /// Parameters of clusters created during the run.
    #[command(flatten)]
    pub model: ModelArgs,
    /// Churn probabilities and budgets.
    #[command(flatten)]
    pub process: ProcessArgs,
    /// Run count, seeding and output.
    #[command(flatten)]
    pub output: OutputArgs,
}

/// Initial node count and cluster sizes.
#[derive(Debug, Args, Clone)]
pub struct LayoutArgs {
    /// Number of nodes; defaults to the sum of `--cluster-sizes` when those
    /// are given, otherwise to 60.
    #[arg(long)]
    pub nodes: Option<usize>,

    /// Number of ground-truth clusters.
    #[arg(long, default_value_t = DEFAULT_CLUSTERS)]
    pub clusters: usize,

    /// Explicit comma-separated cluster sizes.
    #[arg(long, value_delimiter = ',', num_args = 1.., conflicts_with = "skew")]
    pub cluster_sizes: Option<Vec<usize>>,

    /// Skew of the derived cluster sizes; 1 gives equal sizes.
    #[arg(long)]
    pub skew: Option<f64>,
}

impl Default for LayoutArgs {
    fn default() -> Self {
        Self {
            nodes: None,
            clusters: DEFAULT_CLUSTERS,
            cluster_sizes: None,
            skew: None,
        }
    }
}

/// Sources of the intra-cluster edge probabilities; at most one applies.
#[derive(Debug, Args, Clone, Default)]
#[group(id = "intra", multiple = false)]
pub struct IntraArgs {
    /// Intra-cluster probability shared by every cluster.
    #[arg(long)]
    pub p_in: Option<f64>,

    /// Comma-separated intra-cluster probabilities, one per cluster.
    #[arg(long, value_delimiter = ',', num_args = 1..)]
    pub p_in_list: Option<Vec<f64>>,

    /// Expected intra-cluster degree shared by every cluster.
    #[arg(long)]
    pub deg_in: Option<f64>,

    /// Comma-separated expected intra-cluster degrees, one per cluster.
    #[arg(long, value_delimiter = ',', num_args = 1..)]
    pub deg_in_list: Option<Vec<f64>>,
}

impl IntraArgs {
    fn density(&self) -> Option<IntraDensity> {
        self.p_in
            .map(IntraDensity::Probability)
            .or_else(|| self.p_in_list.clone().map(IntraDensity::Probabilities))
            .or_else(|| self.deg_in.map(IntraDensity::Degree))
            .or_else(|| self.deg_in_list.clone().map(IntraDensity::Degrees))
    }
}

/// Sources of the inter-cluster edge probability; at most one applies.
#[derive(Debug, Args, Clone, Default)]
#[group(id = "inter", multiple = false)]
pub struct InterArgs {
    /// Inter-cluster edge probability.
    #[arg(long)]
    pub p_out: Option<f64>,

    /// Expected inter-cluster degree.
    #[arg(long)]
    pub deg_out: Option<f64>,
}

impl InterArgs {
    fn density(&self) -> Option<InterDensity> {
        self.p_out
            .map(InterDensity::Probability)
            .or_else(|| self.deg_out.map(InterDensity::Degree))
    }
}

/// Parameters applied to clusters created by splits and merges.
#[derive(Debug, Args, Clone)]
pub struct ModelArgs {
    /// Fraction of crossing edges left when a split or merge completes.
    #[arg(long, default_value_t = GraphBuilder::new().theta())]
    pub theta: f64,

    /// How new clusters draw their intra-cluster probability.
    #[arg(long, value_enum, default_value_t = PInMode::Mean)]
    pub p_in_new: PInMode,
}

impl Default for ModelArgs {
    fn default() -> Self {
        Self {
            theta: GraphBuilder::new().theta(),
            p_in_new: PInMode::Mean,
        }
    }
}

/// Intra-cluster probability policy for new clusters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PInMode {
    /// Reuse the split cluster's probability or average for merges.
    Mean,
    /// Sample around the current probabilities.
    Gaussian,
}

impl From<PInMode> for PInSampler {
    fn from(mode: PInMode) -> Self {
        match mode {
            PInMode::Mean => Self::Mean,
            PInMode::Gaussian => Self::Gaussian,
        }
    }
}

/// Churn probabilities and budgets of each time step.
#[derive(Debug, Args, Clone, Copy)]
pub struct ProcessArgs {
    /// Probability that a small-scale operation touches an edge.
    #[arg(long, default_value_t = ProcessParams::default().p_chi)]
    pub p_chi: f64,

    /// Probability that a node operation inserts a node.
    #[arg(long, default_value_t = ProcessParams::default().p_nu)]
    pub p_nu: f64,

    /// Probability that a large-scale operation is a split.
    #[arg(long, default_value_t = ProcessParams::default().p_mu)]
    pub p_mu: f64,

    /// Probability of a large-scale operation per time step.
    #[arg(long, default_value_t = ProcessParams::default().p_omega)]
    pub p_omega: f64,

    /// Small-scale operations per time step.
    #[arg(long, default_value_t = ProcessParams::default().eta)]
    pub eta: u64,

    /// Number of time steps per run.
    #[arg(long, default_value_t = ProcessParams::default().t_max)]
    pub steps: u64,
}

impl Default for ProcessArgs {
    fn default() -> Self {
        let process = ProcessParams::default();
        Self {
            p_chi: process.p_chi,
            p_nu: process.p_nu,
            p_mu: process.p_mu,
            p_omega: process.p_omega,
            eta: process.eta,
            steps: process.t_max,
        }
    }
}

impl From<ProcessArgs> for ProcessParams {
    fn from(args: ProcessArgs) -> Self {
        Self {
            p_chi: args.p_chi,
            p_nu: args.p_nu,
            p_mu: args.p_mu,
            p_omega: args.p_omega,
            eta: args.eta,
            t_max: args.steps,
        }
    }
}

/// Run count, seeding and output options.
#[derive(Debug, Args, Clone)]
pub struct OutputArgs {
    /// Number of independent runs.
    #[arg(
        long,
        default_value_t = 1,
        value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..),
    )]
    pub runs: usize,

    /// Base seed; each run derives its own seed from it.
    #[arg(long, default_value_t = DEFAULT_SEED)]
    pub seed: u64,

    /// Summary format written to stdout.
    #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
    pub format: OutputFormat,

    /// Write the journal of the first run to this path as JSON lines.
    #[arg(long)]
    pub events: Option<PathBuf>,
}

impl Default for OutputArgs {
    fn default() -> Self {
        Self {
            runs: 1,
            seed: DEFAULT_SEED,
            format: OutputFormat::Human,
            events: None,
        }
    }
}

/// Supported summary formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One indented block per run.
    Human,
    /// One JSON object per line and run.
    Json,
}

impl GenerateCommand {
    /// Derives the initial clustering from the layout and density flags.
    ///
    /// # Errors
    /// Returns [`GraphError::InvalidParameters`] when the combination is
    /// rejected.
    pub fn instance(&self) -> Result<InstanceParams, GraphError> {
        let layout = &self.layout;
        let mut builder =
            InstanceParams::builder(layout.nodes.unwrap_or(DEFAULT_NODES), layout.clusters);
        if let Some(sizes) = &layout.cluster_sizes {
            builder = builder.with_cluster_sizes(sizes.clone());
            if layout.nodes.is_none() {
                builder = builder.without_node_count();
            }
        } else if let Some(beta) = layout.skew {
            builder = builder.with_skew(beta);
        }
        if let Some(intra) = self.intra.density() {
            builder = builder.with_intra(intra);
        }
        if let Some(inter) = self.inter.density() {
            builder = builder.with_inter(inter);
        }
        builder.build()
    }

    /// Graph parameters shared by every run.
    #[must_use]
    pub fn builder(&self) -> GraphBuilder {
        GraphBuilder::new()
            .with_theta(self.model.theta)
            .with_p_in_sampler(self.model.p_in_new.into())
            .with_rng_seed(self.output.seed)
    }
}

/// Errors surfaced while executing CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// Writing the journal export failed.
    #[error("failed to write `{}`: {source}", path.display())]
    Io {
        /// Path that triggered the failure.
        path: PathBuf,
        /// Underlying operating system error.
        #[source]
        source: io::Error,
    },
    /// Parameter validation or generation failed.
    #[error(transparent)]
    Core(#[from] GraphError),
}

/// Outcome of a `generate` invocation.
#[derive(Debug, Clone)]
pub struct GenerationReport {
    /// Format requested for stdout.
    pub format: OutputFormat,
    /// One record per run, in run order.
    pub runs: Vec<RunRecord>,
    /// Number of journal lines written, when an export was requested.
    pub exported_events: Option<usize>,
}

/// Executes the CLI command represented by `cli`.
///
/// # Errors
/// Returns [`CliError`] when the parameters are rejected, a run fails, or
/// the journal export cannot be written.
///
/// # Examples
/// ```
/// use ldcr_cli::cli::{Cli, Command, GenerateCommand, run_cli};
///
/// let mut command = GenerateCommand::default();
/// command.layout.nodes = Some(12);
/// command.process.steps = 5;
/// command.output.runs = 2;
/// let report = run_cli(Cli { command: Command::Generate(command) })?;
/// assert_eq!(report.runs.len(), 2);
/// assert_eq!(report.runs[0].time_step, 5);
/// # Ok::<(), ldcr_cli::cli::CliError>(())
/// ```
#[instrument(name = "cli.run", err, skip(cli), fields(command = field::Empty))]
pub fn run_cli(cli: Cli) -> Result<GenerationReport, CliError> {
    match cli.command {
        Command::Generate(generate) => {
            Span::current().record("command", field::display("generate"));
            run_generate(&generate)
        }
    }
}

#[instrument(
    name = "cli.generate",
    err,
    skip(command),
    fields(runs = command.output.runs, seed = command.output.seed, steps = command.process.steps),
)]
pub(super) fn run_generate(command: &GenerateCommand) -> Result<GenerationReport, CliError> {
    let instance = command.instance()?;
    let process = ProcessParams::from(command.process);
    let builder = command.builder();

    let summaries = run_batch(&instance, process, &builder, command.output.runs)?;
    let runs: Vec<RunRecord> = summaries
        .iter()
        .enumerate()
        .map(|(index, summary)| {
            RunRecord::new(index, derive_run_seed(builder.rng_seed(), index), summary)
        })
        .collect();

    let exported_events = command
        .output
        .events
        .as_deref()
        .map(|path| export_first_run(&instance, process, &builder, path))
        .transpose()?;

    info!(
        runs = runs.len(),
        nodes = instance.nodes(),
        clusters = instance.clusters(),
        "command completed"
    );
    Ok(GenerationReport {
        format: command.output.format,
        runs,
        exported_events,
    })
}

/// Replays run 0 with an in-memory journal and writes both channels to
/// `path`.
#[instrument(
    name = "cli.export_events",
    err,
    skip(instance, process, builder),
    fields(path = %path.display()),
)]
pub(super) fn export_first_run(
    instance: &InstanceParams,
    process: ProcessParams,
    builder: &GraphBuilder,
    path: &Path,
) -> Result<usize, CliError> {
    let seed = derive_run_seed(builder.rng_seed(), 0);
    let mut generator = Generator::new(instance, process, builder.clone().with_rng_seed(seed))?;
    generator.run()?;

    let io_error = |source| CliError::Io {
        path: path.to_path_buf(),
        source,
    };
    let file = File::create(path).map_err(io_error)?;
    let mut writer = BufWriter::new(file);
    let written = write_journal(generator.graph().journal(), &mut writer).map_err(io_error)?;
    writer.flush().map_err(io_error)?;
    info!(lines = written, "journal exported");
    Ok(written)
}
