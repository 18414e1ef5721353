//! Command-line interface orchestration for the LDCR generator.
//!
//! The CLI offers a single `generate` command that derives an initial
//! clustering from the layout and density flags, runs the generator one or
//! more times and reports each run's final state.

mod commands;
mod output;

pub use commands::{
    Cli, CliError, Command, GenerateCommand, GenerationReport, InterArgs, IntraArgs, LayoutArgs,
    ModelArgs, OutputArgs, OutputFormat, PInMode, ProcessArgs, run_cli,
};
pub use output::{RunRecord, render_report, write_journal};
