//! Support library for the `ldcr` binary.
//!
//! Re-exports the CLI and logging modules so doctests and integration tests
//! can drive the `generate` pipeline without forking a subprocess.

pub mod cli;
pub mod logging;
