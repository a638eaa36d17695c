//! `qtbuild install` command

use anyhow::Result;

use crate::cli::Cli;
use qtbuild::Phases;

/// Builds, then copies the main binary to `<prefix>/bin`.
pub fn execute(cli: &Cli) -> Result<()> {
    super::run_pipeline(cli, Phases::install())
}
