//! `qtbuild clean` command

use anyhow::Result;

use crate::cli::Cli;
use qtbuild::Phases;

/// Cleans every configured directory; `--build-all` makes no difference.
pub fn execute(cli: &Cli) -> Result<()> {
    super::run_pipeline(cli, Phases::clean())
}
