//! Default command: build the selected source directories

use anyhow::Result;

use crate::cli::Cli;
use qtbuild::Phases;

pub fn execute(cli: &Cli) -> Result<()> {
    super::run_pipeline(cli, Phases::build())
}
