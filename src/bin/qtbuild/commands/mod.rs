//! Command implementations

pub mod build;
pub mod clean;
pub mod install;

use std::time::Instant;

use anyhow::{Context, Result};

use crate::cli::Cli;
use qtbuild::util::shell::{format_duration, ColorChoice, Status, Verbosity};
use qtbuild::util::{OutputMode, Shell, SystemRunner};
use qtbuild::{BuildPipeline, Config, DirectorySet, Phases};

/// Load configuration, apply command-line overrides and run `phases`.
pub fn run_pipeline(cli: &Cli, phases: Phases) -> Result<()> {
    let options = &cli.options;
    let root = std::env::current_dir().context("failed to determine current directory")?;

    let config = match &options.config {
        Some(path) => Config::load(path)?,
        None => Config::discover(&root)?,
    };

    let mut pipeline_config = config.to_pipeline_config(&root)?;
    if let Some(prefix) = &options.prefix {
        pipeline_config.prefix = prefix.clone();
    }
    if let Some(jobs) = options.jobs {
        pipeline_config.jobs = usize::from(jobs);
    }

    let preference = options.generation().unwrap_or(config.toolchain.generation);
    let set = if options.build_all {
        DirectorySet::All
    } else {
        DirectorySet::Main
    };

    let (verbosity, mode) = if cli.verbose {
        (Verbosity::Verbose, OutputMode::Streamed)
    } else {
        (Verbosity::Normal, OutputMode::Captured)
    };
    let color = if cli.no_color {
        ColorChoice::Never
    } else {
        ColorChoice::Auto
    };
    let shell = Shell::new(verbosity, color);
    let runner = SystemRunner::new(mode);

    let start = Instant::now();
    BuildPipeline::new(pipeline_config, &runner, &shell)
        .run(phases, set, preference)
        .into_result()?;

    shell.status(Status::Finished, format!("in {}", format_duration(start.elapsed())));
    Ok(())
}
