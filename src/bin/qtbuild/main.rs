//! Qtbuild CLI - build driver for qmake-based Qt applications

use anyhow::Result;
use clap::error::ErrorKind;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() {
    // Usage errors and help both exit with status 1.
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            let code = if e.kind() == ErrorKind::DisplayVersion { 0 } else { 1 };
            std::process::exit(code);
        }
    };

    if let Err(e) = run(cli) {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("qtbuild=debug")
    } else {
        EnvFilter::new("qtbuild=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    // Execute command
    match cli.command {
        None => commands::build::execute(&cli),
        Some(Commands::Install) => commands::install::execute(&cli),
        Some(Commands::Clean) => commands::clean::execute(&cli),
    }
}
