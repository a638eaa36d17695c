//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use qtbuild::GenerationPreference;

/// Qtbuild - build driver for qmake-based Qt applications
///
/// Without a command, builds the main source directory.
#[derive(Parser)]
#[command(name = "qtbuild")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Stream qmake/make output instead of buffering it
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(flatten)]
    pub options: BuildOptions,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build, then install the program
    Install,

    /// Clean every source directory
    Clean,
}

#[derive(Args)]
pub struct BuildOptions {
    /// The path to install to (default from qtbuild.toml, else /usr/local)
    #[arg(long, global = true, value_name = "DESTDIR")]
    pub prefix: Option<PathBuf>,

    /// Use Qt4
    #[arg(long = "use-qt4", global = true, conflicts_with = "use_qt5")]
    pub use_qt4: bool,

    /// Use Qt5
    #[arg(long = "use-qt5", global = true)]
    pub use_qt5: bool,

    /// Build test programs also
    #[arg(long, global = true)]
    pub build_all: bool,

    /// Parallel make jobs
    #[arg(short, long, global = true, value_parser = clap::value_parser!(u16).range(1..))]
    pub jobs: Option<u16>,

    /// Configuration file (default: ./qtbuild.toml)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

impl BuildOptions {
    /// Generation forced on the command line, if any.
    pub fn generation(&self) -> Option<GenerationPreference> {
        if self.use_qt4 {
            Some(GenerationPreference::Qt4)
        } else if self.use_qt5 {
            Some(GenerationPreference::Qt5)
        } else {
            None
        }
    }
}
