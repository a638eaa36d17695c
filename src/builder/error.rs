//! Build error types.

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::toolchain::{GenerationPreference, ToolchainError, VersionTriple};
use crate::util::process::ProcessError;

/// Subprocess-driven step within a directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Clean,
    Generate,
    Compile,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Clean => write!(f, "clean"),
            Step::Generate => write!(f, "generate"),
            Step::Compile => write!(f, "compile"),
        }
    }
}

/// Error while cleaning, building or installing.
#[derive(Debug, Error)]
pub enum BuildError {
    /// No qmake matching the generation preference on the search path.
    #[error("failed to find a suitable qmake (requested generation: {preference})")]
    Discovery { preference: GenerationPreference },

    /// A qmake was found but could not be queried.
    #[error(transparent)]
    Detection(#[from] ToolchainError),

    #[error("unable to find Qt >= {minimum} (found {found})")]
    VersionTooOld {
        found: VersionTriple,
        minimum: VersionTriple,
    },

    #[error("unable to verify Qt version `{}` against Qt >= {minimum}", .found.as_deref().unwrap_or("?"))]
    VersionUnverified {
        found: Option<String>,
        minimum: VersionTriple,
    },

    /// The program could not be started at all.
    #[error("failed to run `{command}` in {}", .dir.display())]
    Launch {
        command: String,
        dir: PathBuf,
        #[source]
        source: ProcessError,
    },

    /// The program ran and exited unsuccessfully.
    #[error("{step} step failed: `{command}` exited with {} in {}", describe_exit(.code), .dir.display())]
    Phase {
        step: Step,
        command: String,
        dir: PathBuf,
        code: Option<i32>,
    },

    #[error("source directory {} does not exist", .dir.display())]
    MissingDirectory { dir: PathBuf },

    /// A generated file could not be removed during clean.
    #[error("failed to remove {}", .path.display())]
    Remove {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to install to {}", .destination.display())]
    Install {
        destination: PathBuf,
        #[source]
        source: io::Error,
    },
}

fn describe_exit(code: &Option<i32>) -> String {
    match *code {
        Some(code) => format!("exit code {}", code),
        None => "a signal".to_string(),
    }
}
