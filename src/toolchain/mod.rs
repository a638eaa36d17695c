//! Qt toolchain discovery.
//!
//! A toolchain is represented by the qmake executable that generates
//! Makefiles for it. Several Qt generations may be installed side by side;
//! [`ToolchainProbe`] finds them and picks one, [`VersionRequirement`]
//! checks it is recent enough.

pub mod locate;
pub mod probe;
pub mod version;

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::util::process::ProcessBuilder;

pub use locate::{ExecutableLocator, SearchPath};
pub use probe::{ToolchainError, ToolchainProbe};
pub use version::{VersionCheck, VersionError, VersionRequirement, VersionTriple};

/// Environment variable read by qtchooser-style qmake wrappers.
pub const QT_SELECT_ENV: &str = "QT_SELECT";

/// Major Qt generation a qmake executable belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Generation {
    Qt4,
    Qt5,
    Unknown,
}

impl Generation {
    /// Classify from the leading major digit of a reported version.
    pub fn from_version(version: &str) -> Self {
        match version.chars().next() {
            Some('4') => Generation::Qt4,
            Some('5') => Generation::Qt5,
            _ => Generation::Unknown,
        }
    }

    /// Value for [`QT_SELECT_ENV`] that biases qmake toward this generation.
    pub fn qt_select(&self) -> Option<&'static str> {
        match self {
            Generation::Qt4 => Some("qt4"),
            Generation::Qt5 => Some("qt5"),
            Generation::Unknown => None,
        }
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Generation::Qt4 => write!(f, "Qt4"),
            Generation::Qt5 => write!(f, "Qt5"),
            Generation::Unknown => write!(f, "Qt?"),
        }
    }
}

/// Which generation the operator asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationPreference {
    /// Prefer Qt5, fall back to Qt4.
    #[default]
    Auto,
    /// Only accept Qt4.
    Qt4,
    /// Only accept Qt5.
    Qt5,
}

impl GenerationPreference {
    /// The forced generation, if any.
    pub fn forced(&self) -> Option<Generation> {
        match self {
            GenerationPreference::Auto => None,
            GenerationPreference::Qt4 => Some(Generation::Qt4),
            GenerationPreference::Qt5 => Some(Generation::Qt5),
        }
    }
}

impl fmt::Display for GenerationPreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerationPreference::Auto => write!(f, "auto"),
            GenerationPreference::Qt4 => write!(f, "qt4"),
            GenerationPreference::Qt5 => write!(f, "qt5"),
        }
    }
}

/// A discovered qmake executable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolchainCandidate {
    /// Name it was looked up by (`qmake-qt5`, `qmake`, ...)
    pub name: String,

    /// Resolved location on the search path
    pub executable: PathBuf,

    pub generation: Generation,

    /// Version parsed from `qmake --version`, neutral executables only
    pub reported_version: Option<String>,

    /// Authoritative version from `qmake -query QT_VERSION`, once queried
    pub version: Option<String>,

    /// `QT_SELECT` value applied to every invocation of this executable
    pub qt_select: Option<&'static str>,
}

impl ToolchainCandidate {
    pub fn new(name: impl Into<String>, executable: PathBuf, generation: Generation) -> Self {
        ToolchainCandidate {
            name: name.into(),
            executable,
            generation,
            reported_version: None,
            version: None,
            qt_select: None,
        }
    }

    /// Base command for invoking this qmake, with any selection override.
    pub fn command(&self) -> ProcessBuilder {
        let cmd = ProcessBuilder::new(&self.executable);
        match self.qt_select {
            Some(select) => cmd.env(QT_SELECT_ENV, select),
            None => cmd,
        }
    }

    /// Short label for listings, e.g. `Qt5 (qmake)`.
    pub fn label(&self) -> String {
        format!("{} ({})", self.generation, self.name)
    }
}
