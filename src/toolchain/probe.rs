//! Qt toolchain detection.
//!
//! Detection runs in two passes. Generation-specific names (`qmake-qt4`,
//! `qmake-qt5`) are taken at face value. The neutral `qmake` is asked for
//! its version and classified from the `Using Qt version X.Y.Z` line; it
//! replaces a generation-specific candidate of the same generation.
//!
//! Selection then follows the preference: a forced generation accepts only a
//! candidate of that generation, otherwise Qt5 is preferred over Qt4.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use crate::util::process::{ProcessError, ProcessRunner};

use super::{ExecutableLocator, Generation, GenerationPreference, ToolchainCandidate};

/// Generation-neutral qmake name.
pub const NEUTRAL_QMAKE: &str = "qmake";

/// Generation-specific qmake names, probed before the neutral one.
pub const VERSIONED_QMAKES: [(&str, Generation); 2] = [
    ("qmake-qt4", Generation::Qt4),
    ("qmake-qt5", Generation::Qt5),
];

static USING_QT_VERSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^Using Qt version (\S+)").expect("USING_QT_VERSION is a valid regex")
});

/// A qmake executable was found but could not be run.
#[derive(Debug, Error)]
pub enum ToolchainError {
    #[error("failed to query Qt version from `{program}`")]
    Query {
        program: String,
        #[source]
        source: ProcessError,
    },
}

/// Result of a detection pass.
#[derive(Debug, Clone, Default)]
pub struct Detection {
    /// Every qmake found, in probe order
    pub candidates: Vec<ToolchainCandidate>,

    /// The candidate chosen by the preference, with its version queried
    pub selected: Option<ToolchainCandidate>,
}

/// Discovers and selects a qmake executable.
pub struct ToolchainProbe<'a> {
    locator: &'a ExecutableLocator,
    runner: &'a dyn ProcessRunner,
}

impl<'a> ToolchainProbe<'a> {
    pub fn new(locator: &'a ExecutableLocator, runner: &'a dyn ProcessRunner) -> Self {
        ToolchainProbe { locator, runner }
    }

    /// Find all candidates, select one and query its version.
    pub fn detect(&self, preference: GenerationPreference) -> Result<Detection, ToolchainError> {
        let candidates = self.discover()?;

        let selected = match select(&candidates, preference) {
            Some(mut candidate) => {
                candidate.version = self.query_version(&candidate)?;
                Some(candidate)
            }
            None => None,
        };

        Ok(Detection {
            candidates,
            selected,
        })
    }

    /// Find every qmake on the search path.
    pub fn discover(&self) -> Result<Vec<ToolchainCandidate>, ToolchainError> {
        let mut candidates = Vec::new();

        for (name, generation) in VERSIONED_QMAKES {
            if let Some(path) = self.locator.locate(name) {
                candidates.push(ToolchainCandidate::new(name, path, generation));
            }
        }

        if let Some(path) = self.locator.locate(NEUTRAL_QMAKE) {
            let mut candidate = ToolchainCandidate::new(NEUTRAL_QMAKE, path, Generation::Unknown);
            candidate.reported_version = self.reported_version(&candidate)?;
            candidate.generation = candidate
                .reported_version
                .as_deref()
                .map(Generation::from_version)
                .unwrap_or(Generation::Unknown);

            if candidate.generation != Generation::Unknown {
                candidates.retain(|c| c.generation != candidate.generation);
            }
            candidates.push(candidate);
        }

        tracing::debug!("toolchain candidates: {:?}", candidates);
        Ok(candidates)
    }

    /// Version from `qmake --version`, used only for classification.
    fn reported_version(
        &self,
        candidate: &ToolchainCandidate,
    ) -> Result<Option<String>, ToolchainError> {
        let cmd = candidate.command().arg("--version");
        let output = self
            .runner
            .capture(&cmd)
            .map_err(|source| query_error(candidate, source))?;

        Ok(parse_reported_version(&output.stdout))
    }

    /// Authoritative version from `qmake -query QT_VERSION`.
    ///
    /// A qmake that runs but fails or prints nothing yields `None`.
    pub fn query_version(
        &self,
        candidate: &ToolchainCandidate,
    ) -> Result<Option<String>, ToolchainError> {
        let cmd = candidate.command().args(["-query", "QT_VERSION"]);
        let output = self
            .runner
            .capture(&cmd)
            .map_err(|source| query_error(candidate, source))?;

        if !output.success() {
            tracing::warn!(
                "`{}` exited with {:?}: {}",
                cmd.display_command(),
                output.code,
                output.stderr.trim()
            );
            return Ok(None);
        }

        let version = output.stdout.trim();
        Ok((!version.is_empty()).then(|| version.to_string()))
    }
}

fn query_error(candidate: &ToolchainCandidate, source: ProcessError) -> ToolchainError {
    ToolchainError::Query {
        program: candidate.executable.display().to_string(),
        source,
    }
}

/// Extract the version token from `qmake --version` output.
pub fn parse_reported_version(output: &str) -> Option<String> {
    output
        .lines()
        .find_map(|line| USING_QT_VERSION.captures(line.trim_end()))
        .map(|caps| caps[1].to_string())
}

/// Pick the candidate to build with.
///
/// When a generation is forced, the returned candidate carries the matching
/// `QT_SELECT` value for all later invocations.
pub fn select(
    candidates: &[ToolchainCandidate],
    preference: GenerationPreference,
) -> Option<ToolchainCandidate> {
    let find = |generation: Generation| candidates.iter().find(|c| c.generation == generation);

    match preference.forced() {
        Some(generation) => find(generation).cloned().map(|mut candidate| {
            candidate.qt_select = generation.qt_select();
            candidate
        }),
        None => find(Generation::Qt5).or_else(|| find(Generation::Qt4)).cloned(),
    }
}
