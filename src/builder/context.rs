//! Build context - the collaborators every directory step needs.

use std::fmt;

use crate::util::process::{ProcessBuilder, ProcessRunner};
use crate::util::Shell;

/// Build context shared by all directories in one pipeline run.
#[derive(Clone, Copy)]
pub struct BuildContext<'a> {
    /// Runs qmake and make
    pub runner: &'a dyn ProcessRunner,

    /// Operator output
    pub shell: &'a Shell,

    /// Build tool executable
    pub make: &'a str,

    /// Parallelism hint for compiling
    pub jobs: usize,
}

impl fmt::Debug for BuildContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuildContext")
            .field("streams_output", &self.runner.streams_output())
            .field("make", &self.make)
            .field("jobs", &self.jobs)
            .finish()
    }
}

impl<'a> BuildContext<'a> {
    pub fn new(runner: &'a dyn ProcessRunner, shell: &'a Shell, make: &'a str, jobs: usize) -> Self {
        BuildContext {
            runner,
            shell,
            make,
            jobs,
        }
    }

    /// `make clean`
    pub fn make_clean(&self) -> ProcessBuilder {
        ProcessBuilder::new(self.make).arg("clean")
    }

    /// `make -j<N>`
    pub fn make_compile(&self) -> ProcessBuilder {
        ProcessBuilder::new(self.make).arg(format!("-j{}", self.jobs))
    }
}
