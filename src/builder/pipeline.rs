//! The clean / build / install pipeline.
//!
//! Phases always run in that order and are all-or-nothing: the first
//! failing directory aborts the rest of the phase and the whole run.
//! Directories are processed sequentially in configured order, main
//! directory first. Every subprocess gets the directory as an explicit
//! working directory; the process's own working directory is never changed.

use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::builder::context::BuildContext;
use crate::builder::directory::BuildDirectory;
use crate::builder::error::BuildError;
use crate::builder::install::InstallTarget;
use crate::toolchain::{
    ExecutableLocator, GenerationPreference, ToolchainCandidate, ToolchainProbe, VersionCheck,
    VersionRequirement, VersionTriple,
};
use crate::util::process::ProcessRunner;
use crate::util::shell::{Shell, Status};

/// Top-level stage of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Phase {
    Clean,
    Build,
    Install,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Clean => write!(f, "clean"),
            Phase::Build => write!(f, "build"),
            Phase::Install => write!(f, "install"),
        }
    }
}

/// Set of phases to run. Install always implies build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Phases {
    clean: bool,
    build: bool,
    install: bool,
}

impl Phases {
    pub fn clean() -> Self {
        Phases::default().with(Phase::Clean)
    }

    pub fn build() -> Self {
        Phases::default().with(Phase::Build)
    }

    pub fn install() -> Self {
        Phases::default().with(Phase::Install)
    }

    pub fn with(mut self, phase: Phase) -> Self {
        match phase {
            Phase::Clean => self.clean = true,
            Phase::Build => self.build = true,
            Phase::Install => {
                self.build = true;
                self.install = true;
            }
        }
        self
    }

    pub fn contains(&self, phase: Phase) -> bool {
        match phase {
            Phase::Clean => self.clean,
            Phase::Build => self.build,
            Phase::Install => self.install,
        }
    }
}

/// Which directories the build phase covers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DirectorySet {
    /// The main directory only.
    #[default]
    Main,
    /// The main directory followed by every extra directory.
    All,
}

/// Explicit configuration for one pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Project root; directories are relative to it
    pub root: PathBuf,

    pub main_dir: PathBuf,

    pub extra_dirs: Vec<PathBuf>,

    /// Binary produced in the main directory
    pub binary: String,

    /// Programs reported before building
    pub required_programs: Vec<String>,

    pub minimum_version: VersionTriple,

    /// Continue with a warning when the Qt version cannot be parsed
    pub allow_unverified_version: bool,

    pub make: String,

    pub jobs: usize,

    pub prefix: PathBuf,
}

impl PipelineConfig {
    /// Directories in processing order, relative to the root.
    pub fn directories(&self, set: DirectorySet) -> Vec<&Path> {
        let mut dirs = vec![self.main_dir.as_path()];
        if set == DirectorySet::All {
            for dir in &self.extra_dirs {
                if !dirs.contains(&dir.as_path()) {
                    dirs.push(dir);
                }
            }
        }
        dirs
    }

    pub fn install_target(&self) -> InstallTarget {
        InstallTarget::new(&self.prefix, &self.binary)
    }
}

/// First failure of a run.
#[derive(Debug, Error)]
#[error("{phase} failed{}", in_directory(.directory))]
pub struct PipelineFailure {
    pub phase: Phase,

    /// Directory being processed, relative to the project root
    pub directory: Option<PathBuf>,

    #[source]
    pub error: BuildError,
}

fn in_directory(directory: &Option<PathBuf>) -> String {
    match directory {
        Some(dir) => format!(" in {}", dir.display()),
        None => String::new(),
    }
}

impl PipelineFailure {
    fn new(phase: Phase, directory: Option<&Path>, error: BuildError) -> Self {
        PipelineFailure {
            phase,
            directory: directory.map(Path::to_path_buf),
            error,
        }
    }
}

/// Aggregate outcome of a run.
#[derive(Debug, Default)]
pub struct PipelineResult {
    pub failure: Option<PipelineFailure>,

    /// Toolchain detected during the build phase, if generation was needed
    pub toolchain: Option<ToolchainCandidate>,

    /// Installed binary path
    pub installed: Option<PathBuf>,
}

impl PipelineResult {
    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }

    pub fn exit_code(&self) -> i32 {
        if self.is_success() {
            0
        } else {
            1
        }
    }

    pub fn into_result(self) -> Result<Self, PipelineFailure> {
        match self.failure {
            Some(failure) => Err(failure),
            None => Ok(self),
        }
    }
}

/// Orchestrates toolchain detection and the per-directory steps.
pub struct BuildPipeline<'a> {
    config: PipelineConfig,
    runner: &'a dyn ProcessRunner,
    shell: &'a Shell,
    locator: ExecutableLocator,
}

impl<'a> BuildPipeline<'a> {
    pub fn new(config: PipelineConfig, runner: &'a dyn ProcessRunner, shell: &'a Shell) -> Self {
        BuildPipeline {
            config,
            runner,
            shell,
            locator: ExecutableLocator::from_env(),
        }
    }

    /// Use a specific executable locator instead of `PATH`.
    pub fn with_locator(mut self, locator: ExecutableLocator) -> Self {
        self.locator = locator;
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    fn context(&self) -> BuildContext<'_> {
        BuildContext::new(self.runner, self.shell, &self.config.make, self.config.jobs)
    }

    fn directory(&self, relative: &Path) -> BuildDirectory {
        BuildDirectory::new(self.config.root.join(relative), &self.config.binary)
    }

    /// Run the requested phases in order, stopping at the first failure.
    pub fn run(
        &self,
        phases: Phases,
        set: DirectorySet,
        preference: GenerationPreference,
    ) -> PipelineResult {
        let mut result = PipelineResult::default();

        if phases.contains(Phase::Clean) {
            if let Err(failure) = self.clean() {
                result.failure = Some(failure);
                return result;
            }
        }

        if phases.contains(Phase::Build) {
            match self.build(set, preference) {
                Ok(toolchain) => result.toolchain = toolchain,
                Err(failure) => {
                    result.failure = Some(failure);
                    return result;
                }
            }
        }

        if phases.contains(Phase::Install) {
            match self.install() {
                Ok(path) => result.installed = Some(path),
                Err(failure) => result.failure = Some(failure),
            }
        }

        result
    }

    /// Clean every configured directory, regardless of the build set.
    ///
    /// Directories that do not exist have nothing to clean and are skipped.
    pub fn clean(&self) -> Result<(), PipelineFailure> {
        let ctx = self.context();

        for relative in self.config.directories(DirectorySet::All) {
            let dir = self.directory(relative);
            if !dir.exists() {
                self.shell
                    .status(Status::Skipped, format!("{} (no such directory)", relative.display()));
                continue;
            }

            self.shell.status(Status::Cleaning, relative.display());
            dir.clean(&ctx)
                .map_err(|e| PipelineFailure::new(Phase::Clean, Some(relative), e))?;
        }

        Ok(())
    }

    /// Generate where needed and compile each directory of the set.
    ///
    /// The toolchain is detected at most once per run, and only if some
    /// directory lacks a Makefile.
    pub fn build(
        &self,
        set: DirectorySet,
        preference: GenerationPreference,
    ) -> Result<Option<ToolchainCandidate>, PipelineFailure> {
        let ctx = self.context();
        let mut toolchain: Option<ToolchainCandidate> = None;

        self.check_required_programs();

        for relative in self.config.directories(set) {
            let fail = |e| PipelineFailure::new(Phase::Build, Some(relative), e);
            let dir = self.directory(relative);

            if !dir.exists() {
                return Err(fail(BuildError::MissingDirectory {
                    dir: dir.path().to_path_buf(),
                }));
            }

            if dir.needs_generation() {
                let qmake = match toolchain.take() {
                    Some(qmake) => qmake,
                    None => self.resolve_toolchain(preference).map_err(fail)?,
                };

                self.shell
                    .status(Status::Generating, format!("Makefile in {}", relative.display()));
                let generated = dir.generate(&ctx, &qmake);
                toolchain = Some(qmake);
                generated.map_err(fail)?;
            }

            let _spinner = if self.runner.streams_output() {
                self.shell.status(Status::Compiling, relative.display());
                None
            } else {
                Some(self.shell.spinner(Status::Compiling, relative.display()))
            };
            dir.compile(&ctx).map_err(fail)?;
        }

        Ok(toolchain)
    }

    /// Copy the main directory's binary to `<prefix>/bin`.
    pub fn install(&self) -> Result<PathBuf, PipelineFailure> {
        let target = self.config.install_target();
        let main = self.directory(&self.config.main_dir);

        self.shell
            .status(Status::Installing, format!("to {}", target.prefix.display()));

        let installed = target.install(&main.binary()).map_err(|e| {
            PipelineFailure::new(Phase::Install, Some(&self.config.main_dir), e)
        })?;

        self.shell.status(
            Status::Installed,
            format!("{} has been installed to {}", target.binary, target.bin_dir().display()),
        );
        Ok(installed)
    }

    /// Report each required program; missing ones are only warnings.
    pub fn check_required_programs(&self) {
        for program in &self.config.required_programs {
            match self.locator.locate_dir(program) {
                Some(dir) => self.shell.status(
                    Status::Checking,
                    format!("for {}... found in {}", program, dir.display()),
                ),
                None => self.shell.warn(format!("{} not found", program)),
            }
        }
    }

    /// Detect qmake and check its version against the minimum.
    pub fn resolve_toolchain(
        &self,
        preference: GenerationPreference,
    ) -> Result<ToolchainCandidate, BuildError> {
        self.shell.status(Status::Detecting, "Qt version");
        let detection = ToolchainProbe::new(&self.locator, self.runner).detect(preference)?;

        if detection.candidates.is_empty() {
            self.shell.warn("no Qt found");
        } else {
            let labels: Vec<String> = detection.candidates.iter().map(|c| c.label()).collect();
            self.shell.status(Status::Found, labels.join(", "));
        }

        let Some(candidate) = detection.selected else {
            return Err(BuildError::Discovery { preference });
        };

        self.shell.status(
            Status::Using,
            format!(
                "'{}' (Qt {})",
                candidate.name,
                candidate.version.as_deref().unwrap_or("?")
            ),
        );

        let requirement = VersionRequirement::new(self.config.minimum_version.clone());
        match requirement.check(candidate.version.as_deref()) {
            VersionCheck::Satisfied(_) => {}
            VersionCheck::TooOld(found) => {
                return Err(BuildError::VersionTooOld {
                    found,
                    minimum: requirement.minimum().clone(),
                });
            }
            VersionCheck::Unverified { found } => {
                if !self.config.allow_unverified_version {
                    return Err(BuildError::VersionUnverified {
                        found,
                        minimum: requirement.minimum().clone(),
                    });
                }
                self.shell.warn(format!(
                    "cannot verify Qt version `{}` against Qt >= {}; continuing",
                    found.as_deref().unwrap_or("?"),
                    requirement.minimum()
                ));
            }
        }

        Ok(candidate)
    }
}
