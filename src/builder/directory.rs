//! A single qmake source directory.
//!
//! The presence of a generated `Makefile` is the only state a directory has:
//!
//! ```text
//! no Makefile --generate--> Makefile, not built --compile--> built
//!      ^                                                        |
//!      +------------------------- clean ------------------------+
//! ```
//!
//! Clean removes the Makefile too, so the next build re-detects the
//! toolchain. Nothing is cached; every call re-checks the filesystem.

use std::path::{Path, PathBuf};

use crate::builder::context::BuildContext;
use crate::builder::error::{BuildError, Step};
use crate::toolchain::ToolchainCandidate;
use crate::util::fs::{remove_file_if_exists, remove_matching};
use crate::util::process::ProcessBuilder;

/// Build metadata generated by qmake.
pub const MAKEFILE: &str = "Makefile";

/// Cache qmake writes next to the Makefile.
pub const QMAKE_STASH: &str = ".qmake.stash";

/// Transient artifacts removed when there is no Makefile to run `make clean`.
const OBJECT_FILES: &str = "*.o";

/// One source tree to build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildDirectory {
    path: PathBuf,
    binary: String,
}

impl BuildDirectory {
    /// `binary` is the file `make` produces in this directory.
    pub fn new(path: impl Into<PathBuf>, binary: impl Into<String>) -> Self {
        BuildDirectory {
            path: path.into(),
            binary: binary.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_dir()
    }

    pub fn makefile(&self) -> PathBuf {
        self.path.join(MAKEFILE)
    }

    /// Path of the binary produced by compiling.
    pub fn binary(&self) -> PathBuf {
        self.path.join(&self.binary)
    }

    /// True when no Makefile has been generated yet.
    pub fn needs_generation(&self) -> bool {
        !self.makefile().is_file()
    }

    /// Remove build outputs and generated files.
    ///
    /// Runs `make clean` when a Makefile exists, otherwise deletes object
    /// files directly. The binary, Makefile and qmake stash are removed
    /// either way.
    pub fn clean(&self, ctx: &BuildContext<'_>) -> Result<(), BuildError> {
        if !self.exists() {
            return Err(BuildError::MissingDirectory {
                dir: self.path.clone(),
            });
        }

        if self.needs_generation() {
            let removed = remove_matching(&self.path, OBJECT_FILES);
            tracing::debug!("removed {} object files in {}", removed, self.path.display());
        } else {
            self.run_step(ctx, Step::Clean, ctx.make_clean())?;
        }

        for name in [self.binary.as_str(), MAKEFILE, QMAKE_STASH] {
            let path = self.path.join(name);
            if remove_file_if_exists(&path).map_err(|source| BuildError::Remove {
                path: path.clone(),
                source,
            })? {
                tracing::debug!("removed {}", path.display());
            }
        }

        Ok(())
    }

    /// Run qmake to generate the Makefile, then `make clean` so the first
    /// compile starts from a pristine tree.
    pub fn generate(
        &self,
        ctx: &BuildContext<'_>,
        toolchain: &ToolchainCandidate,
    ) -> Result<(), BuildError> {
        self.run_step(ctx, Step::Generate, toolchain.command())?;

        if let Err(e) = self.run_step(ctx, Step::Clean, ctx.make_clean()) {
            ctx.shell.warn(format!("post-generation clean failed: {}", e));
        }

        Ok(())
    }

    /// Compile with the configured parallelism hint.
    pub fn compile(&self, ctx: &BuildContext<'_>) -> Result<(), BuildError> {
        self.run_step(ctx, Step::Compile, ctx.make_compile())
    }

    fn run_step(
        &self,
        ctx: &BuildContext<'_>,
        step: Step,
        cmd: ProcessBuilder,
    ) -> Result<(), BuildError> {
        let cmd = cmd.cwd(&self.path);
        let command = cmd.display_command();

        let output = ctx.runner.run(&cmd).map_err(|source| BuildError::Launch {
            command: command.clone(),
            dir: self.path.clone(),
            source,
        })?;

        if output.success() {
            return Ok(());
        }

        if !ctx.runner.streams_output() {
            ctx.shell.dump_output(&output.stderr);
        }

        Err(BuildError::Phase {
            step,
            command,
            dir: self.path.clone(),
            code: output.code,
        })
    }
}
