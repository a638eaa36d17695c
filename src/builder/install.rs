//! Installing the built binary.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::builder::error::BuildError;
use crate::util::fs::{ensure_dir, make_executable};

/// Where the binary is installed: `<prefix>/bin/<binary>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallTarget {
    pub prefix: PathBuf,
    pub binary: String,
}

impl InstallTarget {
    pub fn new(prefix: impl Into<PathBuf>, binary: impl Into<String>) -> Self {
        InstallTarget {
            prefix: prefix.into(),
            binary: binary.into(),
        }
    }

    pub fn bin_dir(&self) -> PathBuf {
        self.prefix.join("bin")
    }

    pub fn destination(&self) -> PathBuf {
        self.bin_dir().join(&self.binary)
    }

    /// Copy `built` into place and mark it executable.
    ///
    /// Returns the installed path.
    pub fn install(&self, built: &Path) -> Result<PathBuf, BuildError> {
        let bin_dir = self.bin_dir();
        ensure_dir(&bin_dir).map_err(|source| BuildError::Install {
            destination: bin_dir.clone(),
            source,
        })?;

        let destination = self.destination();
        let install_err = |source: io::Error| BuildError::Install {
            destination: destination.clone(),
            source,
        };

        if !built.is_file() {
            return Err(install_err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("built binary {} not found", built.display()),
            )));
        }

        fs::copy(built, &destination).map_err(install_err)?;
        make_executable(&destination).map_err(install_err)?;

        tracing::debug!("installed {} -> {}", built.display(), destination.display());
        Ok(destination)
    }
}
