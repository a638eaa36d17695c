//! Executable lookup on a search path.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Where the directory list comes from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SearchPath {
    /// Read `PATH` at every lookup.
    #[default]
    Environment,
    /// A fixed, platform-separated directory list.
    Explicit(OsString),
}

/// Finds executables the way a shell does: the first directory on the search
/// path that holds an executable file of that name wins.
#[derive(Debug, Clone, Default)]
pub struct ExecutableLocator {
    search_path: SearchPath,
}

impl ExecutableLocator {
    /// Locator backed by the current `PATH`.
    pub fn from_env() -> Self {
        ExecutableLocator {
            search_path: SearchPath::Environment,
        }
    }

    /// Locator over an explicit directory list.
    pub fn with_search_path(paths: impl Into<OsString>) -> Self {
        ExecutableLocator {
            search_path: SearchPath::Explicit(paths.into()),
        }
    }

    /// Find `name`, returning its full path.
    pub fn locate(&self, name: &str) -> Option<PathBuf> {
        let paths = match &self.search_path {
            SearchPath::Environment => std::env::var_os("PATH")?,
            SearchPath::Explicit(paths) => paths.clone(),
        };

        match which::which_in(name, Some(paths), Path::new(".")) {
            Ok(path) => {
                tracing::debug!("found `{}` at {}", name, path.display());
                Some(path)
            }
            Err(_) => {
                tracing::debug!("`{}` not found on search path", name);
                None
            }
        }
    }

    /// Directory containing `name`, for reporting.
    pub fn locate_dir(&self, name: &str) -> Option<PathBuf> {
        self.locate(name)
            .and_then(|path| path.parent().map(Path::to_path_buf))
    }
}
