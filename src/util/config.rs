//! Project configuration file support.
//!
//! A project may carry a `qtbuild.toml` next to its sources. Every key is
//! optional; the defaults describe the layout of the gede debugger, which
//! this driver was first written for:
//!
//! ```toml
//! [project]
//! binary = "gede"
//! main-dir = "src"
//! extra-dirs = ["tests/tagtest", "tests/highlightertest", "tests/ini"]
//! required-programs = ["make", "gcc", "ctags"]
//!
//! [toolchain]
//! min-version = "4.0.0"
//! generation = "auto"          # or "qt4" / "qt5"
//! allow-unverified-version = false
//!
//! [build]
//! make = "make"
//! jobs = 4
//!
//! [install]
//! prefix = "/usr/local"
//! ```
//!
//! Command-line flags take precedence over the file.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::builder::pipeline::PipelineConfig;
use crate::toolchain::version::VersionTriple;
use crate::toolchain::GenerationPreference;

/// Name of the configuration file looked up in the project root.
pub const CONFIG_FILE_NAME: &str = "qtbuild.toml";

/// Qtbuild configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Source directories and produced binary
    pub project: ProjectConfig,

    /// Toolchain selection and minimum version
    pub toolchain: ToolchainConfig,

    /// Build tool settings
    pub build: BuildConfig,

    /// Install settings
    pub install: InstallConfig,
}

/// Project layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ProjectConfig {
    /// Name of the binary produced in the main directory
    pub binary: String,

    /// Main source directory, relative to the project root
    pub main_dir: PathBuf,

    /// Test and demo directories built by `--build-all`
    pub extra_dirs: Vec<PathBuf>,

    /// Programs reported before building (missing ones only warn)
    pub required_programs: Vec<String>,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        ProjectConfig {
            binary: "gede".to_string(),
            main_dir: PathBuf::from("src"),
            extra_dirs: vec![
                PathBuf::from("tests/tagtest"),
                PathBuf::from("tests/highlightertest"),
                PathBuf::from("tests/ini"),
            ],
            required_programs: vec!["make".to_string(), "gcc".to_string(), "ctags".to_string()],
        }
    }
}

/// Toolchain settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ToolchainConfig {
    /// Minimum accepted Qt version (`major.minor.patch`)
    pub min_version: String,

    /// Which Qt generation to use
    pub generation: GenerationPreference,

    /// Continue with a warning when the Qt version cannot be parsed
    pub allow_unverified_version: bool,
}

impl Default for ToolchainConfig {
    fn default() -> Self {
        ToolchainConfig {
            min_version: "4.0.0".to_string(),
            generation: GenerationPreference::Auto,
            allow_unverified_version: false,
        }
    }
}

/// Build tool settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Build tool executable
    pub make: String,

    /// Parallelism hint passed as `-j<N>`
    pub jobs: usize,
}

impl Default for BuildConfig {
    fn default() -> Self {
        BuildConfig {
            make: "make".to_string(),
            jobs: 4,
        }
    }
}

/// Install settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstallConfig {
    /// Install destination root; the binary goes to `<prefix>/bin`
    pub prefix: PathBuf,
}

impl Default for InstallConfig {
    fn default() -> Self {
        InstallConfig {
            prefix: PathBuf::from("/usr/local"),
        }
    }
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config: {}", path.display()))
    }

    /// Load `qtbuild.toml` from the project root, or the defaults if absent.
    pub fn discover(project_root: &Path) -> Result<Self> {
        let path = project_root.join(CONFIG_FILE_NAME);
        if path.exists() {
            tracing::debug!("loading config from {}", path.display());
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Resolve into the explicit configuration consumed by the pipeline.
    pub fn to_pipeline_config(&self, project_root: &Path) -> Result<PipelineConfig> {
        let minimum_version = VersionTriple::parse(&self.toolchain.min_version)
            .with_context(|| {
                format!(
                    "invalid `toolchain.min-version` in config: `{}`",
                    self.toolchain.min_version
                )
            })?;

        anyhow::ensure!(self.build.jobs > 0, "`build.jobs` must be at least 1");
        anyhow::ensure!(!self.project.binary.is_empty(), "`project.binary` must not be empty");

        Ok(PipelineConfig {
            root: project_root.to_path_buf(),
            main_dir: self.project.main_dir.clone(),
            extra_dirs: self.project.extra_dirs.clone(),
            binary: self.project.binary.clone(),
            required_programs: self.project.required_programs.clone(),
            minimum_version,
            allow_unverified_version: self.toolchain.allow_unverified_version,
            make: self.build.make.clone(),
            jobs: self.build.jobs,
            prefix: self.install.prefix.clone(),
        })
    }
}
