//! Build orchestration.
//!
//! This module drives qmake and make across the configured source
//! directories and installs the resulting binary.

pub mod context;
pub mod directory;
pub mod error;
pub mod install;
pub mod pipeline;

pub use context::BuildContext;
pub use directory::BuildDirectory;
pub use error::{BuildError, Step};
pub use install::InstallTarget;
pub use pipeline::{
    BuildPipeline, DirectorySet, Phase, PipelineConfig, PipelineFailure, PipelineResult, Phases,
};
