//! Qtbuild - a build driver for qmake-based Qt applications
//!
//! This crate detects an installed Qt toolchain, generates Makefiles with
//! qmake where needed, compiles one or more source directories with make,
//! and installs or cleans the result.

pub mod builder;
pub mod toolchain;
pub mod util;

/// Test utilities and mocks for qtbuild unit tests.
///
/// Only available when compiling tests. Provides a mock process runner so
/// pipeline logic can be exercised without qmake or make installed.
#[cfg(test)]
pub mod test_support;

pub use builder::{
    BuildError, BuildPipeline, DirectorySet, Phase, Phases, PipelineConfig, PipelineResult,
};
pub use toolchain::{ExecutableLocator, Generation, GenerationPreference, ToolchainCandidate};
pub use util::Config;
