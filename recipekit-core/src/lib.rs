//! Embeddable core library for recipekit.
//!
//! Provides a clap-free, I/O-abstracted entry point for planning and running
//! recipe installs.
//!
//! # Port traits
//!
//! All I/O is abstracted behind port traits in [`ports`]:
//! - [`SpecSource`](ports::SpecSource) - load the resolver's concrete spec
//! - [`CommandRunner`](ports::CommandRunner) - run external commands
//! - [`FileReader`](ports::FileReader) - read status and log files
//! - [`WritePort`](ports::WritePort) - write files and create directories
//!
//! The [`adapters`] module provides default process- and filesystem-backed
//! implementations.
//!
//! # Entry points
//!
//! - [`run_plan`](pipeline::run_plan) - validate a spec and compute its plan
//! - [`run_install`](pipeline::run_install) - run edit, configure, build, test, install

pub mod adapters;
pub mod env;
pub mod error;
mod exec;
pub mod pipeline;
pub mod ports;
pub mod settings;
mod testing;

pub use error::{InstallError, TestFailure};
pub use pipeline::{
    InstallOutcome, PlanOutcome, run_install, run_plan, write_install_artifacts,
    write_plan_artifacts,
};
pub use settings::{InstallSettings, PlanSettings};

// Re-export the edit policy so callers don't need recipekit-edit directly.
pub use recipekit_edit::MissingPattern;
