/*!

`scenario-agent` drives infrastructure test scenarios. A scenario is a fixed sequence of stages,
[`Stage::Arrange`], [`Stage::Act`] and [`Stage::Assert`], followed by [`Stage::Teardown`] which
runs no matter how the earlier stages ended.

You implement the [`Scenario`] trait for your scenario and hand it, together with a
[`TempFolder`], to the [`ScenarioAgent`]. Stages communicate only through the `TempFolder`, so any
stage can be re-run on its own against a folder left behind by an earlier run.

The external tools that a scenario calls are abstracted by the [`Provision`] and [`Container`]
traits so that scenarios can be tested with mocks in the absence of a cloud account or a Docker
daemon.

!*/

mod agent;
pub mod error;
mod gate;
mod temp_folder;

pub use crate::agent::ScenarioAgent;
pub use crate::error::{FolderError, StageError};
pub use crate::gate::StageGate;
pub use crate::temp_folder::TempFolder;
use async_trait::async_trait;
pub use scenario_model::{BuildOptions, Configuration, Outcome, RunOptions, Stage};
use std::fmt::{Debug, Display};
use std::path::Path;

/// The `Scenario` trait holds the work done in each stage. The [`ScenarioAgent`] calls the
/// functions in stage order and calls `teardown` last, even when an earlier stage fails.
///
/// Every function receives the run's [`TempFolder`]. Anything a later stage needs must be saved
/// there, since a stage may be invoked in a fresh process.
#[async_trait]
pub trait Scenario: Send + Sync {
    /// The error type returned by this trait's functions.
    type E: Debug + Display + Send + Sync + 'static;

    /// Create the infrastructure under test and persist whatever the other stages need.
    async fn arrange(&self, folder: &TempFolder) -> Result<(), Self::E>;

    /// Exercise the system under test and persist its output.
    async fn act(&self, folder: &TempFolder) -> Result<(), Self::E>;

    /// Check the persisted output. A failed check is `Ok(Outcome::Fail)`, not an error.
    async fn assert(&self, folder: &TempFolder) -> Result<Outcome, Self::E>;

    /// Release everything `arrange` created.
    async fn teardown(&self, folder: &TempFolder) -> Result<(), Self::E>;
}

/// A tool that creates and destroys infrastructure from declarative sources, e.g. Terraform.
#[async_trait]
pub trait Provision: Send + Sync {
    /// Everything the tool needs to find and parameterize the sources. These are persisted by
    /// `arrange` and reloaded by `teardown`.
    type Options: Configuration;

    /// The error type returned by this trait's functions.
    type E: std::error::Error + Send + Sync + 'static;

    /// Initialize the working directory and create the infrastructure. Returns the tool's output.
    async fn init_and_apply(&self, options: &Self::Options) -> Result<String, Self::E>;

    /// Read the named output value of the applied sources.
    async fn output(&self, options: &Self::Options, key: &str) -> Result<String, Self::E>;

    /// Destroy everything the sources describe. Returns the tool's output.
    async fn destroy(&self, options: &Self::Options) -> Result<String, Self::E>;
}

/// A tool that builds and runs container images, e.g. Docker.
#[async_trait]
pub trait Container: Send + Sync {
    /// The error type returned by this trait's functions.
    type E: std::error::Error + Send + Sync + 'static;

    /// Build an image from the build `context` directory.
    async fn build(&self, context: &Path, options: &BuildOptions) -> Result<(), Self::E>;

    /// Run `image` and return everything it printed. A non-zero exit is an error.
    async fn run(&self, image: &str, options: &RunOptions) -> Result<String, Self::E>;
}
