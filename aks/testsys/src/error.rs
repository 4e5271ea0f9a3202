use scenario_agent::{FolderError, StageError};
use scenario_model::Outcome;
use snafu::Snafu;
use std::path::PathBuf;

/// The crate-wide result type.
pub(crate) type Result<T> = std::result::Result<T, Error>;

/// The crate-wide error type.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub(crate) enum Error {
    #[snafu(display("Unable to load the scenario configuration: {}", source))]
    Config { source: aks_agents::Error },

    #[snafu(display("The scenario's outcome was '{}', see '{}'", outcome, folder.display()))]
    Failed { outcome: Outcome, folder: PathBuf },

    #[snafu(display("Unable to prepare the scenario folder: {}", source))]
    Folder { source: FolderError },

    #[snafu(display("Scenario folder '{}' does not exist", path.display()))]
    MissingFolder { path: PathBuf },

    #[snafu(display("{}", source))]
    Scenario {
        source: StageError<aks_agents::Error>,
    },

    #[snafu(display("Unable to read settings: {}", source))]
    Settings { source: aks_agents::Error },
}
