use scenario_model::Stage;
use snafu::Snafu;
use std::fmt::{Debug, Display, Formatter};
use std::path::PathBuf;

/// The error returned by the [`ScenarioAgent`](crate::ScenarioAgent). It records which stage
/// failed and preserves the scenario's own error type.
#[derive(Debug)]
pub struct StageError<E>
where
    E: Debug + Display + Send + Sync + 'static,
{
    pub stage: Stage,
    pub source: E,
}

impl<E> Display for StageError<E>
where
    E: Debug + Display + Send + Sync + 'static,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} stage failed: {}", self.stage, self.source)
    }
}

impl<E> std::error::Error for StageError<E> where E: Debug + Display + Send + Sync + 'static {}

/// Errors reading or writing a [`TempFolder`](crate::TempFolder).
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum FolderError {
    #[snafu(display("Unable to copy '{}' to '{}': {}", from.display(), to.display(), source))]
    Copy {
        from: PathBuf,
        to: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("Unable to create directory '{}': {}", path.display(), source))]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("Unable to deserialize test data '{}': {}", path.display(), source))]
    Deserialize {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[snafu(display("Test data '{}' is missing, has the stage that writes it run?", path.display()))]
    MissingTestData { path: PathBuf },

    #[snafu(display("Unable to read '{}': {}", path.display(), source))]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("Unable to resolve '{}': {}", path.display(), source))]
    Resolve {
        path: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("Unable to serialize test data '{}': {}", name, source))]
    Serialize {
        name: String,
        source: serde_json::Error,
    },

    #[snafu(display("The module folder '{}' does not exist", path.display()))]
    SourceMissing { path: PathBuf },

    #[snafu(display("Unable to link '{}' to '{}': {}", link.display(), target.display(), source))]
    Symlink {
        link: PathBuf,
        target: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("Unable to write '{}': {}", path.display(), source))]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

pub type FolderResult<T> = std::result::Result<T, FolderError>;
