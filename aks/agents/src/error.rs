use snafu::Snafu;
use std::path::PathBuf;

/// The boxed error of a [`Provision`](scenario_agent::Provision) or
/// [`Container`](scenario_agent::Container) implementation.
pub type ToolError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    #[snafu(display("Failed to run '{}': {}", hint, source))]
    Command {
        hint: String,
        source: agent_utils::Error,
    },

    #[snafu(display("{}", message))]
    CommandFailed {
        hint: String,
        exit_code: Option<i32>,
        message: String,
    },

    #[snafu(display("Unable to read scenario file '{}': {}", path.display(), source))]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("Unable to parse scenario file '{}': {}", path.display(), source))]
    ConfigParse {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[snafu(display("Container {} failed: {}", what, source))]
    Container { what: String, source: ToolError },

    #[snafu(display("Terraform output '{}' was empty", key))]
    EmptyKubeconfig { key: String },

    #[snafu(display("Unable to parse terraform output '{}': {}", key, source))]
    OutputParse {
        key: String,
        source: serde_json::Error,
    },

    #[snafu(display("Unable to resolve path '{}': {}", path.display(), source))]
    Path {
        path: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("Provisioning {} failed: {}", what, source))]
    Provision { what: String, source: ToolError },

    #[snafu(display(
        "'{}' still failing after {} retries, last cause: {}\n{}",
        hint,
        retries,
        cause,
        message
    ))]
    RetriesExhausted {
        hint: String,
        retries: u32,
        cause: String,
        message: String,
    },

    #[snafu(display("Invalid retryable error pattern '{}': {}", pattern, source))]
    RetryablePattern {
        pattern: String,
        source: regex::Error,
    },

    #[snafu(display("Unable to read settings from the environment: {}", source))]
    Settings { source: envy::Error },

    #[snafu(display("Test data error: {}", source))]
    TestData {
        source: scenario_agent::FolderError,
    },

    #[snafu(display("Unable to write kubeconfig: {}", source))]
    WriteKubeconfig {
        source: scenario_agent::FolderError,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
