use crate::constants::{DEFAULT_DOCKER_PATH, DEFAULT_TERRAFORM_PATH, ENV_PREFIX};
use crate::error::{self, Result};
use serde::Deserialize;
use snafu::ResultExt;
use std::path::PathBuf;

/// Settings that describe the machine rather than the scenario, read from environment variables
/// prefixed with `AKS_SCENARIO_`.
#[derive(Debug, Clone, Deserialize, Eq, PartialEq)]
pub struct Settings {
    /// The path to the `terraform` binary. Defaults to `terraform` (i.e. found via `$PATH`).
    ///
    /// ```text
    /// AKS_SCENARIO_TERRAFORM_PATH=/opt/terraform/bin/terraform
    /// ```
    #[serde(default = "terraform")]
    pub terraform_path: PathBuf,

    /// The path to the `docker` binary. Defaults to `docker` (i.e. found via `$PATH`).
    ///
    /// ```text
    /// AKS_SCENARIO_DOCKER_PATH=/usr/local/bin/docker
    /// ```
    #[serde(default = "docker")]
    pub docker_path: PathBuf,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        envy::prefixed(ENV_PREFIX)
            .from_env::<Self>()
            .context(error::SettingsSnafu)
    }

    /// Build the settings from `(name, value)` pairs, where names include the prefix.
    pub fn from_vars<I>(vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        envy::prefixed(ENV_PREFIX)
            .from_iter::<_, Self>(vars)
            .context(error::SettingsSnafu)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            terraform_path: terraform(),
            docker_path: docker(),
        }
    }
}

/// We need these to provide defaults for serde.
fn terraform() -> PathBuf {
    PathBuf::from(DEFAULT_TERRAFORM_PATH)
}

fn docker() -> PathBuf {
    PathBuf::from(DEFAULT_DOCKER_PATH)
}
