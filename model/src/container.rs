use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

/// Options for building a container image.
#[derive(Serialize, Deserialize, Debug, Default, Eq, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct BuildOptions {
    /// Tags applied to the built image.
    pub tags: Vec<String>,
    /// Values passed with `--build-arg`.
    #[serde(default)]
    pub build_args: BTreeMap<String, String>,
}

/// Options for running a container.
#[derive(Serialize, Deserialize, Debug, Default, Eq, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct RunOptions {
    /// Host paths bind-mounted into the container.
    #[serde(default)]
    pub volumes: Vec<VolumeMount>,
    /// Environment variables set in the container.
    #[serde(default)]
    pub env: BTreeMap<String, String>,
    /// The command and its arguments.
    #[serde(default)]
    pub command: Vec<String>,
    /// Remove the container once it exits.
    #[serde(default)]
    pub remove: bool,
}

/// A bind mount of `host` at `container`.
#[derive(Serialize, Deserialize, Debug, Default, Eq, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct VolumeMount {
    pub host: PathBuf,
    pub container: String,
}

impl VolumeMount {
    pub fn new<P, S>(host: P, container: S) -> Self
    where
        P: Into<PathBuf>,
        S: Into<String>,
    {
        Self {
            host: host.into(),
            container: container.into(),
        }
    }
}

impl Display for VolumeMount {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.host.display(), self.container)
    }
}
