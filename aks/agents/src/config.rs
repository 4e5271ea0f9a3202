use crate::constants::*;
use crate::error::{self, Result};
use agent_utils::impl_display_as_json;
use scenario_model::{Assertion, Configuration};
use serde::{Deserialize, Serialize};
use snafu::ResultExt;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Everything that describes the simple-cluster scenario. Any field may be omitted from a
/// scenario file, in which case the default is used.
///
/// ```yaml
/// terraformDir: scenario/simple-cluster
/// location: westus2
/// assertion:
///   equals: "Hello, World!"
/// ```
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SimpleClusterConfig {
    /// The Terraform module, relative to the root folder that is copied for each run.
    pub terraform_dir: PathBuf,

    /// The Azure region for the cluster.
    pub location: String,

    /// The resource group is named `<prefix>-<unique id>`.
    pub resource_group_prefix: String,

    /// The cluster is named `<prefix>-<unique id>`.
    pub cluster_prefix: String,

    /// The Terraform output that holds the cluster's kubeconfig.
    pub kubeconfig_output: String,

    /// Disable colors in Terraform commands so that output is easier to parse.
    pub no_color: bool,

    /// How many times a command failing with a known transient error is retried.
    pub max_retries: u32,

    /// Seconds to wait between retries.
    pub time_between_retries_secs: u64,

    /// The Docker build context of the health-check image, relative to the working directory.
    pub build_context: PathBuf,

    pub image_tag: String,

    /// Where the kubeconfig is mounted inside the container.
    pub kubeconfig_mount: String,

    /// The command run inside the container.
    pub command: Vec<String>,

    /// The condition checked against the container's output.
    pub assertion: Assertion,
}

impl Configuration for SimpleClusterConfig {}
impl_display_as_json!(SimpleClusterConfig);

impl Default for SimpleClusterConfig {
    fn default() -> Self {
        Self {
            terraform_dir: PathBuf::from(DEFAULT_TERRAFORM_DIR),
            location: DEFAULT_LOCATION.to_string(),
            resource_group_prefix: DEFAULT_RESOURCE_GROUP_PREFIX.to_string(),
            cluster_prefix: DEFAULT_CLUSTER_PREFIX.to_string(),
            kubeconfig_output: DEFAULT_KUBECONFIG_OUTPUT.to_string(),
            no_color: true,
            max_retries: DEFAULT_MAX_RETRIES,
            time_between_retries_secs: DEFAULT_TIME_BETWEEN_RETRIES.as_secs(),
            build_context: PathBuf::from(DEFAULT_BUILD_CONTEXT),
            image_tag: DEFAULT_IMAGE_TAG.to_string(),
            kubeconfig_mount: DEFAULT_KUBECONFIG_MOUNT.to_string(),
            command: DEFAULT_COMMAND.iter().map(|s| s.to_string()).collect(),
            assertion: Assertion::Contains(DEFAULT_EXPECTED_OUTPUT.to_string()),
        }
    }
}

impl SimpleClusterConfig {
    /// Load a scenario file written in YAML.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).context(error::ConfigReadSnafu { path })?;
        Self::from_yaml(&contents).context(error::ConfigParseSnafu { path })
    }

    pub fn from_yaml(yaml: &str) -> std::result::Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    pub fn time_between_retries(&self) -> Duration {
        Duration::from_secs(self.time_between_retries_secs)
    }
}
