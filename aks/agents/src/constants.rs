use std::time::Duration;

/// Prefix of the environment variables read by [`Settings`](crate::Settings).
pub const ENV_PREFIX: &str = "AKS_SCENARIO_";

pub const DEFAULT_TERRAFORM_PATH: &str = "terraform";
pub const DEFAULT_DOCKER_PATH: &str = "docker";

// Scenario defaults
pub const DEFAULT_TERRAFORM_DIR: &str = "scenario/simple-cluster";
pub const DEFAULT_LOCATION: &str = "eastus";
pub const DEFAULT_RESOURCE_GROUP_PREFIX: &str = "rg-terratest-simple-cluster";
pub const DEFAULT_CLUSTER_PREFIX: &str = "aks-terratest-simple-cluster";
pub const DEFAULT_KUBECONFIG_OUTPUT: &str = "kube_config";
pub const DEFAULT_BUILD_CONTEXT: &str = "..";
pub const DEFAULT_IMAGE_TAG: &str = "boxboat/aks-health-check:terratest";
pub const DEFAULT_KUBECONFIG_MOUNT: &str = "/home/boxboat/.kube/config";
pub const DEFAULT_COMMAND: &[&str] = &["aks-hc", "check", "kubernetes"];
pub const DEFAULT_EXPECTED_OUTPUT: &str = "DEV-1";

// Terraform variable names
pub const VAR_RESOURCE_GROUP_NAME: &str = "resource_group_name";
pub const VAR_LOCATION: &str = "location";
pub const VAR_CLUSTER_NAME: &str = "cluster_name";

// Retries
pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_TIME_BETWEEN_RETRIES: Duration = Duration::from_secs(5);

/// Terraform errors that are known to be transient, mapped to a description of the cause.
pub const DEFAULT_RETRYABLE_ERRORS: &[(&str, &str)] = &[
    (
        ".*read: connection reset by peer.*",
        "Failed to reach a registry or repository.",
    ),
    (".*transport is closing.*", "Failed to reach the Kubernetes API."),
    (
        ".*unable to verify signature.*",
        "Failed to retrieve a plugin due to a transient network error.",
    ),
    (
        ".*unable to verify checksum.*",
        "Failed to retrieve a plugin due to a transient network error.",
    ),
    (
        ".*no provider exists with the given name.*",
        "Failed to retrieve a plugin due to a transient network error.",
    ),
    (
        ".*registry service is unreachable.*",
        "Failed to retrieve a plugin due to a transient network error.",
    ),
    (
        ".*Error installing provider.*",
        "Failed to install a provider due to a transient network error.",
    ),
    (
        ".*Failed to query available provider packages.*",
        "Failed to query the provider registry due to a transient network error.",
    ),
    (
        ".*timeout while waiting for plugin to start.*",
        "Failed to start a plugin in time.",
    ),
    (
        ".*timed out waiting for server handshake.*",
        "Failed to start a plugin in time.",
    ),
    (".*TLS handshake timeout.*", "Transient network error."),
    (
        ".*Client.Timeout exceeded while awaiting headers.*",
        "Transient network error.",
    ),
    (
        "could not query provider registry for",
        "Failed to query the provider registry due to a transient network error.",
    ),
];

/// The file that `arrange` persists the scenario configuration to, so that stages replayed later
/// use the same configuration.
pub const SCENARIO_CONFIG_FILE: &str = "SimpleClusterConfig.json";
