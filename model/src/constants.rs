/// The directory, relative to a scenario's temp folder, that holds the data persisted between
/// stages.
pub const TEST_DATA_DIR: &str = ".test-data";

/// The file that the provisioning options are persisted to.
pub const TERRAFORM_OPTIONS_FILE: &str = "TerraformOptions.json";

/// The file that the cluster credentials are written to.
pub const KUBECONFIG_FILE: &str = "kubeconfig";

/// The key that the act stage stores captured container output under.
pub const OUTPUT_KEY: &str = "output";

/// Setting `SKIP_<stage>` to a non-empty value skips that stage.
pub const SKIP_ENV_PREFIX: &str = "SKIP_";
