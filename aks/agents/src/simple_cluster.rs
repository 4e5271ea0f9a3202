/*!

The simple-cluster scenario: provision an AKS cluster with Terraform, run the health check image
against it, and check the health check's output.

!*/

use crate::config::SimpleClusterConfig;
use crate::constants::{
    SCENARIO_CONFIG_FILE, VAR_CLUSTER_NAME, VAR_LOCATION, VAR_RESOURCE_GROUP_NAME,
};
use crate::error::{self, Error, Result};
use crate::terraform::TerraformOptions;
use async_trait::async_trait;
use log::{debug, error, info};
use maplit::btreemap;
use scenario_agent::{Container, Outcome, Provision, Scenario, TempFolder};
use scenario_model::constants::{KUBECONFIG_FILE, OUTPUT_KEY, TERRAFORM_OPTIONS_FILE};
use scenario_model::{unique_id, BuildOptions, RunOptions, VolumeMount};
use serde_json::Value;
use snafu::{ensure, ResultExt};
use std::path::{Path, PathBuf};

/// The simple-cluster scenario. `P` provisions the cluster and `C` builds and runs the health
/// check; in practice these are [`Terraform`](crate::Terraform) and [`Docker`](crate::Docker).
pub struct SimpleCluster<P, C> {
    config: SimpleClusterConfig,
    provisioner: P,
    container: C,
}

impl<P, C> SimpleCluster<P, C>
where
    P: Provision<Options = TerraformOptions>,
    C: Container,
{
    pub fn new(config: SimpleClusterConfig, provisioner: P, container: C) -> Self {
        Self {
            config,
            provisioner,
            container,
        }
    }

    pub fn config(&self) -> &SimpleClusterConfig {
        &self.config
    }

    pub fn provisioner(&self) -> &P {
        &self.provisioner
    }

    pub fn container(&self) -> &C {
        &self.container
    }

    /// Terraform options for a new run. Resource names carry a fresh unique id so that parallel
    /// runs do not collide.
    pub fn terraform_options(&self, folder: &TempFolder) -> TerraformOptions {
        let id = unique_id();
        let resource_group_name = format!("{}-{}", self.config.resource_group_prefix, id);
        let cluster_name = format!("{}-{}", self.config.cluster_prefix, id);
        info!(
            "Using cluster '{}' in resource group '{}'",
            cluster_name, resource_group_name
        );
        let mut options = TerraformOptions {
            terraform_dir: folder.path().to_path_buf(),
            no_color: self.config.no_color,
            vars: btreemap! {
                VAR_RESOURCE_GROUP_NAME.to_string() => Value::String(resource_group_name),
                VAR_LOCATION.to_string() => Value::String(self.config.location.clone()),
                VAR_CLUSTER_NAME.to_string() => Value::String(cluster_name),
            },
            ..TerraformOptions::default()
        }
        .with_default_retryable_errors();
        options.max_retries = self.config.max_retries;
        options.time_between_retries_secs = self.config.time_between_retries_secs;
        options
    }

    fn write_kubeconfig(&self, folder: &TempFolder, kubeconfig: &str) -> Result<()> {
        ensure!(
            !kubeconfig.trim().is_empty(),
            error::EmptyKubeconfigSnafu {
                key: &self.config.kubeconfig_output
            }
        );
        info!("Writing kubeconfig to '{}'", folder.path().display());
        match folder.write_file(KUBECONFIG_FILE, kubeconfig.as_bytes()) {
            Ok(path) => {
                debug!("Wrote kubeconfig to '{}'", path.display());
                Ok(())
            }
            Err(e) => {
                error!("Unable to write kubeconfig: {}", e);
                Err(e).context(error::WriteKubeconfigSnafu)
            }
        }
    }
}

#[async_trait]
impl<P, C> Scenario for SimpleCluster<P, C>
where
    P: Provision<Options = TerraformOptions>,
    C: Container,
{
    type E = Error;

    async fn arrange(&self, folder: &TempFolder) -> Result<()> {
        let options = self.terraform_options(folder);
        debug!("Terraform options: {}", options);
        folder
            .save_test_data(SCENARIO_CONFIG_FILE, &self.config)
            .context(error::TestDataSnafu)?;
        folder
            .save_test_data(TERRAFORM_OPTIONS_FILE, &options)
            .context(error::TestDataSnafu)?;

        self.provisioner
            .init_and_apply(&options)
            .await
            .map_err(|e| Error::Provision {
                what: "init and apply".to_string(),
                source: e.into(),
            })?;

        let kubeconfig = self
            .provisioner
            .output(&options, &self.config.kubeconfig_output)
            .await
            .map_err(|e| Error::Provision {
                what: format!("output '{}'", self.config.kubeconfig_output),
                source: e.into(),
            })?;
        self.write_kubeconfig(folder, &kubeconfig)
    }

    async fn act(&self, folder: &TempFolder) -> Result<()> {
        let kubeconfig = folder
            .require_test_data(KUBECONFIG_FILE)
            .context(error::TestDataSnafu)?;
        let kubeconfig = absolute(&kubeconfig)?;

        let build_options = BuildOptions {
            tags: vec![self.config.image_tag.clone()],
            ..BuildOptions::default()
        };
        self.container
            .build(&self.config.build_context, &build_options)
            .await
            .map_err(|e| Error::Container {
                what: "build".to_string(),
                source: e.into(),
            })?;

        let run_options = RunOptions {
            volumes: vec![VolumeMount::new(
                kubeconfig,
                self.config.kubeconfig_mount.clone(),
            )],
            command: self.config.command.clone(),
            remove: true,
            ..RunOptions::default()
        };
        info!(
            "Running '{}' with temp folder '{}'",
            self.config.command.join(" "),
            folder.path().display()
        );
        let output = self
            .container
            .run(&self.config.image_tag, &run_options)
            .await
            .map_err(|e| Error::Container {
                what: "run".to_string(),
                source: e.into(),
            })?;

        folder
            .save_string(OUTPUT_KEY, &output)
            .context(error::TestDataSnafu)?;
        Ok(())
    }

    async fn assert(&self, folder: &TempFolder) -> Result<Outcome> {
        let output = folder
            .load_string(OUTPUT_KEY)
            .context(error::TestDataSnafu)?;
        let outcome = self.config.assertion.evaluate(&output);
        match outcome {
            Outcome::Pass => info!("Assertion passed: {}", self.config.assertion),
            _ => error!(
                "Assertion failed: {}, actual output:\n{}",
                self.config.assertion, output
            ),
        }
        Ok(outcome)
    }

    async fn teardown(&self, folder: &TempFolder) -> Result<()> {
        let options: TerraformOptions = folder
            .load_test_data(TERRAFORM_OPTIONS_FILE)
            .context(error::TestDataSnafu)?;
        info!(
            "Destroying resources created from '{}'",
            options.terraform_dir.display()
        );
        self.provisioner
            .destroy(&options)
            .await
            .map_err(|e| Error::Provision {
                what: "destroy".to_string(),
                source: e.into(),
            })?;
        Ok(())
    }
}

fn absolute(path: &Path) -> Result<PathBuf> {
    path.canonicalize().context(error::PathSnafu { path })
}
