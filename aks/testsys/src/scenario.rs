use crate::error::{self, Result};
use aks_agents::constants::SCENARIO_CONFIG_FILE;
use aks_agents::{Docker, Settings, SimpleCluster, SimpleClusterConfig, Terraform};
use log::{debug, info};
use scenario_agent::{ScenarioAgent, StageGate, TempFolder};
use snafu::ResultExt;
use std::path::Path;

pub(crate) type Agent = ScenarioAgent<SimpleCluster<Terraform, Docker>>;

/// Load the scenario configuration. An explicit scenario file wins, then the configuration
/// persisted in `folder` by an earlier `arrange`, then the defaults.
pub(crate) fn load_config(
    scenario_file: Option<&Path>,
    folder: Option<&TempFolder>,
) -> Result<SimpleClusterConfig> {
    if let Some(path) = scenario_file {
        info!("Using scenario file '{}'", path.display());
        return SimpleClusterConfig::from_file(path).context(error::ConfigSnafu);
    }
    if let Some(folder) = folder.filter(|f| f.is_test_data_present(SCENARIO_CONFIG_FILE)) {
        info!(
            "Using the scenario configuration saved in '{}'",
            folder.path().display()
        );
        return folder
            .load_test_data(SCENARIO_CONFIG_FILE)
            .context(error::FolderSnafu);
    }
    Ok(SimpleClusterConfig::default())
}

/// Create the agent that runs the simple-cluster scenario with the real `terraform` and `docker`.
pub(crate) fn new_agent(
    config: SimpleClusterConfig,
    folder: TempFolder,
    gate: StageGate,
) -> Result<Agent> {
    let settings = Settings::from_env().context(error::SettingsSnafu)?;
    debug!("Settings: {:?}", settings);
    debug!("Scenario configuration:\n{:#}", config);
    let scenario = SimpleCluster::new(
        config,
        Terraform::new(settings.terraform_path),
        Docker::new(settings.docker_path),
    );
    Ok(ScenarioAgent::with_gate(scenario, folder, gate))
}
