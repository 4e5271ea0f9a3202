use crate::error::{self, Result};
use crate::scenario::{load_config, new_agent};
use scenario_agent::{StageGate, TempFolder};
use snafu::{ensure, ResultExt};
use std::path::PathBuf;
use structopt::StructOpt;

/// Run every stage of the scenario. Set `SKIP_<stage>` (e.g. `SKIP_teardown=true`) to skip a
/// stage; while any stage is skipped the original module folder is used instead of a temp copy.
#[derive(Debug, StructOpt)]
pub(crate) struct Run {
    /// A YAML file describing the scenario. Anything it omits takes its default value.
    #[structopt(long, parse(from_os_str))]
    scenario_file: Option<PathBuf>,

    /// The folder copied for each run. The Terraform module is found relative to it.
    #[structopt(long, parse(from_os_str), default_value = ".")]
    root_folder: PathBuf,
}

impl Run {
    pub(crate) async fn run(self) -> Result<()> {
        let config = load_config(self.scenario_file.as_deref(), None)?;
        let gate = StageGate::from_env();
        let folder =
            TempFolder::copy_module_to_temp(&self.root_folder, &config.terraform_dir, &gate)
                .context(error::FolderSnafu)?;
        let agent = new_agent(config, folder, gate)?;
        let outcome = agent.run().await.context(error::ScenarioSnafu)?;
        println!("{}", outcome);
        ensure!(
            outcome.is_success(),
            error::FailedSnafu {
                outcome,
                folder: agent.folder().path(),
            }
        );
        Ok(())
    }
}
