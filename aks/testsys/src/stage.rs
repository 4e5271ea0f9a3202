use crate::error::{self, Result};
use crate::scenario::{load_config, new_agent};
use scenario_agent::{Stage, StageGate, TempFolder};
use snafu::{ensure, ResultExt};
use std::path::PathBuf;
use structopt::StructOpt;

/// Run one stage against an existing scenario folder, e.g. to re-run `assert` on the output of an
/// earlier `act`, or to `teardown` a run that was interrupted.
#[derive(Debug, StructOpt)]
pub(crate) struct RunStage {
    /// The stage to run: arrange, act, assert or teardown.
    stage: Stage,

    /// The scenario folder, i.e. the Terraform module folder of an earlier run.
    #[structopt(long, parse(from_os_str))]
    folder: PathBuf,

    /// A YAML file describing the scenario. Defaults to the configuration saved by `arrange`.
    #[structopt(long, parse(from_os_str))]
    scenario_file: Option<PathBuf>,
}

impl RunStage {
    pub(crate) async fn run(self) -> Result<()> {
        ensure!(
            self.folder.is_dir(),
            error::MissingFolderSnafu { path: &self.folder }
        );
        let folder = TempFolder::existing(&self.folder);
        let config = load_config(self.scenario_file.as_deref(), Some(&folder))?;
        let agent = new_agent(config, folder, StageGate::none())?;
        if let Some(outcome) = agent
            .run_stage(self.stage)
            .await
            .context(error::ScenarioSnafu)?
        {
            println!("{}", outcome);
            ensure!(
                outcome.is_success(),
                error::FailedSnafu {
                    outcome,
                    folder: &self.folder,
                }
            );
        }
        Ok(())
    }
}
