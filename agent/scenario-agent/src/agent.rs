use crate::error::StageError;
use crate::gate::StageGate;
use crate::temp_folder::TempFolder;
use crate::Scenario;
use futures::FutureExt;
use log::{error, info};
use scenario_model::{Outcome, Stage};
use std::panic::AssertUnwindSafe;

type Result<T, E> = std::result::Result<T, StageError<E>>;

/// The `ScenarioAgent` runs a [`Scenario`] in a [`TempFolder`]. Stages run strictly in order on the
/// calling task. Once `arrange` has begun, `teardown` runs exactly once, whether the earlier stages
/// succeed, fail or panic.
///
/// Individual stages can be skipped with a [`StageGate`], see [`StageGate::from_env`].
pub struct ScenarioAgent<S>
where
    S: Scenario,
{
    scenario: S,
    folder: TempFolder,
    gate: StageGate,
}

impl<S> ScenarioAgent<S>
where
    S: Scenario,
{
    /// Create a `ScenarioAgent` that runs every stage.
    pub fn new(scenario: S, folder: TempFolder) -> Self {
        Self::with_gate(scenario, folder, StageGate::none())
    }

    pub fn with_gate(scenario: S, folder: TempFolder, gate: StageGate) -> Self {
        Self {
            scenario,
            folder,
            gate,
        }
    }

    pub fn folder(&self) -> &TempFolder {
        &self.folder
    }

    pub fn scenario(&self) -> &S {
        &self.scenario
    }

    /// Run the whole scenario. Returns the verdict of the assert stage, or `Outcome::Skipped` if it
    /// was skipped.
    ///
    /// If a stage fails, the remaining stages other than teardown are not run and that stage's
    /// error is returned. A teardown error is logged and is only returned when nothing failed
    /// before it. A panic in a stage is resumed after teardown has run.
    pub async fn run(&self) -> Result<Outcome, S::E> {
        info!("Running scenario in '{}'", self.folder.path().display());
        let result = AssertUnwindSafe(self.run_stages()).catch_unwind().await;

        let teardown_result = self.run_stage(Stage::Teardown).await;
        if let Err(e) = &teardown_result {
            error!("Teardown failed, resources may remain: {}", e);
        }

        let result = match result {
            Ok(result) => result,
            Err(panic) => std::panic::resume_unwind(panic),
        };

        match &result {
            Ok(outcome) => info!("Scenario finished with outcome '{}'", outcome),
            Err(e) => error!("Scenario failed: {}", e),
        }

        // We want the stage error first if there was one.
        let outcome = result?;
        teardown_result?;
        Ok(outcome)
    }

    /// Run a single stage, subject to the gate. Returns `Some` verdict for the assert stage and
    /// `None` for the other stages or when the stage is skipped.
    pub async fn run_stage(&self, stage: Stage) -> Result<Option<Outcome>, S::E> {
        if !self.gate.should_run(stage) {
            return Ok(None);
        }
        let folder = &self.folder;
        let result = match stage {
            Stage::Arrange => self.scenario.arrange(folder).await.map(|_| None),
            Stage::Act => self.scenario.act(folder).await.map(|_| None),
            Stage::Assert => self.scenario.assert(folder).await.map(Some),
            Stage::Teardown => self.scenario.teardown(folder).await.map(|_| None),
        };
        result.map_err(|source| StageError { stage, source })
    }

    async fn run_stages(&self) -> Result<Outcome, S::E> {
        self.run_stage(Stage::Arrange).await?;
        self.run_stage(Stage::Act).await?;
        let outcome = self.run_stage(Stage::Assert).await?;
        Ok(outcome.unwrap_or(Outcome::Skipped))
    }
}
