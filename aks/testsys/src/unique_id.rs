use crate::error::Result;
use structopt::StructOpt;

/// Print a unique id, the same kind used to name the resources of a run.
#[derive(Debug, StructOpt)]
pub(crate) struct UniqueId {}

impl UniqueId {
    pub(crate) fn run(self) -> Result<()> {
        println!("{}", scenario_model::unique_id());
        Ok(())
    }
}
