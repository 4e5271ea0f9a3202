/*!

This is the command line interface for running the AKS health check scenario: provision a cluster,
run the health check against it, check the result and tear the cluster down.

!*/

mod error;
mod run;
mod scenario;
mod stage;
mod unique_id;

use agent_utils::init_agent_logger;
use error::Result;
use log::LevelFilter;
use structopt::StructOpt;

/// The command line interface for running AKS health check scenarios.
#[derive(Debug, StructOpt)]
struct Args {
    /// Set logging verbosity [trace|debug|info|warn|error]. If the environment variable `RUST_LOG`
    /// is present, it overrides the default logging behavior. See https://docs.rs/env_logger/latest
    #[structopt(long = "log-level", default_value = "info")]
    log_level: LevelFilter,
    #[structopt(subcommand)]
    command: Command,
}

#[derive(Debug, StructOpt)]
enum Command {
    /// Run every stage of the scenario in a fresh temp folder.
    Run(run::Run),
    /// Run a single stage against the folder of an earlier run.
    Stage(stage::RunStage),
    /// Print a unique id suitable for suffixing resource names.
    UniqueId(unique_id::UniqueId),
}

#[tokio::main]
async fn main() {
    let args = Args::from_args();
    init_agent_logger(env!("CARGO_CRATE_NAME"), Some(args.log_level));
    if let Err(e) = run(args).await {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    match args.command {
        Command::Run(run) => run.run().await,
        Command::Stage(stage) => stage.run().await,
        Command::UniqueId(unique_id) => unique_id.run(),
    }
}
