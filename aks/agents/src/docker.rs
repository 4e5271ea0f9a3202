use crate::error::{self, Result};
use agent_utils::run_command;
use async_trait::async_trait;
use log::info;
use scenario_agent::Container;
use scenario_model::{BuildOptions, RunOptions};
use snafu::ensure;
use snafu::ResultExt;
use std::path::{Path, PathBuf};
use tokio::process::Command;

/// Runs the `docker` binary.
#[derive(Debug, Clone)]
pub struct Docker {
    binary: PathBuf,
}

impl Docker {
    pub fn new<P>(binary: P) -> Self
    where
        P: Into<PathBuf>,
    {
        Self {
            binary: binary.into(),
        }
    }

    async fn run_docker(&self, args: Vec<String>, hint: &str) -> Result<String> {
        let output = run_command(Command::new(&self.binary).args(&args), hint)
            .await
            .context(error::CommandSnafu { hint })?;
        ensure!(
            output.success(),
            error::CommandFailedSnafu {
                hint,
                exit_code: output.exit_code(),
                message: output.failure_message(hint),
            }
        );
        Ok(output.combined())
    }
}

#[async_trait]
impl Container for Docker {
    type E = crate::Error;

    async fn build(&self, context: &Path, options: &BuildOptions) -> Result<()> {
        info!(
            "Building image '{}' from '{}'",
            options.tags.join(", "),
            context.display()
        );
        self.run_docker(build_args(context, options), "docker build")
            .await
            .map(|_| ())
    }

    async fn run(&self, image: &str, options: &RunOptions) -> Result<String> {
        info!("Running image '{}'", image);
        self.run_docker(run_args(image, options), "docker run").await
    }
}

fn build_args(context: &Path, options: &BuildOptions) -> Vec<String> {
    let mut args = vec!["build".to_string()];
    for tag in &options.tags {
        args.push("--tag".to_string());
        args.push(tag.clone());
    }
    for (key, value) in &options.build_args {
        args.push("--build-arg".to_string());
        args.push(format!("{}={}", key, value));
    }
    args.push(context.display().to_string());
    args
}

fn run_args(image: &str, options: &RunOptions) -> Vec<String> {
    let mut args = vec!["run".to_string()];
    if options.remove {
        args.push("--rm".to_string());
    }
    for volume in &options.volumes {
        args.push("-v".to_string());
        args.push(volume.to_string());
    }
    for (key, value) in &options.env {
        args.push("-e".to_string());
        args.push(format!("{}={}", key, value));
    }
    args.push(image.to_string());
    args.extend(options.command.iter().cloned());
    args
}
