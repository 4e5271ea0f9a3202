use crate::constants::{DEFAULT_MAX_RETRIES, DEFAULT_RETRYABLE_ERRORS, DEFAULT_TIME_BETWEEN_RETRIES};
use crate::error::{self, Result};
use agent_utils::{impl_display_as_json, run_command};
use async_trait::async_trait;
use log::{info, warn};
use regex::Regex;
use scenario_agent::{Configuration, Provision};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use snafu::{ensure, ResultExt};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::sleep;

/// The options for running Terraform against one module. These are persisted in the scenario's
/// temp folder by `arrange` so that `teardown` destroys exactly what was created.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TerraformOptions {
    /// The folder containing the Terraform module. Commands run with this as working directory.
    pub terraform_dir: PathBuf,

    /// Pass `-no-color` to commands.
    pub no_color: bool,

    /// Values passed with `-var`. Strings are passed as is, anything else as JSON which Terraform
    /// reads as an HCL expression.
    pub vars: BTreeMap<String, Value>,

    /// A regular expression matching a transient error, mapped to a description of the cause.
    #[serde(default)]
    pub retryable_errors: BTreeMap<String, String>,

    /// How many times a command is retried after a retryable error.
    #[serde(default)]
    pub max_retries: u32,

    #[serde(default)]
    pub time_between_retries_secs: u64,
}

impl Configuration for TerraformOptions {}
impl_display_as_json!(TerraformOptions);

impl TerraformOptions {
    /// Add the known transient Terraform errors and the default retry policy. Existing entries are
    /// kept.
    pub fn with_default_retryable_errors(mut self) -> Self {
        for (pattern, message) in DEFAULT_RETRYABLE_ERRORS {
            self.retryable_errors
                .entry(pattern.to_string())
                .or_insert_with(|| message.to_string());
        }
        if self.max_retries == 0 {
            self.max_retries = DEFAULT_MAX_RETRIES;
        }
        if self.time_between_retries_secs == 0 {
            self.time_between_retries_secs = DEFAULT_TIME_BETWEEN_RETRIES.as_secs();
        }
        self
    }

    pub fn time_between_retries(&self) -> Duration {
        Duration::from_secs(self.time_between_retries_secs)
    }

    fn var_args(&self) -> Vec<String> {
        self.vars
            .iter()
            .flat_map(|(key, value)| {
                let value = match value {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                vec!["-var".to_string(), format!("{}={}", key, value)]
            })
            .collect()
    }

    fn color_args(&self) -> Vec<String> {
        if self.no_color {
            vec!["-no-color".to_string()]
        } else {
            Vec::new()
        }
    }

    pub(crate) fn init_args(&self) -> Vec<String> {
        let mut args = vec!["init".to_string(), "-upgrade=false".to_string()];
        args.extend(self.color_args());
        args
    }

    pub(crate) fn apply_args(&self) -> Vec<String> {
        let mut args = vec![
            "apply".to_string(),
            "-input=false".to_string(),
            "-auto-approve".to_string(),
            "-lock=false".to_string(),
        ];
        args.extend(self.color_args());
        args.extend(self.var_args());
        args
    }

    pub(crate) fn output_args(&self, key: &str) -> Vec<String> {
        let mut args = vec!["output".to_string()];
        args.extend(self.color_args());
        args.push("-json".to_string());
        args.push(key.to_string());
        args
    }

    pub(crate) fn destroy_args(&self) -> Vec<String> {
        let mut args = vec![
            "destroy".to_string(),
            "-auto-approve".to_string(),
            "-input=false".to_string(),
            "-lock=false".to_string(),
        ];
        args.extend(self.color_args());
        args.extend(self.var_args());
        args
    }
}

/// Runs the `terraform` binary.
#[derive(Debug, Clone)]
pub struct Terraform {
    binary: PathBuf,
}

impl Terraform {
    pub fn new<P>(binary: P) -> Self
    where
        P: Into<PathBuf>,
    {
        Self {
            binary: binary.into(),
        }
    }

    /// Run `terraform <args>` in the module folder and return its `stdout`. A failure whose output
    /// matches one of the options' retryable errors is retried.
    async fn run(&self, options: &TerraformOptions, args: Vec<String>) -> Result<String> {
        let hint = format!("terraform {}", args.first().map(String::as_str).unwrap_or(""));
        let retryable = compile_retryable_errors(&options.retryable_errors)?;

        let mut retries = 0;
        loop {
            info!("Running '{}' in '{}'", hint, options.terraform_dir.display());
            let output = run_command(
                Command::new(&self.binary)
                    .args(&args)
                    .current_dir(&options.terraform_dir),
                &hint,
            )
            .await
            .context(error::CommandSnafu { hint: &hint })?;

            if output.success() {
                return Ok(output.stdout());
            }

            let combined = output.combined();
            let cause = match retryable.iter().find(|(re, _)| re.is_match(&combined)) {
                Some((_, cause)) => cause,
                None => {
                    return error::CommandFailedSnafu {
                        hint: &hint,
                        exit_code: output.exit_code(),
                        message: output.failure_message(&hint),
                    }
                    .fail()
                }
            };

            ensure!(
                retries < options.max_retries,
                error::RetriesExhaustedSnafu {
                    hint: &hint,
                    retries,
                    cause: cause.as_str(),
                    message: output.failure_message(&hint),
                }
            );
            retries += 1;
            warn!(
                "'{}' failed with a retryable error: {} Retrying ({} of {}) in {:?}",
                hint,
                cause,
                retries,
                options.max_retries,
                options.time_between_retries()
            );
            sleep(options.time_between_retries()).await;
        }
    }
}

#[async_trait]
impl Provision for Terraform {
    type Options = TerraformOptions;
    type E = crate::Error;

    async fn init_and_apply(&self, options: &TerraformOptions) -> Result<String> {
        self.run(options, options.init_args()).await?;
        self.run(options, options.apply_args()).await
    }

    async fn output(&self, options: &TerraformOptions, key: &str) -> Result<String> {
        let stdout = self.run(options, options.output_args(key)).await?;
        parse_output(key, &stdout)
    }

    async fn destroy(&self, options: &TerraformOptions) -> Result<String> {
        self.run(options, options.destroy_args()).await
    }
}

fn compile_retryable_errors(errors: &BTreeMap<String, String>) -> Result<Vec<(Regex, String)>> {
    errors
        .iter()
        .map(|(pattern, cause)| {
            Regex::new(pattern)
                .context(error::RetryablePatternSnafu { pattern })
                .map(|re| (re, cause.clone()))
        })
        .collect()
}

/// Decode the output of `terraform output -json <key>`. A JSON string becomes the string itself,
/// anything else is returned as JSON text.
fn parse_output(key: &str, stdout: &str) -> Result<String> {
    let value: Value =
        serde_json::from_str(stdout.trim()).context(error::OutputParseSnafu { key })?;
    Ok(match value {
        Value::String(s) => s,
        other => other.to_string(),
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use maplit::btreemap;
    use serde_json::json;

    fn options() -> TerraformOptions {
        TerraformOptions {
            terraform_dir: PathBuf::from("scenario/simple-cluster"),
            no_color: true,
            vars: btreemap! {
                "cluster_name".to_string() => json!("aks-terratest-simple-cluster-abc123"),
                "location".to_string() => json!("eastus"),
                "tags".to_string() => json!({"team": "dev"}),
            },
            ..TerraformOptions::default()
        }
    }

    #[test]
    fn apply_args() {
        assert_eq!(
            options().apply_args(),
            vec![
                "apply",
                "-input=false",
                "-auto-approve",
                "-lock=false",
                "-no-color",
                "-var",
                "cluster_name=aks-terratest-simple-cluster-abc123",
                "-var",
                "location=eastus",
                "-var",
                r#"tags={"team":"dev"}"#,
            ]
        );
    }

    #[test]
    fn output_and_destroy_args() {
        assert_eq!(
            options().output_args("kube_config"),
            vec!["output", "-no-color", "-json", "kube_config"]
        );
        let destroy = options().destroy_args();
        assert_eq!(destroy[0], "destroy");
        assert!(destroy.contains(&"-auto-approve".to_string()));
        assert!(destroy.contains(&"location=eastus".to_string()));
        let colored = TerraformOptions {
            no_color: false,
            ..options()
        };
        assert_eq!(colored.init_args(), vec!["init", "-upgrade=false"]);
    }

    #[test]
    fn default_retryable_errors() {
        let options = options().with_default_retryable_errors();
        assert_eq!(options.max_retries, DEFAULT_MAX_RETRIES);
        assert_eq!(options.time_between_retries(), DEFAULT_TIME_BETWEEN_RETRIES);
        let compiled = compile_retryable_errors(&options.retryable_errors).unwrap();
        assert!(compiled
            .iter()
            .any(|(re, _)| re.is_match("Error: net/http: TLS handshake timeout")));
        assert!(!compiled
            .iter()
            .any(|(re, _)| re.is_match("Error: Invalid resource group name")));
    }

    #[test]
    fn bad_pattern() {
        let errors = btreemap! { "(".to_string() => "broken".to_string() };
        assert!(compile_retryable_errors(&errors).is_err());
    }

    #[test]
    fn output_values() {
        assert_eq!(
            parse_output("kube_config", "\"apiVersion: v1\\nkind: Config\\n\"\n").unwrap(),
            "apiVersion: v1\nkind: Config\n"
        );
        assert_eq!(parse_output("count", "3").unwrap(), "3");
        assert!(parse_output("kube_config", "not json").is_err());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn retries() {
        use std::os::unix::fs::PermissionsExt;

        // A fake terraform that fails twice with a transient error and then succeeds.
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("terraform");
        std::fs::write(
            &script,
            r#"#!/bin/sh
count_file="$(dirname "$0")/count"
n=$(cat "$count_file" 2>/dev/null || echo 0)
n=$((n + 1))
echo "$n" > "$count_file"
if [ "$1" = "destroy" ]; then echo "Error: resource group is locked" >&2; exit 1; fi
if [ "$n" -lt 3 ]; then echo "Error: net/http: TLS handshake timeout" >&2; exit 1; fi
echo '"ok"'
"#,
        )
        .unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
        let count = || {
            std::fs::read_to_string(dir.path().join("count"))
                .unwrap()
                .trim()
                .parse::<i32>()
                .unwrap()
        };

        let terraform = Terraform::new(&script);
        let mut options = TerraformOptions {
            terraform_dir: dir.path().to_path_buf(),
            ..TerraformOptions::default()
        }
        .with_default_retryable_errors();
        options.time_between_retries_secs = 0;

        let value = terraform.output(&options, "kube_config").await.unwrap();
        assert_eq!(value, "ok");
        assert_eq!(count(), 3);

        // Unknown errors are not retried.
        let error = terraform.destroy(&options).await.unwrap_err();
        assert!(matches!(error, crate::Error::CommandFailed { .. }));
        assert_eq!(count(), 4);

        // Retryable errors give up after `max_retries`.
        std::fs::write(dir.path().join("count"), "-10").unwrap();
        options.max_retries = 2;
        let error = terraform.output(&options, "kube_config").await.unwrap_err();
        assert!(matches!(
            error,
            crate::Error::RetriesExhausted { retries: 2, .. }
        ));
        assert_eq!(count(), -7);
    }
}
