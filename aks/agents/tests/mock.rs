/*!

These tests run the [`SimpleCluster`] scenario with mock provisioning and container tools so that
the scenario's use of its temp folder, and the teardown guarantee, can be checked without an Azure
subscription or a Docker daemon.

!*/

use aks_agents::{SimpleCluster, SimpleClusterConfig, TerraformOptions};
use async_trait::async_trait;
use futures::FutureExt;
use scenario_agent::{
    BuildOptions, Container, Outcome, Provision, RunOptions, ScenarioAgent, Stage, StageGate,
    TempFolder,
};
use scenario_model::constants::{KUBECONFIG_FILE, TERRAFORM_OPTIONS_FILE};
use scenario_model::{Assertion, VolumeMount};
use std::io;
use std::panic::AssertUnwindSafe;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tempfile::{tempdir, TempDir};

const KUBECONFIG: &str = "apiVersion: v1\nkind: Config\nclusters: []\n";
const HEALTH_CHECK_OUTPUT: &str = "Scanning Development Items\n[DEV-1] Liveness probes are missing";

type Calls = Arc<Mutex<Vec<String>>>;

fn tool_error(message: &str) -> io::Error {
    io::Error::new(io::ErrorKind::Other, message.to_string())
}

/// Records its calls instead of running `terraform`.
#[derive(Default)]
struct MockTerraform {
    calls: Calls,
    fail_apply: bool,
    kubeconfig: String,
    applied: Mutex<Vec<TerraformOptions>>,
    destroyed: Mutex<Vec<TerraformOptions>>,
}

impl MockTerraform {
    fn new(calls: Calls) -> Self {
        Self {
            calls,
            kubeconfig: KUBECONFIG.to_string(),
            ..Self::default()
        }
    }
}

#[async_trait]
impl Provision for MockTerraform {
    type Options = TerraformOptions;
    type E = io::Error;

    async fn init_and_apply(&self, options: &TerraformOptions) -> Result<String, io::Error> {
        self.calls.lock().unwrap().push("terraform apply".into());
        self.applied.lock().unwrap().push(options.clone());
        if self.fail_apply {
            return Err(tool_error("Error: creating Managed Kubernetes Cluster"));
        }
        Ok("Apply complete!".into())
    }

    async fn output(&self, _: &TerraformOptions, key: &str) -> Result<String, io::Error> {
        self.calls.lock().unwrap().push(format!("terraform output {}", key));
        Ok(self.kubeconfig.clone())
    }

    async fn destroy(&self, options: &TerraformOptions) -> Result<String, io::Error> {
        self.calls.lock().unwrap().push("terraform destroy".into());
        self.destroyed.lock().unwrap().push(options.clone());
        Ok("Destroy complete!".into())
    }
}

/// How the `MockDocker` behaves when `run` is called.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
enum RunBehavior {
    Print,
    Exit,
    Panic,
}

/// Records its calls instead of running `docker`.
struct MockDocker {
    calls: Calls,
    output: String,
    behavior: RunBehavior,
    runs: Mutex<Vec<(String, RunOptions)>>,
}

impl MockDocker {
    fn new(calls: Calls) -> Self {
        Self {
            calls,
            output: HEALTH_CHECK_OUTPUT.to_string(),
            behavior: RunBehavior::Print,
            runs: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl Container for MockDocker {
    type E = io::Error;

    async fn build(&self, _: &Path, options: &BuildOptions) -> Result<(), io::Error> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("docker build {}", options.tags.join(",")));
        Ok(())
    }

    async fn run(&self, image: &str, options: &RunOptions) -> Result<String, io::Error> {
        self.calls.lock().unwrap().push(format!("docker run {}", image));
        self.runs
            .lock()
            .unwrap()
            .push((image.to_string(), options.clone()));
        for volume in &options.volumes {
            assert!(volume.host.is_file(), "{} is not mounted", volume);
        }
        match self.behavior {
            RunBehavior::Print => Ok(self.output.clone()),
            RunBehavior::Exit => Err(tool_error("exit code 1")),
            RunBehavior::Panic => panic!("docker daemon went away"),
        }
    }
}

type Agent = ScenarioAgent<SimpleCluster<MockTerraform, MockDocker>>;

fn config() -> SimpleClusterConfig {
    SimpleClusterConfig {
        time_between_retries_secs: 0,
        ..SimpleClusterConfig::default()
    }
}

fn agent_with(
    config: SimpleClusterConfig,
    terraform: MockTerraform,
    docker: MockDocker,
    gate: StageGate,
) -> (Agent, TempDir) {
    let dir = tempdir().unwrap();
    let scenario = SimpleCluster::new(config, terraform, docker);
    let agent = ScenarioAgent::with_gate(scenario, TempFolder::existing(dir.path()), gate);
    (agent, dir)
}

fn calls(agent: &Agent) -> Vec<String> {
    agent.scenario().provisioner().calls.lock().unwrap().clone()
}

fn destroy_count(agent: &Agent) -> usize {
    agent.scenario().provisioner().destroyed.lock().unwrap().len()
}

#[tokio::test]
async fn passing_run() {
    let calls_log = Calls::default();
    let (agent, _dir) = agent_with(
        config(),
        MockTerraform::new(calls_log.clone()),
        MockDocker::new(calls_log.clone()),
        StageGate::none(),
    );

    assert_eq!(agent.run().await.unwrap(), Outcome::Pass);
    assert_eq!(
        calls(&agent),
        vec![
            "terraform apply",
            "terraform output kube_config",
            "docker build boxboat/aks-health-check:terratest",
            "docker run boxboat/aks-health-check:terratest",
            "terraform destroy",
        ]
    );

    let folder = agent.folder();
    let kubeconfig = folder.require_test_data(KUBECONFIG_FILE).unwrap();
    assert_eq!(std::fs::read_to_string(&kubeconfig).unwrap(), KUBECONFIG);
    assert_eq!(folder.load_string("output").unwrap(), HEALTH_CHECK_OUTPUT);

    let runs = agent.scenario().container().runs.lock().unwrap().clone();
    let (_, options) = &runs[0];
    assert_eq!(
        options.volumes,
        vec![VolumeMount::new(
            kubeconfig.canonicalize().unwrap(),
            "/home/boxboat/.kube/config"
        )]
    );
    assert_eq!(options.command, vec!["aks-hc", "check", "kubernetes"]);
}

#[tokio::test]
async fn teardown_destroys_what_arrange_created() {
    let calls_log = Calls::default();
    let (agent, _dir) = agent_with(
        config(),
        MockTerraform::new(calls_log.clone()),
        MockDocker::new(calls_log),
        StageGate::none(),
    );
    agent.run().await.unwrap();

    let provisioner = agent.scenario().provisioner();
    let applied = provisioner.applied.lock().unwrap().clone();
    let destroyed = provisioner.destroyed.lock().unwrap().clone();
    assert_eq!(applied, destroyed);

    let options = &applied[0];
    assert_eq!(options.terraform_dir, agent.folder().path());
    assert!(options.no_color);
    assert_eq!(options.vars["location"], "eastus");
    let cluster = options.vars["cluster_name"].as_str().unwrap();
    assert!(cluster.starts_with("aks-terratest-simple-cluster-"));
    let saved: TerraformOptions = agent
        .folder()
        .load_test_data(TERRAFORM_OPTIONS_FILE)
        .unwrap();
    assert_eq!(&saved, options);
}

#[tokio::test]
async fn resource_names_are_unique_per_run() {
    let calls_log = Calls::default();
    let scenario = SimpleCluster::new(
        config(),
        MockTerraform::new(calls_log.clone()),
        MockDocker::new(calls_log),
    );
    let dir = tempdir().unwrap();
    let folder = TempFolder::existing(dir.path());
    let a = scenario.terraform_options(&folder);
    let b = scenario.terraform_options(&folder);
    assert_ne!(a.vars["cluster_name"], b.vars["cluster_name"]);
    assert_ne!(a.vars["resource_group_name"], b.vars["resource_group_name"]);
}

#[tokio::test]
async fn failing_assertion() {
    let calls_log = Calls::default();
    let mut docker = MockDocker::new(calls_log.clone());
    docker.output = "All checks passed".to_string();
    let (agent, _dir) = agent_with(
        config(),
        MockTerraform::new(calls_log),
        docker,
        StageGate::none(),
    );
    assert_eq!(agent.run().await.unwrap(), Outcome::Fail);
    assert_eq!(destroy_count(&agent), 1);
}

#[tokio::test]
async fn equality_assertion() {
    let calls_log = Calls::default();
    let mut docker = MockDocker::new(calls_log.clone());
    docker.output = "Hello, World!".to_string();
    let config = SimpleClusterConfig {
        assertion: Assertion::Equals("Hello, World!".to_string()),
        ..config()
    };
    let (agent, _dir) = agent_with(
        config,
        MockTerraform::new(calls_log),
        docker,
        StageGate::none(),
    );
    assert_eq!(agent.run().await.unwrap(), Outcome::Pass);
}

#[tokio::test]
async fn act_failure_still_destroys_once() {
    let calls_log = Calls::default();
    let mut docker = MockDocker::new(calls_log.clone());
    docker.behavior = RunBehavior::Exit;
    let (agent, _dir) = agent_with(
        config(),
        MockTerraform::new(calls_log),
        docker,
        StageGate::none(),
    );
    let error = agent.run().await.unwrap_err();
    assert_eq!(error.stage, Stage::Act);
    assert!(!agent.folder().is_test_data_present("output.json"));
    assert_eq!(destroy_count(&agent), 1);
}

#[tokio::test]
async fn panic_in_act_still_destroys_once() {
    let calls_log = Calls::default();
    let mut docker = MockDocker::new(calls_log.clone());
    docker.behavior = RunBehavior::Panic;
    let (agent, _dir) = agent_with(
        config(),
        MockTerraform::new(calls_log),
        docker,
        StageGate::none(),
    );
    let result = AssertUnwindSafe(agent.run()).catch_unwind().await;
    assert!(result.is_err());
    assert_eq!(destroy_count(&agent), 1);
}

#[tokio::test]
async fn apply_failure_skips_act_but_destroys() {
    let calls_log = Calls::default();
    let mut terraform = MockTerraform::new(calls_log.clone());
    terraform.fail_apply = true;
    let (agent, _dir) = agent_with(
        config(),
        terraform,
        MockDocker::new(calls_log),
        StageGate::none(),
    );
    let error = agent.run().await.unwrap_err();
    assert_eq!(error.stage, Stage::Arrange);
    assert_eq!(calls(&agent), vec!["terraform apply", "terraform destroy"]);
}

#[tokio::test]
async fn empty_kubeconfig_fails_arrange() {
    let calls_log = Calls::default();
    let mut terraform = MockTerraform::new(calls_log.clone());
    terraform.kubeconfig = "  \n".to_string();
    let (agent, _dir) = agent_with(
        config(),
        terraform,
        MockDocker::new(calls_log),
        StageGate::none(),
    );
    let error = agent.run().await.unwrap_err();
    assert_eq!(error.stage, Stage::Arrange);
    assert!(matches!(
        error.source,
        aks_agents::Error::EmptyKubeconfig { .. }
    ));
    assert!(!agent.folder().is_test_data_present(KUBECONFIG_FILE));
    assert_eq!(destroy_count(&agent), 1);
}

#[tokio::test]
async fn kubeconfig_write_failure_fails_arrange() {
    let calls_log = Calls::default();
    let (agent, _dir) = agent_with(
        config(),
        MockTerraform::new(calls_log.clone()),
        MockDocker::new(calls_log),
        StageGate::none(),
    );
    // A directory where the kubeconfig belongs cannot be written as a file.
    std::fs::create_dir_all(agent.folder().test_data_path(KUBECONFIG_FILE)).unwrap();

    let error = agent.run().await.unwrap_err();
    assert_eq!(error.stage, Stage::Arrange);
    assert!(matches!(
        error.source,
        aks_agents::Error::WriteKubeconfig { .. }
    ));
    assert_eq!(
        calls(&agent),
        vec![
            "terraform apply",
            "terraform output kube_config",
            "terraform destroy",
        ]
    );
    assert_eq!(destroy_count(&agent), 1);
}

#[tokio::test]
async fn act_requires_kubeconfig() {
    let calls_log = Calls::default();
    let (agent, _dir) = agent_with(
        config(),
        MockTerraform::new(calls_log.clone()),
        MockDocker::new(calls_log),
        StageGate::none(),
    );
    let error = agent.run_stage(Stage::Act).await.unwrap_err();
    assert!(matches!(error.source, aks_agents::Error::TestData { .. }));
    assert!(calls(&agent).is_empty());
}

#[tokio::test]
async fn assert_replay_is_idempotent() {
    let calls_log = Calls::default();
    let mut docker = MockDocker::new(calls_log.clone());
    docker.output = "No findings".to_string();
    let (agent, _dir) = agent_with(
        config(),
        MockTerraform::new(calls_log),
        docker,
        StageGate::none().skip(Stage::Teardown),
    );
    assert_eq!(agent.run().await.unwrap(), Outcome::Fail);
    assert_eq!(destroy_count(&agent), 0);

    let first = agent.run_stage(Stage::Assert).await.unwrap();
    let second = agent.run_stage(Stage::Assert).await.unwrap();
    assert_eq!(first, Some(Outcome::Fail));
    assert_eq!(first, second);
}

#[tokio::test]
async fn replay_act_and_assert_without_arrange() {
    let calls_log = Calls::default();
    let (agent, _dir) = agent_with(
        config(),
        MockTerraform::new(calls_log.clone()),
        MockDocker::new(calls_log),
        StageGate::none().skip(Stage::Teardown),
    );
    agent.run().await.unwrap();

    let replay = StageGate::none()
        .skip(Stage::Arrange)
        .skip(Stage::Teardown);
    let folder = agent.folder().clone();
    let calls_log = Calls::default();
    let replay_agent = ScenarioAgent::with_gate(
        SimpleCluster::new(
            config(),
            MockTerraform::new(calls_log.clone()),
            MockDocker::new(calls_log.clone()),
        ),
        folder,
        replay,
    );
    assert_eq!(replay_agent.run().await.unwrap(), Outcome::Pass);
    assert_eq!(
        calls_log.lock().unwrap().clone(),
        vec![
            "docker build boxboat/aks-health-check:terratest",
            "docker run boxboat/aks-health-check:terratest",
        ]
    );
}
