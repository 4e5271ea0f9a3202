use log::info;
use scenario_model::constants::SKIP_ENV_PREFIX;
use scenario_model::Stage;
use std::collections::BTreeSet;

/// Decides which stages are skipped. Setting `SKIP_<stage>` (e.g. `SKIP_teardown=true`) to any
/// non-empty value skips that stage, which lets you keep a cluster around and re-run `act` and
/// `assert` against it while iterating.
///
/// Any variable starting with `SKIP_` is taken as a sign that stages are being run piecemeal,
/// even one that names no stage or has an empty value. See [`StageGate::any_skipped`].
#[derive(Debug, Default, Clone, Eq, PartialEq)]
pub struct StageGate {
    skipped: BTreeSet<Stage>,
    skip_var_set: bool,
}

impl StageGate {
    /// A gate that skips nothing.
    pub fn none() -> Self {
        Self::default()
    }

    /// Read the `SKIP_<stage>` environment variables.
    pub fn from_env() -> Self {
        Self::from_vars(std::env::vars())
    }

    /// Build a gate from `(name, value)` pairs as returned by `std::env::vars`.
    pub fn from_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let vars: Vec<(K, V)> = vars.into_iter().collect();
        let skipped = Stage::ALL
            .iter()
            .filter(|stage| {
                let name = stage.skip_env_var();
                vars.iter()
                    .any(|(k, v)| k.as_ref() == name && !v.as_ref().is_empty())
            })
            .copied()
            .collect();
        let skip_var_set = vars
            .iter()
            .any(|(k, _)| k.as_ref().starts_with(SKIP_ENV_PREFIX));
        Self {
            skipped,
            skip_var_set,
        }
    }

    /// Skip `stage` in addition to whatever is already skipped.
    pub fn skip(mut self, stage: Stage) -> Self {
        self.skipped.insert(stage);
        self
    }

    pub fn is_skipped(&self, stage: Stage) -> bool {
        self.skipped.contains(&stage)
    }

    /// Returns `true` if any stage is skipped or any `SKIP_` variable is set. Skipping implies
    /// that data is being cached between invocations, so callers should work in the original
    /// folder instead of a fresh copy.
    pub fn any_skipped(&self) -> bool {
        self.skip_var_set || !self.skipped.is_empty()
    }

    /// Returns `true` and logs if `stage` should run.
    pub(crate) fn should_run(&self, stage: Stage) -> bool {
        if self.is_skipped(stage) {
            info!(
                "The '{}' environment variable is set, so skipping stage '{}'.",
                stage.skip_env_var(),
                stage
            );
            false
        } else {
            info!("Running stage '{}'.", stage);
            true
        }
    }
}
