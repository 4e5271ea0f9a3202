use serde::{Deserialize, Serialize};

/// The verdict of a scenario run.
#[derive(Serialize, Deserialize, Debug, Eq, PartialEq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Pass,
    Fail,
    /// The assert stage was skipped so no verdict was reached.
    Skipped,
}

impl Outcome {
    /// Returns `true` unless the outcome is `Fail`.
    pub fn is_success(&self) -> bool {
        !matches!(self, Outcome::Fail)
    }
}

serde_plain::derive_display_from_serialize!(Outcome);
