use crate::constants::SKIP_ENV_PREFIX;
use serde::{Deserialize, Serialize};

/// One of the four phases of a scenario. Stages run in the order they are declared here.
#[derive(Serialize, Deserialize, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Arrange,
    Act,
    Assert,
    Teardown,
}

impl Stage {
    pub const ALL: [Stage; 4] = [Stage::Arrange, Stage::Act, Stage::Assert, Stage::Teardown];

    /// The environment variable that, when set to a non-empty value, skips this stage, e.g.
    /// `SKIP_teardown`.
    pub fn skip_env_var(&self) -> String {
        format!("{}{}", SKIP_ENV_PREFIX, self)
    }
}

serde_plain::derive_display_from_serialize!(Stage);
serde_plain::derive_fromstr_from_deserialize!(Stage);
