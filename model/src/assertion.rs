use crate::Outcome;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// The condition checked against a scenario's captured output. The output is opaque; only
/// containment and exact equality are supported.
///
/// In YAML this is written as `contains: DEV-1` or `equals: "Hello, World!"`.
#[derive(Serialize, Deserialize, Debug, Eq, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub enum Assertion {
    /// The output must contain the string.
    Contains(String),
    /// The output must be exactly the string.
    Equals(String),
}

impl Assertion {
    pub fn evaluate(&self, output: &str) -> Outcome {
        let passed = match self {
            Assertion::Contains(expected) => output.contains(expected.as_str()),
            Assertion::Equals(expected) => output == expected,
        };
        if passed {
            Outcome::Pass
        } else {
            Outcome::Fail
        }
    }
}

impl Display for Assertion {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Assertion::Contains(expected) => write!(f, "output contains '{}'", expected),
            Assertion::Equals(expected) => write!(f, "output equals '{}'", expected),
        }
    }
}
