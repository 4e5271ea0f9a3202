/*!

This library provides the plain data types shared by scenario agents and the `aks-testsys` CLI:
scenario stages, outcomes, output assertions and the options passed to container tools.

!*/

#![deny(
    clippy::expect_used,
    clippy::get_unwrap,
    clippy::panic,
    clippy::panic_in_result_fn,
    clippy::panicking_unwrap,
    clippy::unwrap_in_result,
    clippy::unwrap_used
)]

pub use assertion::Assertion;
pub use configuration::Configuration;
pub use container::{BuildOptions, RunOptions, VolumeMount};
pub use outcome::Outcome;
pub use stage::Stage;
pub use unique_id::{unique_id, UNIQUE_ID_LEN};

mod assertion;
mod configuration;
pub mod constants;
mod container;
mod outcome;
mod stage;
mod unique_id;
