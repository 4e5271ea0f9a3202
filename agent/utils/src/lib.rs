/*!

`agent-utils` is a collection of functions that may be used by scenario agents and the
`aks-testsys` CLI.
`process` runs external tools such as `terraform` and `docker` while streaming their output to the
log.

!*/

use constants::{DEFAULT_AGENT_LEVEL_FILTER, WORKSPACE_CRATES};
use env_logger::Builder;
pub use error::Error;
use log::LevelFilter;
pub use process::{run_command, CommandOutput};
use std::env;

pub mod constants;
mod error;
mod process;

/// Initialize `env_logger` for a binary. `RUST_LOG` is used as is when it is set. Otherwise see
/// [`default_filters`]; `log_level` defaults to `DEFAULT_AGENT_LEVEL_FILTER`.
pub fn init_agent_logger(bin_crate: &str, log_level: Option<LevelFilter>) {
    let filters = env::var(env_logger::DEFAULT_FILTER_ENV).unwrap_or_else(|_| {
        default_filters(bin_crate, log_level.unwrap_or(DEFAULT_AGENT_LEVEL_FILTER))
    });
    Builder::new().parse_filters(&filters).init();
}

/// An `env_logger` filter string that logs `bin_crate` and the workspace crates at `log_level`
/// and everything else, e.g. `hyper` or `tokio`, at `error`.
pub fn default_filters(bin_crate: &str, log_level: LevelFilter) -> String {
    let level = log_level.as_str().to_lowercase();
    std::iter::once(LevelFilter::Error.as_str().to_lowercase())
        .chain(
            std::iter::once(bin_crate)
                .chain(WORKSPACE_CRATES.iter().copied())
                .map(|name| format!("{}={}", name, level)),
        )
        .collect::<Vec<_>>()
        .join(",")
}

/// Implement `Display` as JSON for types that implement `Serialize`. The plain form is a single
/// line for log messages, the alternate form (`{:#}`) is pretty printed.
#[macro_export]
macro_rules! impl_display_as_json {
    ($i:ident) => {
        impl std::fmt::Display for $i {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                let json = if f.alternate() {
                    serde_json::to_string_pretty(self)
                } else {
                    serde_json::to_string(self)
                };
                let s = json.unwrap_or_else(|e| format!("Serialization failed: {}", e));
                f.write_str(&s)
            }
        }
    };
}
