use log::LevelFilter;

pub const DEFAULT_AGENT_LEVEL_FILTER: LevelFilter = LevelFilter::Info;

/// The crates, besides the binary itself, whose logs are shown at the requested level.
pub const WORKSPACE_CRATES: &[&str] = &[
    "agent_utils",
    "aks_agents",
    "scenario_agent",
    "scenario_model",
];
