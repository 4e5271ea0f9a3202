/*!

`aks-agents` contains the pieces used to test an AKS cluster end to end: the [`Terraform`]
provisioning tool, the [`Docker`] container tool and the [`SimpleCluster`] scenario that ties them
together.

!*/

pub mod config;
pub mod constants;
pub mod docker;
pub mod error;
pub mod settings;
pub mod simple_cluster;
pub mod terraform;

pub use config::SimpleClusterConfig;
pub use docker::Docker;
pub use error::{Error, Result};
pub use settings::Settings;
pub use simple_cluster::SimpleCluster;
pub use terraform::{Terraform, TerraformOptions};
