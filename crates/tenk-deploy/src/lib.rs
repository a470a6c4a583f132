//! Deployment boundary for tenk environments.
//!
//! This crate sits between the manifest layer and whatever performs the
//! actual fetching: it loads the caller-side deployment configuration
//! (`DeployConfig`) that feeds `ParseOptions`, and projects a parsed
//! `Puppetfile` into a deterministic, ordered [`FetchPlan`]. It performs no
//! network I/O, no checksum verification, and no scheduling; those belong
//! to the fetch collaborators consuming the plan.

pub mod config;
pub mod plan;

pub use config::DeployConfig;
pub use plan::{AuthMode, FetchPlan, FetchTask, TaskAction, DEFAULT_FORGE_BASE_URL};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DeployError {
    #[error("deploy config I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("deploy config parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("deploy config serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("deploy config error: {0}")]
    Config(String),
}
