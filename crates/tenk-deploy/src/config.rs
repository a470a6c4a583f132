use crate::DeployError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tenk_manifest::ParseOptions;

/// Caller-side deployment settings feeding the parser's `ParseOptions`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct DeployConfig {
    pub source: String,
    pub source_branch: String,
    pub control_repo_branch: Option<String>,
    pub private_key: Option<String>,
    pub work_dir: Option<String>,
    pub target_dir: Option<String>,
    pub force_exact_versions: bool,
    pub infer_ssh_agent: bool,
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            source: String::new(),
            source_branch: String::new(),
            control_repo_branch: None,
            private_key: None,
            work_dir: None,
            target_dir: None,
            force_exact_versions: false,
            infer_ssh_agent: true,
        }
    }
}

impl DeployConfig {
    /// Load config from `~/.config/tenk/config.toml`.
    pub fn load_default() -> Result<Self, DeployError> {
        let path = default_config_path()?;
        Self::load(&path)
    }

    pub fn load(path: &Path) -> Result<Self, DeployError> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    pub fn save(&self, path: &Path) -> Result<(), DeployError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Translate into the parser's options.
    pub fn to_parse_options(&self) -> ParseOptions {
        ParseOptions {
            source: self.source.clone(),
            source_branch: self.source_branch.clone(),
            control_repo_branch: self.control_repo_branch.clone(),
            default_private_key: self.private_key.clone(),
            work_dir: self.work_dir.clone(),
            target_dir: self.target_dir.clone(),
            force_exact_versions: self.force_exact_versions,
            infer_ssh_agent: self.infer_ssh_agent,
        }
    }
}

pub fn default_config_path() -> Result<PathBuf, DeployError> {
    let home = std::env::var("HOME").map_err(|_| DeployError::Config("HOME not set".to_owned()))?;
    Ok(PathBuf::from(home).join(".config/tenk/config.toml"))
}
