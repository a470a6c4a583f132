use serde::Serialize;
use std::time::Duration;
use tenk_manifest::{GitModule, GitReference, ModuleName, Puppetfile, VersionSpec};
use tracing::debug;

/// Default artifact repository queried when the manifest sets none.
pub const DEFAULT_FORGE_BASE_URL: &str = "https://forgeapi.puppet.com";

/// How a Git fetch should authenticate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthMode {
    /// No credentials beyond whatever the transport provides.
    Default,
    /// Explicit private key file.
    KeyFile(String),
    /// Delegate to an already-running SSH agent.
    Agent,
}

/// The work one module requires, with all manifest defaults resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum TaskAction {
    CloneGit {
        url: String,
        reference: Option<GitReference>,
        fallback: Vec<String>,
        auth: AuthMode,
        ignore_unreachable: bool,
    },
    /// Module lives on local disk; nothing to fetch.
    LinkLocal,
    FetchForge {
        /// `author-name` archive slug.
        slug: String,
        version: VersionSpec,
        base_url: String,
        cache_ttl: Option<Duration>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FetchTask {
    pub module: ModuleName,
    /// Directory the module is materialized into, relative to the
    /// environment root unless the manifest carries an absolute target.
    pub target_dir: String,
    pub action: TaskAction,
}

/// Deterministic, ordered projection of a parsed Puppetfile.
///
/// Git tasks come first, then Forge tasks, each sorted by module name. The
/// plan is read-only with respect to the manifest; executing it is the fetch
/// layer's concern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FetchPlan {
    pub source: String,
    pub tasks: Vec<FetchTask>,
}

impl FetchPlan {
    pub fn from_puppetfile(manifest: &Puppetfile) -> Self {
        let mut tasks = Vec::with_capacity(manifest.module_count());

        for (name, module) in &manifest.git_modules {
            let action = if module.local || module.git.is_none() {
                TaskAction::LinkLocal
            } else {
                TaskAction::CloneGit {
                    url: module.git.clone().unwrap_or_default(),
                    reference: module.reference.clone(),
                    fallback: module.fallback.clone(),
                    auth: auth_mode(module, manifest),
                    ignore_unreachable: module.ignore_unreachable,
                }
            };
            tasks.push(FetchTask {
                module: name.clone(),
                target_dir: target_dir(manifest, name, module.install_path.as_deref(), module.module_dir.as_deref()),
                action,
            });
        }

        for (name, module) in &manifest.forge_modules {
            let base_url = module
                .base_url
                .clone()
                .or_else(|| manifest.forge_base_url.clone())
                .unwrap_or_else(|| DEFAULT_FORGE_BASE_URL.to_owned());
            tasks.push(FetchTask {
                module: name.clone(),
                target_dir: target_dir(manifest, name, None, module.module_dir.as_deref()),
                action: TaskAction::FetchForge {
                    slug: format!("{}-{}", module.author, module.name),
                    version: module.version.clone(),
                    base_url,
                    cache_ttl: module.cache_ttl.or(manifest.forge_cache_ttl),
                },
            });
        }

        debug!(tasks = tasks.len(), "planned fetches for {}", manifest.source);
        Self {
            source: manifest.source.clone(),
            tasks,
        }
    }
}

fn auth_mode(module: &GitModule, manifest: &Puppetfile) -> AuthMode {
    if module.use_ssh_agent {
        return AuthMode::Agent;
    }
    match module.private_key.as_ref().or(manifest.private_key.as_ref()) {
        Some(key) => AuthMode::KeyFile(key.clone()),
        None => AuthMode::Default,
    }
}

fn target_dir(
    manifest: &Puppetfile,
    name: &ModuleName,
    install_path: Option<&str>,
    module_dir: Option<&str>,
) -> String {
    let base = install_path.or(module_dir).unwrap_or("modules");
    match manifest.target_dir.as_deref() {
        Some(root) => format!("{root}/{base}/{name}"),
        None => format!("{base}/{name}"),
    }
}
