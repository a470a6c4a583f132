//! Puppetfile model, assembler, and diagnostics.
//!
//! `parse_puppetfile_str` is a pure function from manifest text to either a
//! fully validated [`Puppetfile`] or the first [`PuppetfileError`]
//! encountered. No partial manifest is ever returned and nothing here prints
//! or exits; the caller decides how to surface the diagnostic.

use crate::module::{
    build_forge_module, build_git_module, module_key, statement_kind, BuildContext, ForgeModule,
    GitModule,
};
use crate::normalize::normalize_str;
use crate::statement::{tokenize, Statement};
use crate::types::ModuleName;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Which namespace a module was declared in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Git,
    Forge,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Git => f.write_str("Git"),
            Self::Forge => f.write_str("Forge"),
        }
    }
}

#[derive(Debug, Error)]
pub enum PuppetfileError {
    #[error("can not read Puppetfile {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("unrecognized statement in {file} line: {line}")]
    UnrecognizedStatement { file: String, line: String },
    #[error("malformed statement ({reason}) in {file} line: {line}")]
    MalformedStatement {
        reason: String,
        file: String,
        line: String,
    },
    #[error("duplicate attribute :{attribute} for module {module} in {file} line: {line}")]
    DuplicateAttribute {
        attribute: String,
        module: ModuleName,
        file: String,
        line: String,
    },
    #[error(
        "found conflicting git attributes {first}, {second} for module {module} in {file} line: {line}"
    )]
    ConflictingAttributes {
        first: &'static str,
        second: &'static str,
        module: ModuleName,
        file: String,
        line: String,
    },
    #[error(
        "missing required source attribute (:git or :local) or version for module {module} in {file} line: {line}"
    )]
    MissingSource {
        module: ModuleName,
        file: String,
        line: String,
    },
    #[error("{kind} module with same name found in {file} for module {module} line: {line}")]
    DuplicateModule {
        kind: SourceKind,
        module: ModuleName,
        file: String,
        line: String,
    },
    #[error(
        "forge module name '{name}' must be '<author>/<name>' or '<author>-<name>' in {file} line: {line}"
    )]
    InvalidForgeName {
        name: String,
        file: String,
        line: String,
    },
    #[error(
        "can not convert value {value} of parameter {parameter} to a duration. Valid time units are 300ms, 1.5h or 2h45m. In {file} line: {line}"
    )]
    InvalidDuration {
        value: String,
        parameter: &'static str,
        file: String,
        line: String,
    },
    #[error(
        "exact version required for forge module {module}, got '{version}' in {file} line: {line}"
    )]
    NonExactVersion {
        module: ModuleName,
        version: String,
        file: String,
        line: String,
    },
    #[error("unknown module attribute :{attribute} for module {module} in {file} line: {line}")]
    UnknownAttribute {
        attribute: String,
        module: ModuleName,
        file: String,
        line: String,
    },
    #[error(
        "attribute :{attribute} is not valid for a {kind} module {module} in {file} line: {line}"
    )]
    UnsupportedAttribute {
        attribute: String,
        kind: SourceKind,
        module: ModuleName,
        file: String,
        line: String,
    },
}

/// Caller-supplied provenance and policy for one parse.
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Identifier of the control-repo source this Puppetfile belongs to.
    pub source: String,
    /// Branch of the source that was checked out.
    pub source_branch: String,
    /// Branch substituted for `:branch => :control_branch`.
    pub control_repo_branch: Option<String>,
    /// Default private key for Git modules without `:private_key`.
    pub default_private_key: Option<String>,
    /// Scratch directory for downstream fetch stages.
    pub work_dir: Option<String>,
    /// Environment directory modules are materialized into.
    pub target_dir: Option<String>,
    /// Reject `latest`/`present` Forge version sentinels.
    pub force_exact_versions: bool,
    /// Infer SSH-agent auth for keyless SSH-style URLs.
    pub infer_ssh_agent: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            source: String::new(),
            source_branch: String::new(),
            control_repo_branch: None,
            default_private_key: None,
            work_dir: None,
            target_dir: None,
            force_exact_versions: false,
            infer_ssh_agent: true,
        }
    }
}

/// The parsed, validated module manifest for one environment.
///
/// Immutable after parsing; the Git and Forge maps are disjoint in key space
/// and iterate in name order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Puppetfile {
    pub forge_base_url: Option<String>,
    pub forge_cache_ttl: Option<Duration>,
    pub git_modules: BTreeMap<ModuleName, GitModule>,
    pub forge_modules: BTreeMap<ModuleName, ForgeModule>,
    pub private_key: Option<String>,
    pub source: String,
    pub source_branch: String,
    pub control_repo_branch: Option<String>,
    pub work_dir: Option<String>,
    pub target_dir: Option<String>,
    /// Ordered `moduledir` overrides; duplicates are preserved.
    pub module_dirs: Vec<String>,
}

impl Puppetfile {
    pub fn module_count(&self) -> usize {
        self.git_modules.len() + self.forge_modules.len()
    }
}

/// Parse a Puppetfile from disk.
pub fn parse_puppetfile_file(
    path: impl AsRef<Path>,
    options: &ParseOptions,
) -> Result<Puppetfile, PuppetfileError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| PuppetfileError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_puppetfile_str(&content, &path.display().to_string(), options)
}

/// Parse Puppetfile text, labeling diagnostics with `file`.
pub fn parse_puppetfile_str(
    input: &str,
    file: &str,
    options: &ParseOptions,
) -> Result<Puppetfile, PuppetfileError> {
    let normalized = normalize_str(input);

    let mut manifest = Puppetfile {
        private_key: options.default_private_key.clone(),
        source: options.source.clone(),
        source_branch: options.source_branch.clone(),
        control_repo_branch: options.control_repo_branch.clone(),
        work_dir: options.work_dir.clone(),
        target_dir: options.target_dir.clone(),
        ..Puppetfile::default()
    };

    // One name→kind registry so same-kind and cross-kind duplicates share a
    // single detection path.
    let mut registry: BTreeMap<ModuleName, SourceKind> = BTreeMap::new();
    let mut active_module_dir: Option<String> = None;

    for line in &normalized.lines {
        match tokenize(line, file)? {
            Statement::ForgeBaseUrl(url) => manifest.forge_base_url = Some(url),
            Statement::ForgeCacheTtl(literal) => {
                let ttl = crate::duration::parse_duration(&literal).map_err(|_| {
                    PuppetfileError::InvalidDuration {
                        value: literal.clone(),
                        parameter: "forge.cacheTtl",
                        file: file.to_owned(),
                        line: line.text.clone(),
                    }
                })?;
                manifest.forge_cache_ttl = Some(ttl);
            }
            Statement::ModuleDir(dir) => {
                manifest.module_dirs.push(dir.clone());
                active_module_dir = Some(dir);
            }
            Statement::Module {
                name,
                version,
                attributes,
            } => {
                let key = module_key(&name);
                let kind = statement_kind(&attributes);
                if registry.contains_key(&key) {
                    return Err(PuppetfileError::DuplicateModule {
                        kind,
                        module: key,
                        file: file.to_owned(),
                        line: line.text.clone(),
                    });
                }

                let ctx = BuildContext {
                    file,
                    line,
                    options,
                    active_module_dir: active_module_dir.as_deref(),
                };
                match kind {
                    SourceKind::Git => {
                        let module =
                            build_git_module(&key, version.as_deref(), &attributes, &ctx)?;
                        registry.insert(key.clone(), kind);
                        manifest.git_modules.insert(key, module);
                    }
                    SourceKind::Forge => {
                        let module = build_forge_module(
                            &name,
                            &key,
                            version.as_deref(),
                            &attributes,
                            &ctx,
                        )?;
                        registry.insert(key.clone(), kind);
                        manifest.forge_modules.insert(key, module);
                    }
                }
            }
        }
    }

    debug!(
        git = manifest.git_modules.len(),
        forge = manifest.forge_modules.len(),
        "parsed {file}"
    );
    Ok(manifest)
}
