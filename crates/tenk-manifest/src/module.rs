//! Git and Forge module entries and the module builder.
//!
//! The builder interprets a tokenized `mod` statement into exactly one entry
//! kind, applying attribute typing, mutual-exclusion rules, and SSH-agent
//! inference. Cross-module identity checks live in the assembler; everything
//! here is scoped to a single declaration.

use crate::duration::parse_duration;
use crate::normalize::CanonicalLine;
use crate::puppetfile::{ParseOptions, PuppetfileError, SourceKind};
use crate::statement::{AttrValue, RawAttribute};
use crate::types::ModuleName;
use serde::Serialize;
use std::time::Duration;

/// The single version-control reference a Git module may pin.
///
/// Holding the reference as one enum value makes the branch/tag/commit/ref
/// exclusivity invariant unrepresentable rather than merely checked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GitReference {
    Branch(String),
    Tag(String),
    Commit(String),
    Ref(String),
}

impl GitReference {
    /// The attribute spelling, for diagnostics.
    pub fn attribute(&self) -> &'static str {
        match self {
            Self::Branch(_) => ":branch",
            Self::Tag(_) => ":tag",
            Self::Commit(_) => ":commit",
            Self::Ref(_) => ":ref",
        }
    }

    /// The referenced name (branch name, tag, commit id, or ref).
    pub fn name(&self) -> &str {
        match self {
            Self::Branch(s) | Self::Tag(s) | Self::Commit(s) | Self::Ref(s) => s,
        }
    }
}

/// A module sourced from a version-control repository (or local disk).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GitModule {
    /// Repository URL; `None` for purely local modules.
    pub git: Option<String>,
    /// Per-module private key, overriding the manifest default.
    pub private_key: Option<String>,
    /// At most one of branch/tag/commit/ref.
    pub reference: Option<GitReference>,
    /// Resolved tree path, filled by the fetch layer.
    pub tree: Option<String>,
    /// Link the module into the deprecated flat layout.
    pub link: bool,
    /// Tolerate an unreachable remote at fetch time.
    pub ignore_unreachable: bool,
    /// Ordered alternate refs tried when the primary reference is missing.
    pub fallback: Vec<String>,
    /// Per-module install path override.
    pub install_path: Option<String>,
    /// Module is referenced from local disk, not fetched.
    pub local: bool,
    /// Module directory active at declaration time.
    pub module_dir: Option<String>,
    /// Authenticate through an already-running SSH agent.
    pub use_ssh_agent: bool,
}

/// Version policy of a Forge module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VersionSpec {
    /// Pin to an exact released version.
    Exact(String),
    /// Always refetch the newest release.
    Latest,
    /// Accept whatever is already installed.
    Present,
}

impl VersionSpec {
    pub fn from_literal(literal: &str) -> Self {
        match literal {
            "latest" => Self::Latest,
            "present" => Self::Present,
            other => Self::Exact(other.to_owned()),
        }
    }

    pub fn is_exact(&self) -> bool {
        matches!(self, Self::Exact(_))
    }
}

impl std::fmt::Display for VersionSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Exact(v) => f.write_str(v),
            Self::Latest => f.write_str("latest"),
            Self::Present => f.write_str("present"),
        }
    }
}

/// A module sourced from a Forge-style artifact repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ForgeModule {
    pub author: String,
    pub name: String,
    pub version: VersionSpec,
    /// MD5 checksum as reported by the repository metadata (fetch time).
    pub md5sum: Option<String>,
    /// Explicit SHA-256 integrity pin from the Puppetfile.
    pub sha256sum: Option<String>,
    /// Expected archive byte size (fetch time).
    pub file_size: Option<u64>,
    /// Per-module base-URL override.
    pub base_url: Option<String>,
    /// Per-module cache TTL override.
    pub cache_ttl: Option<Duration>,
    /// Module directory active at declaration time.
    pub module_dir: Option<String>,
}

/// Split `author/name` (first slash) or `author-name` (last dash).
pub(crate) fn split_module_name(raw: &str) -> (Option<&str>, &str) {
    if let Some((author, name)) = raw.split_once('/') {
        (Some(author), name)
    } else if let Some((author, name)) = raw.rsplit_once('-') {
        (Some(author), name)
    } else {
        (None, raw)
    }
}

/// The manifest key: the final name segment of either notation.
pub fn module_key(raw: &str) -> ModuleName {
    ModuleName::new(split_module_name(raw).1)
}

/// Which map a declaration belongs to, decided before full validation.
pub(crate) fn statement_kind(attributes: &[RawAttribute]) -> SourceKind {
    if attributes
        .iter()
        .any(|a| a.key == "git" || a.key == "local")
    {
        SourceKind::Git
    } else {
        SourceKind::Forge
    }
}

/// Per-declaration context threaded through the builders.
pub(crate) struct BuildContext<'a> {
    pub file: &'a str,
    pub line: &'a CanonicalLine,
    pub options: &'a ParseOptions,
    pub active_module_dir: Option<&'a str>,
}

impl BuildContext<'_> {
    fn file(&self) -> String {
        self.file.to_owned()
    }

    fn line(&self) -> String {
        self.line.text.clone()
    }
}

const GIT_ONLY_ATTRIBUTES: &[&str] = &[
    "git",
    "local",
    "branch",
    "tag",
    "commit",
    "ref",
    "link",
    "ignore_unreachable",
    "fallback",
    "install_path",
    "private_key",
    "use_ssh_agent",
];

fn check_duplicate_attributes(
    attributes: &[RawAttribute],
    key: &ModuleName,
    ctx: &BuildContext<'_>,
) -> Result<(), PuppetfileError> {
    for (idx, attr) in attributes.iter().enumerate() {
        if attributes[..idx].iter().any(|prev| prev.key == attr.key) {
            return Err(PuppetfileError::DuplicateAttribute {
                attribute: attr.key.clone(),
                module: key.clone(),
                file: ctx.file(),
                line: ctx.line(),
            });
        }
    }
    Ok(())
}

fn expect_str<'v>(
    attr: &'v RawAttribute,
    key: &ModuleName,
    ctx: &BuildContext<'_>,
) -> Result<&'v str, PuppetfileError> {
    match &attr.value {
        AttrValue::Str(s) => Ok(s),
        _ => Err(PuppetfileError::MalformedStatement {
            reason: format!(
                "attribute :{} expects a quoted string for module {key}",
                attr.key
            ),
            file: ctx.file(),
            line: ctx.line(),
        }),
    }
}

fn expect_bool(
    attr: &RawAttribute,
    key: &ModuleName,
    ctx: &BuildContext<'_>,
) -> Result<bool, PuppetfileError> {
    match attr.value {
        AttrValue::Bool(b) => Ok(b),
        _ => Err(PuppetfileError::MalformedStatement {
            reason: format!("attribute :{} expects true or false for module {key}", attr.key),
            file: ctx.file(),
            line: ctx.line(),
        }),
    }
}

/// Build a Git module entry from its declaration.
pub(crate) fn build_git_module(
    key: &ModuleName,
    version: Option<&str>,
    attributes: &[RawAttribute],
    ctx: &BuildContext<'_>,
) -> Result<GitModule, PuppetfileError> {
    if version.is_some() {
        return Err(PuppetfileError::MalformedStatement {
            reason: format!("version literal not allowed with :git/:local for module {key}"),
            file: ctx.file(),
            line: ctx.line(),
        });
    }
    check_duplicate_attributes(attributes, key, ctx)?;

    let mut module = GitModule::default();
    let mut explicit_agent = None;

    for attr in attributes {
        match attr.key.as_str() {
            "git" => module.git = Some(expect_str(attr, key, ctx)?.to_owned()),
            "local" => module.local = expect_bool(attr, key, ctx)?,
            "branch" => {
                let branch = resolve_branch(attr, key, ctx)?;
                set_reference(&mut module, GitReference::Branch(branch), key, ctx)?;
            }
            "tag" => {
                let tag = expect_str(attr, key, ctx)?.to_owned();
                set_reference(&mut module, GitReference::Tag(tag), key, ctx)?;
            }
            "commit" => {
                let commit = expect_str(attr, key, ctx)?.to_owned();
                set_reference(&mut module, GitReference::Commit(commit), key, ctx)?;
            }
            "ref" => {
                let r = expect_str(attr, key, ctx)?.to_owned();
                set_reference(&mut module, GitReference::Ref(r), key, ctx)?;
            }
            "link" => module.link = expect_bool(attr, key, ctx)?,
            "ignore_unreachable" => module.ignore_unreachable = expect_bool(attr, key, ctx)?,
            "fallback" => {
                module.fallback = expect_str(attr, key, ctx)?
                    .split('|')
                    .map(|s| s.trim().to_owned())
                    .filter(|s| !s.is_empty())
                    .collect();
            }
            "install_path" => module.install_path = Some(expect_str(attr, key, ctx)?.to_owned()),
            "private_key" => module.private_key = Some(expect_str(attr, key, ctx)?.to_owned()),
            "use_ssh_agent" => explicit_agent = Some(expect_bool(attr, key, ctx)?),
            "sha256sum" | "baseurl" | "cache_ttl" => {
                return Err(PuppetfileError::UnsupportedAttribute {
                    attribute: attr.key.clone(),
                    kind: SourceKind::Git,
                    module: key.clone(),
                    file: ctx.file(),
                    line: ctx.line(),
                })
            }
            _ => {
                return Err(PuppetfileError::UnknownAttribute {
                    attribute: attr.key.clone(),
                    module: key.clone(),
                    file: ctx.file(),
                    line: ctx.line(),
                })
            }
        }
    }

    if module.link {
        if let Some(GitReference::Branch(_)) = module.reference {
            return Err(PuppetfileError::ConflictingAttributes {
                first: ":branch",
                second: ":link",
                module: key.clone(),
                file: ctx.file(),
                line: ctx.line(),
            });
        }
    }

    module.use_ssh_agent = match explicit_agent {
        Some(explicit) => explicit,
        None => {
            ctx.options.infer_ssh_agent
                && module.private_key.is_none()
                && ctx.options.default_private_key.is_none()
                && module.git.as_deref().is_some_and(is_ssh_url)
        }
    };
    module.module_dir = ctx.active_module_dir.map(ToOwned::to_owned);

    Ok(module)
}

fn resolve_branch(
    attr: &RawAttribute,
    key: &ModuleName,
    ctx: &BuildContext<'_>,
) -> Result<String, PuppetfileError> {
    match &attr.value {
        AttrValue::Str(s) => Ok(s.clone()),
        AttrValue::ControlBranch => {
            ctx.options
                .control_repo_branch
                .clone()
                .ok_or_else(|| PuppetfileError::MalformedStatement {
                    reason: format!(
                        "no control-repo branch available for :control_branch on module {key}"
                    ),
                    file: ctx.file(),
                    line: ctx.line(),
                })
        }
        AttrValue::Bool(_) => expect_str(attr, key, ctx).map(ToOwned::to_owned),
    }
}

fn set_reference(
    module: &mut GitModule,
    reference: GitReference,
    key: &ModuleName,
    ctx: &BuildContext<'_>,
) -> Result<(), PuppetfileError> {
    if let Some(existing) = &module.reference {
        return Err(PuppetfileError::ConflictingAttributes {
            first: existing.attribute(),
            second: reference.attribute(),
            module: key.clone(),
            file: ctx.file(),
            line: ctx.line(),
        });
    }
    module.reference = Some(reference);
    Ok(())
}

fn is_ssh_url(url: &str) -> bool {
    url.starts_with("git@") || url.starts_with("ssh://")
}

/// Build a Forge module entry from its declaration.
pub(crate) fn build_forge_module(
    raw_name: &str,
    key: &ModuleName,
    version: Option<&str>,
    attributes: &[RawAttribute],
    ctx: &BuildContext<'_>,
) -> Result<ForgeModule, PuppetfileError> {
    check_duplicate_attributes(attributes, key, ctx)?;

    // A declaration leaning on Git-only attributes without :git/:local is a
    // missing-source mistake, not an unknown attribute.
    if let Some(attr) = attributes
        .iter()
        .find(|a| GIT_ONLY_ATTRIBUTES.contains(&a.key.as_str()))
    {
        debug_assert!(attr.key != "git" && attr.key != "local");
        return Err(PuppetfileError::MissingSource {
            module: key.clone(),
            file: ctx.file(),
            line: ctx.line(),
        });
    }

    let (author, name) = split_module_name(raw_name);
    let Some(author) = author else {
        if version.is_none() && attributes.is_empty() {
            return Err(PuppetfileError::MissingSource {
                module: key.clone(),
                file: ctx.file(),
                line: ctx.line(),
            });
        }
        return Err(PuppetfileError::InvalidForgeName {
            name: raw_name.to_owned(),
            file: ctx.file(),
            line: ctx.line(),
        });
    };

    let version = version.map_or(VersionSpec::Present, VersionSpec::from_literal);
    if ctx.options.force_exact_versions && !version.is_exact() {
        return Err(PuppetfileError::NonExactVersion {
            module: key.clone(),
            version: version.to_string(),
            file: ctx.file(),
            line: ctx.line(),
        });
    }

    let mut module = ForgeModule {
        author: author.to_owned(),
        name: name.to_owned(),
        version,
        md5sum: None,
        sha256sum: None,
        file_size: None,
        base_url: None,
        cache_ttl: None,
        module_dir: ctx.active_module_dir.map(ToOwned::to_owned),
    };

    for attr in attributes {
        match attr.key.as_str() {
            "sha256sum" => module.sha256sum = Some(expect_str(attr, key, ctx)?.to_owned()),
            "baseurl" => module.base_url = Some(expect_str(attr, key, ctx)?.to_owned()),
            "cache_ttl" => {
                let literal = expect_str(attr, key, ctx)?;
                let ttl = parse_duration(literal).map_err(|_| {
                    PuppetfileError::InvalidDuration {
                        value: literal.to_owned(),
                        parameter: ":cache_ttl",
                        file: ctx.file(),
                        line: ctx.line(),
                    }
                })?;
                module.cache_ttl = Some(ttl);
            }
            _ => {
                return Err(PuppetfileError::UnknownAttribute {
                    attribute: attr.key.clone(),
                    module: key.clone(),
                    file: ctx.file(),
                    line: ctx.line(),
                })
            }
        }
    }

    Ok(module)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_slash_notation_at_first_slash() {
        assert_eq!(split_module_name("puppetlabs/ntp"), (Some("puppetlabs"), "ntp"));
    }

    #[test]
    fn splits_dash_notation_at_last_dash() {
        assert_eq!(split_module_name("mayflower-php"), (Some("mayflower"), "php"));
        assert_eq!(
            split_module_name("puppet-module-puppetboard"),
            (Some("puppet-module"), "puppetboard")
        );
    }

    #[test]
    fn plain_name_has_no_author() {
        assert_eq!(split_module_name("example_module"), (None, "example_module"));
    }

    #[test]
    fn module_key_uses_name_segment() {
        assert_eq!(module_key("puppetlabs/ntp"), "ntp");
        assert_eq!(module_key("puppetlabs-ntp"), "ntp");
        assert_eq!(module_key("sensu"), "sensu");
    }

    #[test]
    fn version_spec_from_literal() {
        assert_eq!(VersionSpec::from_literal("latest"), VersionSpec::Latest);
        assert_eq!(VersionSpec::from_literal("present"), VersionSpec::Present);
        assert_eq!(
            VersionSpec::from_literal("4.0.0-beta1"),
            VersionSpec::Exact("4.0.0-beta1".to_owned())
        );
        assert!(VersionSpec::from_literal("1.2.3").is_exact());
        assert!(!VersionSpec::Latest.is_exact());
    }

    #[test]
    fn git_reference_attribute_names() {
        assert_eq!(GitReference::Branch("x".to_owned()).attribute(), ":branch");
        assert_eq!(GitReference::Tag("x".to_owned()).attribute(), ":tag");
        assert_eq!(GitReference::Commit("x".to_owned()).attribute(), ":commit");
        assert_eq!(GitReference::Ref("x".to_owned()).attribute(), ":ref");
        assert_eq!(GitReference::Ref("2.7.1".to_owned()).name(), "2.7.1");
    }

    #[test]
    fn ssh_url_detection() {
        assert!(is_ssh_url("git@somehost.com/foo/example-module.git"));
        assert!(is_ssh_url("ssh://git@example.com/repo.git"));
        assert!(!is_ssh_url("https://github.com/sensu/sensu-puppet.git"));
    }
}
