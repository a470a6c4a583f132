//! Puppetfile parsing, normalization, validation, and manifest identity for tenk.
//!
//! This crate defines the manifest layer: text normalization into canonical
//! statements (`NormalizedSource`), statement tokenizing (`Statement`), the
//! module builder and conflict validator (`GitModule`/`ForgeModule`), the
//! assembled manifest (`Puppetfile`), and deterministic manifest identity
//! computation (`compute_manifest_id`). Parsing is a pure function: it either
//! returns a fully validated manifest or the first violation as a typed
//! error; it never prints or terminates the process.

pub mod duration;
pub mod identity;
pub mod module;
pub mod normalize;
pub mod puppetfile;
pub mod statement;
pub mod types;

pub use duration::{parse_duration, DurationError};
pub use identity::{compute_manifest_id, ManifestIdentity};
pub use module::{module_key, ForgeModule, GitModule, GitReference, VersionSpec};
pub use normalize::{normalize_str, CanonicalLine, NormalizedSource};
pub use puppetfile::{
    parse_puppetfile_file, parse_puppetfile_str, ParseOptions, Puppetfile, PuppetfileError,
    SourceKind,
};
pub use statement::{tokenize, AttrValue, RawAttribute, Statement};
pub use types::{ManifestId, ModuleName, ShortId};
