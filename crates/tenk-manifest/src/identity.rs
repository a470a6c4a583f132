//! Deterministic manifest identity.
//!
//! The identity is a blake3 hash over the canonical statement stream, so two
//! Puppetfiles that differ only in comments, blank lines, or statement
//! splitting share an id. Downstream deploy stages compare ids to skip
//! environments whose manifest has not changed.

use crate::normalize::NormalizedSource;
use crate::types::{ManifestId, ShortId};
use serde::Serialize;

/// Identity of one manifest, derived from its canonical content.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ManifestIdentity {
    pub manifest_id: ManifestId,
    pub short_id: ShortId,
}

/// Compute the identity of a normalized manifest.
pub fn compute_manifest_id(source: &NormalizedSource) -> ManifestIdentity {
    let mut hasher = blake3::Hasher::new();
    for line in &source.lines {
        hasher.update(line.text.as_bytes());
        hasher.update(b"\n");
    }

    let hex = hasher.finalize().to_hex().to_string();
    let short = hex[..12].to_owned();

    ManifestIdentity {
        manifest_id: ManifestId::new(hex),
        short_id: ShortId::new(short),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize_str;

    #[test]
    fn comments_and_splitting_do_not_change_identity() {
        let a = normalize_str(
            "mod 'sensu',:git => 'https://github.com/sensu/sensu-puppet.git',:branch => 'master'\n",
        );
        let b = normalize_str(
            "# sensu from upstream\n\nmod 'sensu',\n  :git => 'https://github.com/sensu/sensu-puppet.git',\n  :branch => 'master'\n",
        );
        assert_eq!(compute_manifest_id(&a), compute_manifest_id(&b));
    }

    #[test]
    fn different_content_produces_different_identity() {
        let a = normalize_str("mod 'puppetlabs/ntp', '6.0.0'\n");
        let b = normalize_str("mod 'puppetlabs/ntp', '6.0.1'\n");
        assert_ne!(compute_manifest_id(&a), compute_manifest_id(&b));
    }

    #[test]
    fn statement_boundaries_are_hashed() {
        use crate::normalize::{CanonicalLine, NormalizedSource};
        // The same bytes split differently across statements must not collide.
        let line = |n: usize, text: &str| CanonicalLine {
            source_line: n,
            text: text.to_owned(),
        };
        let a = NormalizedSource {
            lines: vec![line(1, "moduledir 'ab'"), line(2, "moduledir 'c'")],
        };
        let b = NormalizedSource {
            lines: vec![line(1, "moduledir 'a"), line(2, "b'moduledir 'c'")],
        };
        assert_ne!(compute_manifest_id(&a), compute_manifest_id(&b));
    }

    #[test]
    fn short_id_is_12_char_prefix() {
        let id = compute_manifest_id(&normalize_str("mod 'puppetlabs/ntp'\n"));
        assert_eq!(id.short_id.as_str().len(), 12);
        assert!(id.manifest_id.as_str().starts_with(id.short_id.as_str()));
        assert_eq!(id.manifest_id.as_str().len(), 64);
    }

    #[test]
    fn identity_is_stable_across_invocations() {
        let source = normalize_str("forge.cacheTtl 50m\nmod 'puppetlabs/ntp'\n");
        let first = compute_manifest_id(&source);
        for _ in 0..10 {
            assert_eq!(compute_manifest_id(&source), first);
        }
    }
}
