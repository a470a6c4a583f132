pub mod completions;
pub mod inspect;
pub mod man_pages;
pub mod normalize;
pub mod plan;
pub mod validate;

use std::path::Path;
use tenk_manifest::{parse_puppetfile_file, ParseOptions, Puppetfile, PuppetfileError};

pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_FAILURE: u8 = 1;
pub const EXIT_MANIFEST_ERROR: u8 = 2;

pub fn json_pretty(value: &impl serde::Serialize) -> Result<String, String> {
    serde_json::to_string_pretty(value).map_err(|e| format!("JSON serialization failed: {e}"))
}

/// The fatal-diagnostic reporter: every manifest violation funnels through
/// here, with the fixed `Error:` marker, and maps to the manifest exit code.
pub fn report_fatal(err: &PuppetfileError) -> u8 {
    eprintln!("Error: {err}");
    EXIT_MANIFEST_ERROR
}

/// Parse a Puppetfile, separating I/O failures (generic error path) from
/// manifest violations (reported fatally with [`report_fatal`]).
pub fn load_manifest(
    path: &Path,
    options: &ParseOptions,
) -> Result<Result<Puppetfile, u8>, String> {
    match parse_puppetfile_file(path, options) {
        Ok(manifest) => Ok(Ok(manifest)),
        Err(err @ PuppetfileError::Io { .. }) => Err(err.to_string()),
        Err(err) => Ok(Err(report_fatal(&err))),
    }
}

pub fn colorize_kind(kind: &str) -> String {
    use console::Style;
    match kind {
        "git" => Style::new().cyan().apply_to(kind).to_string(),
        "forge" => Style::new().green().apply_to(kind).to_string(),
        "local" => Style::new().yellow().apply_to(kind).to_string(),
        other => other.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_pretty_serializes_string() {
        let val = serde_json::json!({"key": "value"});
        let result = json_pretty(&val).unwrap();
        assert!(result.contains("\"key\""));
        assert!(result.contains("\"value\""));
    }

    #[test]
    fn colorize_kind_git() {
        assert!(colorize_kind("git").contains("git"));
    }

    #[test]
    fn colorize_kind_forge() {
        assert!(colorize_kind("forge").contains("forge"));
    }

    #[test]
    fn colorize_kind_unknown_passthrough() {
        assert_eq!(colorize_kind("other"), "other");
    }

    #[test]
    fn exit_codes_are_distinct() {
        assert_ne!(EXIT_SUCCESS, EXIT_FAILURE);
        assert_ne!(EXIT_FAILURE, EXIT_MANIFEST_ERROR);
    }

    #[test]
    fn load_manifest_io_error_is_generic() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_manifest(&dir.path().join("missing"), &ParseOptions::default());
        assert!(result.is_err());
    }

    #[test]
    fn load_manifest_violation_reports_manifest_exit_code() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Puppetfile");
        std::fs::write(&path, "nonsense statement\n").unwrap();
        let outcome = load_manifest(&path, &ParseOptions::default()).unwrap();
        assert_eq!(outcome.unwrap_err(), EXIT_MANIFEST_ERROR);
    }

    #[test]
    fn load_manifest_parses_valid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Puppetfile");
        std::fs::write(&path, "mod 'puppetlabs/ntp', '6.0.0'\n").unwrap();
        let manifest = load_manifest(&path, &ParseOptions::default())
            .unwrap()
            .unwrap();
        assert_eq!(manifest.module_count(), 1);
    }
}
