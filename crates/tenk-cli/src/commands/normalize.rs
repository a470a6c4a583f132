use super::EXIT_SUCCESS;
use std::path::Path;
use tenk_manifest::normalize_str;

pub fn run(puppetfile: &Path) -> Result<u8, String> {
    let content = std::fs::read_to_string(puppetfile)
        .map_err(|e| format!("can not read Puppetfile {}: {e}", puppetfile.display()))?;
    print!("{}", normalize_str(&content).canonical_text());
    Ok(EXIT_SUCCESS)
}
