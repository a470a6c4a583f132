use super::{json_pretty, report_fatal, EXIT_SUCCESS};
use std::path::Path;
use tenk_manifest::{compute_manifest_id, normalize_str, parse_puppetfile_str, ParseOptions};

pub fn run(puppetfile: &Path, options: &ParseOptions, json: bool) -> Result<u8, String> {
    let content = std::fs::read_to_string(puppetfile)
        .map_err(|e| format!("can not read Puppetfile {}: {e}", puppetfile.display()))?;
    let file = puppetfile.display().to_string();

    let manifest = match parse_puppetfile_str(&content, &file, options) {
        Ok(manifest) => manifest,
        Err(err) => return Ok(report_fatal(&err)),
    };
    let identity = compute_manifest_id(&normalize_str(&content));

    if json {
        let payload = serde_json::json!({
            "status": "ok",
            "file": file,
            "git_modules": manifest.git_modules.len(),
            "forge_modules": manifest.forge_modules.len(),
            "module_dirs": manifest.module_dirs,
            "manifest_id": identity.manifest_id,
            "short_id": identity.short_id,
        });
        println!("{}", json_pretty(&payload)?);
    } else {
        println!(
            "{file} OK ({}): {} git modules, {} forge modules",
            identity.short_id,
            manifest.git_modules.len(),
            manifest.forge_modules.len()
        );
    }
    Ok(EXIT_SUCCESS)
}
