use super::{colorize_kind, json_pretty, load_manifest, EXIT_SUCCESS};
use std::path::Path;
use tenk_manifest::ParseOptions;

pub fn run(puppetfile: &Path, options: &ParseOptions, json: bool) -> Result<u8, String> {
    let manifest = match load_manifest(puppetfile, options)? {
        Ok(manifest) => manifest,
        Err(code) => return Ok(code),
    };

    if json {
        println!("{}", json_pretty(&manifest)?);
        return Ok(EXIT_SUCCESS);
    }

    println!("source:         {}", display_or(&manifest.source, "(none)"));
    println!(
        "source branch:  {}",
        display_or(&manifest.source_branch, "(none)")
    );
    println!(
        "forge baseUrl:  {}",
        manifest.forge_base_url.as_deref().unwrap_or("(default)")
    );
    match manifest.forge_cache_ttl {
        Some(ttl) => println!("forge cacheTtl: {}s", ttl.as_secs()),
        None => println!("forge cacheTtl: (none)"),
    }
    if !manifest.module_dirs.is_empty() {
        println!("module dirs:    {}", manifest.module_dirs.join(", "));
    }

    if manifest.module_count() == 0 {
        println!("no modules declared");
        return Ok(EXIT_SUCCESS);
    }

    println!();
    println!("{:<7} {:<24} DETAIL", "KIND", "NAME");
    for (name, module) in &manifest.git_modules {
        let kind = if module.local { "local" } else { "git" };
        let mut detail = module.git.clone().unwrap_or_else(|| "(local)".to_owned());
        if let Some(reference) = &module.reference {
            detail.push_str(&format!(" @{}", reference.name()));
        }
        println!("{:<7} {name:<24} {detail}", colorize_kind(kind));
    }
    for (name, module) in &manifest.forge_modules {
        println!(
            "{:<7} {name:<24} {}/{} {}",
            colorize_kind("forge"),
            module.author,
            module.name,
            module.version
        );
    }
    Ok(EXIT_SUCCESS)
}

fn display_or<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.is_empty() {
        fallback
    } else {
        value
    }
}
