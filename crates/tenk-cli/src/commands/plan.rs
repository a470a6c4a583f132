use super::{colorize_kind, json_pretty, load_manifest, EXIT_SUCCESS};
use std::path::Path;
use tenk_deploy::{FetchPlan, TaskAction};
use tenk_manifest::ParseOptions;

pub fn run(puppetfile: &Path, options: &ParseOptions, json: bool) -> Result<u8, String> {
    let manifest = match load_manifest(puppetfile, options)? {
        Ok(manifest) => manifest,
        Err(code) => return Ok(code),
    };
    let plan = FetchPlan::from_puppetfile(&manifest);

    if json {
        println!("{}", json_pretty(&plan)?);
        return Ok(EXIT_SUCCESS);
    }

    if plan.tasks.is_empty() {
        println!("nothing to fetch");
        return Ok(EXIT_SUCCESS);
    }

    println!("{:<7} {:<24} {:<32} SOURCE", "KIND", "NAME", "TARGET");
    for task in &plan.tasks {
        let (kind, source) = match &task.action {
            TaskAction::CloneGit { url, reference, .. } => {
                let mut source = url.clone();
                if let Some(reference) = reference {
                    source.push_str(&format!(" @{}", reference.name()));
                }
                ("git", source)
            }
            TaskAction::LinkLocal => ("local", "(local disk)".to_owned()),
            TaskAction::FetchForge {
                slug,
                version,
                base_url,
                ..
            } => ("forge", format!("{base_url} {slug} {version}")),
        };
        println!(
            "{:<7} {:<24} {:<32} {source}",
            colorize_kind(kind),
            task.module,
            task.target_dir
        );
    }
    Ok(EXIT_SUCCESS)
}
