mod commands;

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use commands::EXIT_FAILURE;
use std::path::PathBuf;
use std::process::ExitCode;
use tenk_deploy::config::default_config_path;
use tenk_deploy::DeployConfig;
use tenk_manifest::ParseOptions;

#[derive(Debug, Parser)]
#[command(
    name = "tenk",
    version,
    about = "Puppetfile validator and deployment planner for Puppet environments"
)]
struct Cli {
    /// Path to the deploy config TOML (default: ~/.config/tenk/config.toml).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output results as structured JSON.
    #[arg(long, default_value_t = false, global = true)]
    json: bool,

    /// Enable verbose (debug) logging output.
    #[arg(short, long, default_value_t = false, global = true)]
    verbose: bool,

    /// Enable trace-level logging (more detailed than --verbose).
    #[arg(long, default_value_t = false, global = true)]
    trace: bool,

    /// Source identifier recorded in the parsed manifest.
    #[arg(long, global = true)]
    source: Option<String>,

    /// Source branch recorded in the parsed manifest.
    #[arg(long, global = true)]
    branch: Option<String>,

    /// Branch substituted for ':branch => :control_branch'.
    #[arg(long, global = true)]
    control_branch: Option<String>,

    /// Default private key for Git modules without :private_key.
    #[arg(long, global = true)]
    private_key: Option<String>,

    /// Reject 'latest'/'present' Forge version sentinels.
    #[arg(long, default_value_t = false, global = true)]
    force_module_versions: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Parse and validate a Puppetfile.
    Validate {
        /// Path to the Puppetfile.
        #[arg(default_value = "Puppetfile")]
        puppetfile: PathBuf,
    },
    /// Print the parsed manifest.
    Inspect {
        /// Path to the Puppetfile.
        #[arg(default_value = "Puppetfile")]
        puppetfile: PathBuf,
    },
    /// Print the canonical one-statement-per-line form of a Puppetfile.
    Normalize {
        /// Path to the Puppetfile.
        #[arg(default_value = "Puppetfile")]
        puppetfile: PathBuf,
    },
    /// Print the deterministic fetch plan derived from a Puppetfile.
    Plan {
        /// Path to the Puppetfile.
        #[arg(default_value = "Puppetfile")]
        puppetfile: PathBuf,
    },
    /// Generate shell completions for bash, zsh, fish, elvish, or powershell.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
    /// Generate man pages in the specified directory.
    ManPages {
        /// Output directory for man pages.
        #[arg(default_value = "man")]
        dir: PathBuf,
    },
}

fn main() -> ExitCode {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let msg = info.to_string();
        if msg.contains("Broken pipe")
            || msg.contains("broken pipe")
            || msg.contains("os error 32")
            || msg.contains("failed printing to stdout")
        {
            std::process::exit(0);
        }
        default_hook(info);
    }));

    let cli = Cli::parse();

    let default_level = if cli.trace {
        "trace"
    } else if cli.verbose {
        "debug"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("TENK_LOG")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_target(false)
        .without_time()
        .init();

    let options = match build_options(&cli) {
        Ok(options) => options,
        Err(msg) => {
            eprintln!("Error: {msg}");
            return ExitCode::from(EXIT_FAILURE);
        }
    };
    let json_output = cli.json;

    let result = match cli.command {
        Commands::Validate { puppetfile } => {
            commands::validate::run(&puppetfile, &options, json_output)
        }
        Commands::Inspect { puppetfile } => {
            commands::inspect::run(&puppetfile, &options, json_output)
        }
        Commands::Normalize { puppetfile } => commands::normalize::run(&puppetfile),
        Commands::Plan { puppetfile } => commands::plan::run(&puppetfile, &options, json_output),
        Commands::Completions { shell } => commands::completions::run::<Cli>(shell),
        Commands::ManPages { dir } => commands::man_pages::run::<Cli>(&dir),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(msg) => {
            eprintln!("Error: {msg}");
            ExitCode::from(EXIT_FAILURE)
        }
    }
}

/// Assemble parse options from config file defaults and flag overrides.
fn build_options(cli: &Cli) -> Result<ParseOptions, String> {
    let config = if let Some(path) = &cli.config {
        DeployConfig::load(path).map_err(|e| e.to_string())?
    } else {
        match default_config_path() {
            Ok(path) if path.exists() => DeployConfig::load(&path).map_err(|e| e.to_string())?,
            _ => DeployConfig::default(),
        }
    };

    let mut options = config.to_parse_options();
    if let Some(source) = &cli.source {
        options.source = source.clone();
    }
    if let Some(branch) = &cli.branch {
        options.source_branch = branch.clone();
    }
    if let Some(control_branch) = &cli.control_branch {
        options.control_repo_branch = Some(control_branch.clone());
    }
    if let Some(private_key) = &cli.private_key {
        options.default_private_key = Some(private_key.clone());
    }
    if cli.force_module_versions {
        options.force_exact_versions = true;
    }
    Ok(options)
}
