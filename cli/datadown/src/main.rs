//! Datadown CLI: markdown conversion through the precompiled native module.

mod commands;
mod config;

use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use datadown_ffi::OutputFormat;
use datadown_loader::{BindingCell, Resolver, ResolverConfig};

use config::{DatadownConfig, CONFIG_FILE};

#[derive(Parser)]
#[command(name = "datadown", version, about = "Convert markdown to structured data")]
struct Cli {
    /// Directory holding the native binding artifacts (overrides datadown.toml)
    #[arg(long, global = true)]
    binding_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a markdown document
    Convert {
        /// Input file; `-` or omitted reads stdin
        input: Option<PathBuf>,
        /// Output format (json, yaml, toml, xml)
        #[arg(long, short)]
        format: Option<String>,
        /// Output file (default: stdout)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Inspect the platform table
    Target {
        #[command(subcommand)]
        action: TargetAction,
    },
    /// Diagnose native binding resolution on this host
    Doctor,
}

#[derive(Subcommand)]
enum TargetAction {
    /// List supported platforms and their artifacts
    List {
        /// Print the table as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show what a platform resolves to, without loading it
    Resolve {
        /// Platform key such as darwin-arm64 (default: this host)
        key: Option<String>,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let result = run(cli);
    if let Err(e) = result {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let cwd = std::env::current_dir()?;
    let (config, config_dir) = load_config_optional(&cwd)?;
    let config = config.unwrap_or_default();

    let mut resolver_config = match &config_dir {
        Some(dir) => config.resolver_config(dir),
        None => ResolverConfig::default(),
    };
    if let Some(dir) = cli.binding_dir {
        resolver_config.binding_dir = Some(dir);
    }

    match cli.command {
        Commands::Convert {
            input,
            format,
            output,
        } => {
            let format = match format {
                Some(f) => f.parse::<OutputFormat>()?,
                None => config.default_format()?.unwrap_or(OutputFormat::Json),
            };
            let cell = BindingCell::new(Resolver::from_config(&resolver_config));
            commands::convert::run(&cell, format, input.as_deref(), output.as_deref())
        }

        Commands::Target { action } => match action {
            TargetAction::List { json } => commands::target::list(json),
            TargetAction::Resolve { key } => {
                let resolver = Resolver::from_config(&resolver_config);
                commands::target::resolve(key.as_deref(), resolver.binding_dir())
            }
        },

        Commands::Doctor => {
            let cell = BindingCell::new(Resolver::from_config(&resolver_config));
            let config_file = config_dir.map(|d| d.join(CONFIG_FILE));
            commands::doctor::run(&cell, config_file.as_deref())
        }
    }
}

/// Try to load a config from the current directory upward. Returns (None, None) if not found.
fn load_config_optional(cwd: &Path) -> anyhow::Result<(Option<DatadownConfig>, Option<PathBuf>)> {
    match DatadownConfig::find_and_load(cwd)? {
        Some((config, dir)) => Ok((Some(config), Some(dir))),
        None => Ok((None, None)),
    }
}
