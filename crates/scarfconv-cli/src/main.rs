#![deny(unsafe_code)]

//! scarfconv CLI: filter static analysis findings through a tool list.

mod commands;

use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use scarfconv_config::AppConfig;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// scarfconv: keep only the attributes a tool is configured to report.
#[derive(Parser)]
#[command(name = "scarfconv", version, about, long_about = None)]
struct Cli {
    /// Path to configuration file.
    #[arg(short, long, default_value = "scarfconv.toml")]
    config: PathBuf,

    /// Increase log verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Filter a JSON Lines stream of findings into a JSON report.
    Convert {
        /// Tool that produced the findings.
        #[arg(short, long)]
        tool: String,

        /// Findings input; stdin when omitted.
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Report output; stdout when omitted.
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Tool list document, overriding `tool_list.path`. Its attribute map
        /// is read from the `tool_list.labels.attribute_map` key, which
        /// defaults to "ScarfAttributes".
        #[arg(long)]
        tool_list: Option<PathBuf>,

        /// Write the report without whitespace.
        #[arg(long)]
        compact: bool,
    },

    /// Show how a tool is classified and which attributes it reports.
    Attributes {
        #[arg(short, long)]
        tool: String,

        /// Tool list document, overriding `tool_list.path`. Its attribute map
        /// is read from the `tool_list.labels.attribute_map` key, which
        /// defaults to "ScarfAttributes".
        #[arg(long)]
        tool_list: Option<PathBuf>,

        /// List every known attribute, not just the valid ones.
        #[arg(long)]
        all: bool,
    },

    /// Validate and display configuration.
    Config {
        /// Show the resolved configuration.
        #[arg(long)]
        show: bool,
    },

    /// Print version and build information.
    Version,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let (config, found) = load_config(&cli.config)?;

    // -v overrides the configured level
    let filter = match cli.verbose {
        0 => config.logging.level.as_str(),
        1 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    if !found {
        info!(path = %cli.config.display(), "Config file not found, using defaults");
    }

    match cli.command {
        Commands::Convert {
            tool,
            input,
            output,
            tool_list,
            compact,
        } => {
            let tool_list = commands::tool_list_path(&config, tool_list.as_deref());
            let pretty = config.output.pretty && !compact;
            commands::convert_paths(
                &config,
                &tool_list,
                &tool,
                input.as_deref(),
                output.as_deref(),
                pretty,
            )?;
        }
        Commands::Attributes {
            tool,
            tool_list,
            all,
        } => {
            let tool_list = commands::tool_list_path(&config, tool_list.as_deref());
            let loaded = commands::load_attributes(&config, &tool_list, &tool)?;
            commands::describe(&loaded, all, io::stdout().lock())?;
        }
        Commands::Config { show } => {
            commands::show_config(&config, &cli.config, show, io::stdout().lock())?
        }
        Commands::Version => {
            println!("scarfconv {}", scarfconv_core::build_info::version_string());
        }
    }

    Ok(())
}

/// Load the config file, falling back to defaults when it does not exist.
/// The flag reports whether the file was found.
fn load_config(path: &Path) -> Result<(AppConfig, bool)> {
    if path.exists() {
        let config = AppConfig::load(path)
            .with_context(|| format!("invalid configuration in {}", path.display()))?;
        Ok((config, true))
    } else {
        Ok((AppConfig::default(), false))
    }
}
