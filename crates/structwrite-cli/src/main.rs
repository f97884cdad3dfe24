//! structwrite CLI tool.
//!
//! Usage:
//! ```bash
//! structwrite check [OPTIONS] [PATH]
//! structwrite config [PATH]
//! structwrite init
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod config_resolver;

/// Reports writes to tracked Go struct types outside their constructors
#[derive(Parser)]
#[command(name = "structwrite")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "STRUCTWRITE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the lint
    Check {
        /// Path to analyze (default: current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,

        /// Additional tracked struct (`import/path.Type`, repeatable)
        #[arg(short = 's', long = "struct")]
        structs: Vec<String>,

        /// Exclude patterns (can be specified multiple times)
        #[arg(short, long)]
        exclude: Vec<String>,

        /// Skip `*_test.go` files
        #[arg(long)]
        no_tests: bool,
    },

    /// Print the effective configuration
    Config {
        /// Project directory used for config resolution
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// Initialize configuration file
    Init {
        /// Overwrite existing config
        #[arg(long)]
        force: bool,
    },
}

/// Output format for lint results.
#[derive(Clone, Copy, Debug, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    #[default]
    Text,
    /// JSON output.
    Json,
    /// One-line-per-violation compact format.
    Compact,
    /// Annotated source snippets.
    Rich,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("warn")
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Check {
            path,
            format,
            structs,
            exclude,
            no_tests,
        } => {
            let source = config_resolver::resolve(&path, cli.config.as_deref());
            let options = commands::check::Options {
                format,
                structs,
                exclude,
                no_tests,
            };
            let failed = commands::check::run(&path, options, &source)?;
            if failed {
                std::process::exit(1);
            }
            Ok(())
        }
        Commands::Config { path } => {
            let source = config_resolver::resolve(&path, cli.config.as_deref());
            commands::config::run(&source)
        }
        Commands::Init { force } => commands::init::run(std::path::Path::new("."), force),
    }
}
