//! permalog CLI
//!
//! Command-line tools for inspecting permalog journal files.
//!
//! # Commands
//!
//! - `inspect` - Display journal statistics
//! - `verify` - Walk every frame and report integrity
//! - `dump` - Print journal records for debugging

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// permalog command-line journal tools.
#[derive(Parser)]
#[command(name = "permalog")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the journal file
    #[arg(global = true, short, long)]
    path: Option<PathBuf>,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Display journal statistics
    Inspect,

    /// Walk every frame and report integrity
    Verify,

    /// Print journal records for debugging
    Dump {
        /// Maximum number of records to print
        #[arg(short, long)]
        limit: Option<usize>,

        /// Print payloads as hex instead of lossy UTF-8
        #[arg(long)]
        hex: bool,
    },

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::Inspect => {
            let path = cli.path.ok_or("Journal path required for inspect")?;
            commands::inspect::run(&path)?;
        }
        Commands::Verify => {
            let path = cli.path.ok_or("Journal path required for verify")?;
            let clean = commands::verify::run(&path)?;
            if !clean {
                std::process::exit(1);
            }
        }
        Commands::Dump { limit, hex } => {
            let path = cli.path.ok_or("Journal path required for dump")?;
            commands::dump::run(&path, limit, hex)?;
        }
        Commands::Version => {
            println!("permalog CLI v{}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
