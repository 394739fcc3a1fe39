//! CLI argument parsing and command dispatch

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::commands;

/// Version Infer - Infer project versions and propagate them across a build
#[derive(Parser, Debug)]
#[command(name = "version-infer")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Set log level (error, warn, info, debug, trace); RUST_LOG takes precedence
    #[arg(long, global = true, value_name = "LEVEL", default_value = "info")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Infer every project's version and emit the rewritten descriptors
    Apply(commands::apply::ApplyArgs),

    /// Print the inferred version of a single project
    Version(commands::version::VersionArgs),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        init_logging(&self.log_level);

        match self.command {
            Commands::Apply(args) => commands::apply::execute(args),
            Commands::Version(args) => commands::version::execute(args),
        }
    }
}

fn init_logging(level: &str) {
    // stdout is reserved for versions and summaries
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .target(env_logger::Target::Stderr)
        .try_init();
}
