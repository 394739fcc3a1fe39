//! Apply command implementation
//!
//! The apply command runs a complete inference over the reactor:
//! 1. Loading the reactor from the root descriptor
//! 2. Resolving every project's configuration
//! 3. Inferring the new versions (pass 1)
//! 4. Rewriting versions, dependencies and parents (pass 2)
//! 5. Emitting the rewritten descriptors

use anyhow::{Context, Result};
use clap::Args;
use std::fs;
use std::path::PathBuf;

use version_infer::descriptor::{YamlDescriptorIo, DESCRIPTOR_FILE_NAME};
use version_infer::phases::orchestrator::{self, RunOptions};
use version_infer::reactor::Reactor;
use version_infer::strategy::StrategyRegistry;
use version_infer::suggestions;

/// Arguments for the apply command
#[derive(Args, Debug)]
pub struct ApplyArgs {
    /// Root project directory (defaults to current directory)
    #[arg(short, long, value_name = "DIR", env = "VERSION_INFER_ROOT")]
    pub root: Option<PathBuf>,

    /// Compute and report the new versions without writing descriptors
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Write a JSON report of the inferred versions to PATH
    #[arg(long, value_name = "PATH")]
    pub summary: Option<PathBuf>,

    /// Suppress all output except errors
    #[arg(short, long)]
    pub quiet: bool,
}

/// Execute the apply command
pub fn execute(args: ApplyArgs) -> Result<()> {
    use std::time::Instant;

    let start_time = Instant::now();

    let root = match args.root {
        Some(root) => root,
        None => std::env::current_dir().context("Failed to get current directory")?,
    };
    let descriptor = root.join(DESCRIPTOR_FILE_NAME);
    if !descriptor.exists() {
        return Err(suggestions::descriptor_not_found(&descriptor));
    }

    if !args.quiet && args.dry_run {
        println!("DRY RUN MODE - No descriptors will be written");
        println!();
    }

    let io = YamlDescriptorIo;
    let mut reactor = Reactor::load(&root, &io)?;
    let outcome = orchestrator::execute(
        &mut reactor,
        StrategyRegistry::default(),
        &io,
        &RunOptions {
            dry_run: args.dry_run,
        },
    )?;

    if let Some(summary) = &args.summary {
        fs::write(summary, outcome.summary_json()?)
            .with_context(|| format!("Failed to write summary to {}", summary.display()))?;
    }

    if !args.quiet {
        for project in &outcome.projects {
            println!(
                "{}:{}: {} -> {}",
                project.group, project.artifact, project.original_version, project.version
            );
            if project.removed_on_exit {
                println!(
                    "   descriptor: {} (removed on exit)",
                    project.descriptor.display()
                );
            } else if !args.dry_run {
                println!("   descriptor: {}", project.descriptor.display());
            }
        }
        println!(
            "Inferred {} of {} project(s) in {:.2}s",
            outcome.projects.len(),
            reactor.len(),
            start_time.elapsed().as_secs_f64()
        );
    }

    Ok(())
}
