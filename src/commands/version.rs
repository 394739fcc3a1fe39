//! Version command implementation
//!
//! Infers the version of a single project and prints it, or one of the
//! properties its strategy published. Nothing is written to disk.

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

use version_infer::descriptor::{YamlDescriptorIo, DESCRIPTOR_FILE_NAME};
use version_infer::phases::orchestrator;
use version_infer::reactor::Reactor;
use version_infer::strategy::StrategyRegistry;
use version_infer::suggestions;

/// Arguments for the version command
#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Root project directory (defaults to current directory)
    #[arg(short, long, value_name = "DIR", env = "VERSION_INFER_ROOT")]
    pub root: Option<PathBuf>,

    /// Directory of the project to infer (defaults to the root project)
    #[arg(short, long, value_name = "DIR")]
    pub project: Option<PathBuf>,

    /// Print this published property instead of the version
    #[arg(long, value_name = "KEY")]
    pub property: Option<String>,
}

/// Execute the version command
pub fn execute(args: VersionArgs) -> Result<()> {
    println!("{}", infer(&args)?);
    Ok(())
}

fn infer(args: &VersionArgs) -> Result<String> {
    let root = match &args.root {
        Some(root) => root.clone(),
        None => std::env::current_dir().context("Failed to get current directory")?,
    };
    let descriptor = root.join(DESCRIPTOR_FILE_NAME);
    if !descriptor.exists() {
        return Err(suggestions::descriptor_not_found(&descriptor));
    }

    let mut reactor = Reactor::load(&root, &YamlDescriptorIo)?;
    let project_dir = args.project.as_ref().unwrap_or(&root);
    let index = reactor
        .find_by_basedir(project_dir)
        .ok_or_else(|| suggestions::project_not_in_reactor(project_dir, &root))?;

    let coordinates = reactor.node(index).coordinates();
    let report = orchestrator::infer_project(&mut reactor, index, StrategyRegistry::default())?
        .ok_or_else(|| suggestions::project_not_configured(&coordinates))?;

    match &args.property {
        None => Ok(report.version),
        Some(key) => report.properties.get(key).cloned().ok_or_else(|| {
            let published: Vec<&str> = report.properties.keys().map(String::as_str).collect();
            suggestions::unknown_property(key, &published)
        }),
    }
}
