//! Orchestrator for a complete version inference run
//!
//! This module sequences the phases into the two entry points used by the
//! CLI: a full run over the reactor and a single-project inference.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use log::info;
use serde::Serialize;
use tempfile::TempPath;

use super::{phase1, phase2, phase3, phase4, InferenceContext};
use crate::descriptor::DescriptorIo;
use crate::error::Result;
use crate::reactor::{ProjectNode, Reactor};
use crate::registry::GavRegistry;
use crate::strategy::StrategyRegistry;

/// Options of a full run.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Compute and rewrite in memory but emit nothing.
    pub dry_run: bool,
}

/// Outcome of one opted-in project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectReport {
    pub group: String,
    pub artifact: String,
    pub original_version: String,
    pub version: String,
    /// Descriptor the downstream build should read.
    pub descriptor: PathBuf,
    /// Whether `descriptor` is deleted once the run outcome is dropped.
    pub removed_on_exit: bool,
    pub final_name: String,
    pub properties: BTreeMap<String, String>,
}

impl ProjectReport {
    fn of(node: &ProjectNode) -> Self {
        Self {
            group: node.group.clone(),
            artifact: node.artifact.clone(),
            original_version: node.original_version.clone(),
            version: node.version.clone(),
            descriptor: node.descriptor_path.clone(),
            removed_on_exit: false,
            final_name: node.final_name.clone(),
            properties: node.properties.clone(),
        }
    }
}

/// Result of a full run.
///
/// Descriptors emitted with `deleteTemporaryFile` are removed when the
/// outcome is dropped.
#[derive(Debug)]
pub struct RunOutcome {
    pub registry: GavRegistry,
    pub projects: Vec<ProjectReport>,
    cleanup: Vec<TempPath>,
}

impl RunOutcome {
    /// Number of emitted descriptors removed on drop.
    pub fn pending_cleanup(&self) -> usize {
        self.cleanup.len()
    }

    /// The project reports as pretty-printed JSON.
    pub fn summary_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.projects)?)
    }
}

/// Execute a complete run (Phases 1-4)
///
/// 1. Resolve every project's configuration
/// 2. Infer the new versions (pass 1)
/// 3. Rewrite versions, dependencies and parents (pass 2)
/// 4. Emit the rewritten descriptors (skipped for dry runs)
///
/// Any error aborts the run. Since emission comes last, a failure in an
/// earlier phase leaves every descriptor on disk untouched.
pub fn execute(
    reactor: &mut Reactor,
    strategies: StrategyRegistry,
    io: &dyn DescriptorIo,
    options: &RunOptions,
) -> Result<RunOutcome> {
    let mut ctx = InferenceContext::new(strategies);

    // Phase 1: Configuration
    let configured = phase1::execute(reactor, &mut ctx)?;

    // Phase 2: Version Resolution
    let resolved = phase2::execute(reactor, &mut ctx)?;

    // Phase 3: Reference Rewriting, starts once every version is known
    phase3::execute(reactor, &ctx)?;

    // Phase 4: Emission
    let cleanup = if options.dry_run {
        Vec::new()
    } else {
        phase4::execute(reactor, &ctx, io)?
    };

    info!(
        "Inferred {} of {} project version(s) ({} configured)",
        resolved,
        reactor.len(),
        configured
    );

    let projects = (0..reactor.len())
        .filter(|&index| ctx.configs.cached(index).is_some())
        .map(|index| {
            let mut report = ProjectReport::of(reactor.node(index));
            report.removed_on_exit = cleanup.iter().any(|path| {
                let path: &Path = path;
                path == report.descriptor
            });
            report
        })
        .collect();

    Ok(RunOutcome {
        registry: ctx.registry,
        projects,
        cleanup,
    })
}

/// Infer the version of a single project without touching any descriptor.
///
/// Returns `None` when the project is not configured for version inference.
pub fn infer_project(
    reactor: &mut Reactor,
    index: usize,
    strategies: StrategyRegistry,
) -> Result<Option<ProjectReport>> {
    let mut ctx = InferenceContext::new(strategies);
    if !phase2::resolve_project(reactor, index, &mut ctx)? {
        return Ok(None);
    }
    Ok(Some(ProjectReport::of(reactor.node(index))))
}
