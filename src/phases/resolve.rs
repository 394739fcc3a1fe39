//! Phase 2: Version Resolution (pass 1)
//!
//! Visits every project in reactor order and, for each opted-in project:
//!
//! 1.  **Capture**: Remembers the project's identity before anything changes.
//!     This identity is the registry key other projects will look up.
//!
//! 2.  **Infer**: Runs the configured strategy. Strategy failures are wrapped
//!     with the project they happened for; a missing or blank result is an
//!     error of its own.
//!
//! 3.  **Apply**: Sets the new version on the project and replaces the first
//!     occurrence of the old version inside the build output name.
//!
//! 4.  **Record**: Registers `original identity -> new version`.
//!
//! Descriptors are not touched here; that is phase 3's job once every new
//! version is known.

use log::info;

use super::InferenceContext;
use crate::error::{Error, Result};
use crate::reactor::Reactor;
use crate::strategy::ProjectContext;

/// Execute Phase 2 over the whole reactor.
///
/// Returns the number of projects that received a new version.
pub fn execute(reactor: &mut Reactor, ctx: &mut InferenceContext) -> Result<usize> {
    let mut resolved = 0;
    for index in 0..reactor.len() {
        if resolve_project(reactor, index, ctx)? {
            resolved += 1;
        }
    }
    Ok(resolved)
}

/// Infer and apply the new version of project `index`.
///
/// Returns `false` when the project is not opted in.
pub fn resolve_project(
    reactor: &mut Reactor,
    index: usize,
    ctx: &mut InferenceContext,
) -> Result<bool> {
    let Some(config) = ctx
        .configs
        .get_for_project(reactor, index, &ctx.strategies)?
    else {
        return Ok(false);
    };

    let node = reactor.node_mut(index);
    let original = node.identity();

    let inferred = {
        let mut project = ProjectContext {
            identity: &original,
            basedir: &node.basedir,
            properties: &mut node.properties,
        };
        config.strategy.version(&mut project)
    }
    .map_err(|e| Error::Inference {
        project: format!("{} ({})", node.coordinates(), node.descriptor_path.display()),
        source: Box::new(e),
    })?;

    let version = inferred
        .as_deref()
        .map(str::trim)
        .filter(|version| !version.is_empty())
        .ok_or_else(|| Error::EmptyVersion {
            project: node.coordinates(),
            descriptor: node.descriptor_path.clone(),
        })?
        .to_string();

    let old_version = std::mem::replace(&mut node.version, version.clone());
    if !old_version.is_empty() {
        node.final_name = node.final_name.replacen(&old_version, &version, 1);
    }

    info!("Inferred project version: {} -> {}", original, version);
    info!("Final name: {}", node.final_name);

    ctx.registry.insert(original, version);
    Ok(true)
}
