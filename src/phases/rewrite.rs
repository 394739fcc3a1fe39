//! Phase 3: Reference Rewriting (pass 2)
//!
//! Runs once phase 2 has covered the whole reactor and only reads the
//! registry. For each opted-in project:
//!
//! 1.  **Dependencies**: With `updateDependencies`, every dependency with a
//!     declared version that matches a registry key gets the new version.
//!     References to the project itself are never rewritten.
//!
//! 2.  **Version**: The descriptor version is set to the project's new
//!     version.
//!
//! 3.  **Parent**: A parent reference found in the registry gets the new
//!     version.
//!
//! Propagation stops at the immediate parent. When the parent is not opted
//! in but its own parent was re-versioned, the gap is reported as a warning.

use log::{debug, info, warn};

use super::InferenceContext;
use crate::config::PluginConfig;
use crate::error::Result;
use crate::gav::Gav;
use crate::reactor::Reactor;
use crate::registry::GavRegistry;

/// Execute Phase 3 over every opted-in project.
///
/// Configurations must have been resolved by phase 1; projects without a
/// cached configuration are skipped. Returns the number of rewritten
/// descriptors.
pub fn execute(reactor: &mut Reactor, ctx: &InferenceContext) -> Result<usize> {
    let mut rewritten = 0;
    for index in 0..reactor.len() {
        let Some(config) = ctx.configs.cached(index) else {
            continue;
        };
        warn_on_ancestor_gap(reactor, index, ctx);
        rewrite_project(reactor, index, config, &ctx.registry);
        rewritten += 1;
    }
    Ok(rewritten)
}

/// Rewrite the descriptor of project `index` against `registry`.
pub fn rewrite_project(
    reactor: &mut Reactor,
    index: usize,
    config: &PluginConfig,
    registry: &GavRegistry,
) {
    let node = reactor.node_mut(index);
    let current = node.identity();
    let original = node.original_identity();

    if config.update_dependencies {
        for dependency in node.descriptor.dependencies.iter_mut() {
            let Some(declared) = dependency.version.as_deref() else {
                continue;
            };
            let identity = Gav::of(&dependency.group, &dependency.artifact, declared);
            if identity == current || identity == original {
                continue;
            }
            if let Some(version) = registry.get(&identity) {
                info!(
                    "Setting project {} dependency {} to version {}",
                    current, identity, version
                );
                dependency.version = Some(version.to_string());
            }
        }
    }

    node.descriptor.version = Some(node.version.clone());

    if let Some(parent) = node.descriptor.parent.as_mut() {
        let identity = Gav::of(&parent.group, &parent.artifact, &parent.version);
        if let Some(version) = registry.get(&identity) {
            debug!(
                "Setting project {} parent {} to version {}",
                current, identity, version
            );
            parent.version = version.to_string();
        }
    }
}

fn warn_on_ancestor_gap(reactor: &Reactor, index: usize, ctx: &InferenceContext) {
    let node = reactor.node(index);
    let Some(parent_index) = node.parent else {
        return;
    };
    if ctx.configs.cached(parent_index).is_some() {
        return;
    }

    let parent = reactor.node(parent_index);
    let Some(grandparent) = parent.descriptor.parent.as_ref() else {
        return;
    };
    let identity = Gav::of(&grandparent.group, &grandparent.artifact, &grandparent.version);
    if ctx.registry.contains(&identity) {
        warn!(
            "Parent {} of {} is not configured for version inference, but its parent {} was re-versioned; versions are only propagated to the immediate parent",
            parent.coordinates(),
            node.coordinates(),
            identity
        );
    }
}
