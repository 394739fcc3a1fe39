//! Implementation of the phases of a version inference run.
//!
//! ## Overview
//!
//! A run follows 4 phases:
//! 1. Configuration - Resolve the plugin configuration of every project
//! 2. Version Resolution - Compute each opted-in project's new version (pass 1)
//! 3. Reference Rewriting - Rewrite descriptor versions, dependencies and parent links (pass 2)
//! 4. Emission - Write the rewritten descriptors and redirect each project to them
//!
//! Phase 3 only starts once phase 2 has covered the whole reactor, so every
//! project sees the complete set of new versions regardless of reactor order.
//!
//! All run-scoped state lives in an `InferenceContext` owned by one
//! orchestrator call.

use crate::config::PluginConfigProvider;
use crate::registry::GavRegistry;
use crate::strategy::StrategyRegistry;

// Phase modules
pub mod configure;
pub mod emit;
pub mod orchestrator;
pub mod resolve;
pub mod rewrite;

pub use configure as phase1;
pub use emit as phase4;
pub use resolve as phase2;
pub use rewrite as phase3;

/// State shared by the phases of a single run.
#[derive(Debug)]
pub struct InferenceContext {
    /// Original identity to new version; written by phase 2 only.
    pub registry: GavRegistry,
    pub configs: PluginConfigProvider,
    pub strategies: StrategyRegistry,
}

impl InferenceContext {
    pub fn new(strategies: StrategyRegistry) -> Self {
        Self {
            registry: GavRegistry::new(),
            configs: PluginConfigProvider::new(),
            strategies,
        }
    }
}
