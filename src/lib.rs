//! # Version Inference Library
//!
//! This library infers a version for every project of a multi-project build
//! (a *reactor*) from its git repository, a version file or a script, and
//! then propagates the new versions to every reference between the projects
//! before the build reads its descriptors. It is used by the `version-infer`
//! command-line tool but the engine only talks to descriptors through the
//! `descriptor::DescriptorIo` trait, so it can be embedded elsewhere.
//!
//! ## Quick Example
//!
//! ```
//! use version_infer::gav::Gav;
//! use version_infer::registry::GavRegistry;
//!
//! // Identities compare case-insensitively
//! let mut registry = GavRegistry::new();
//! registry.insert(Gav::of("com.Example", "Core", "1.0-SNAPSHOT"), "1.0.1-dev.3+58de1990".to_string());
//!
//! assert_eq!(
//!     registry.get(&Gav::of("com.example", "core", "1.0-snapshot")),
//!     Some("1.0.1-dev.3+58de1990")
//! );
//! ```
//!
//! ## Core Concepts
//!
//! - **Descriptors (`descriptor`)**: The `project.yaml` model and its I/O seam.
//! - **Reactor (`reactor`)**: All projects of a run, loaded by following
//!   `modules` lists and linked to their in-reactor parents.
//! - **Strategies (`strategy`, `git`)**: Pluggable version sources selected by
//!   the `hint` of each project's `strategy` node.
//! - **Configuration (`config`)**: The per-project `version-inference` plugin
//!   node, inherited along the parent chain.
//! - **Phases (`phases`)**: The pipeline that runs a complete inference.
//!
//! ## Execution Flow
//!
//! The main entry point is `phases::orchestrator::execute`:
//!
//! 1.  **Configuration**: Resolve the plugin configuration of every project.
//! 2.  **Pass 1**: Compute each opted-in project's new version and record it
//!     in the `registry::GavRegistry` under the project's original identity.
//! 3.  **Pass 2**: Rewrite descriptor versions, dependencies and parent
//!     references from the registry.
//! 4.  **Emission**: Write the rewritten descriptors next to the originals or
//!     to temporary files.

pub mod config;
pub mod descriptor;
pub mod error;
pub mod gav;
pub mod git;
pub mod phases;
pub mod reactor;
pub mod registry;
pub mod strategy;
pub mod suggestions;
