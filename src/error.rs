//! # Error Handling
//!
//! This module defines the centralized error type for `version-infer`. It uses
//! the `thiserror` library to build a single `Error` enum covering every
//! failure mode of a run, each variant carrying enough context to tell the
//! user which project and which stage failed.
//!
//! ## Key Components
//!
//! - **`Error`**: The main enum. Variants fall into four groups:
//!   - configuration errors (`ConfigParse`), raised before any project is
//!     processed;
//!   - strategy errors (`Strategy`, `ScriptExit`, `GitCommand`, `EmptyVersion`,
//!     `Inference`), raised while computing versions;
//!   - descriptor and reactor errors (`Descriptor`, `Reactor`,
//!     `CycleDetected`);
//!   - wrapped library errors (`Io`, `Yaml`, `Json`, `Semver`).
//!
//! - **`Result<T>`**: A type alias for `std::result::Result<T, Error>`.
//!
//! There is no partial-success mode. Every error propagates to the top of the
//! run, which aborts as a whole.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for version inference runs
#[derive(Error, Debug)]
pub enum Error {
    /// The `version-inference` plugin configuration of a project is missing
    /// a required node or carries an invalid value.
    #[error("Configuration error: {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    ConfigParse {
        message: String,
        /// Optional hint for how to fix the configuration issue
        hint: Option<String>,
    },

    /// A version strategy could not produce a version.
    #[error("Strategy '{strategy}' failed: {message}")]
    Strategy { strategy: String, message: String },

    /// A version script exited unsuccessfully.
    ///
    /// `code` is `None` when the process was terminated by a signal.
    #[error("Version script {script} exited with status {}", code.map(|c| c.to_string()).unwrap_or_else(|| "signal".to_string()))]
    ScriptExit { script: String, code: Option<i32> },

    /// An error occurred while executing a Git command.
    #[error("Git command failed in {dir}: {command} - {stderr}")]
    GitCommand {
        command: String,
        dir: String,
        stderr: String,
    },

    /// A strategy returned nothing usable for a project.
    #[error("Unable to infer new version for {project} ({}); strategy returned no version", descriptor.display())]
    EmptyVersion { project: String, descriptor: PathBuf },

    /// Any strategy failure, wrapped with the project it happened for.
    #[error("Version inference failed for {project}: {source}")]
    Inference {
        project: String,
        #[source]
        source: Box<Error>,
    },

    /// A project descriptor could not be read, parsed or written.
    #[error("Descriptor error for {}: {message}", path.display())]
    Descriptor { path: PathBuf, message: String },

    /// The reactor could not be assembled from its descriptors.
    #[error("Reactor error: {message}")]
    Reactor { message: String },

    /// A circular module or parent chain was detected.
    #[error("Cycle detected: {cycle}")]
    CycleDetected { cycle: String },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A YAML parsing error, wrapped from `serde_yaml::Error`.
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A JSON serialization error, wrapped from `serde_json::Error`.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A semantic versioning error, wrapped from `semver::Error`.
    #[error("Semver error: {0}")]
    Semver(#[from] semver::Error),
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
