//! # Version Strategies
//!
//! A version strategy turns a project's local context into a version string.
//! Strategies are selected per project by the `hint` attribute of the
//! `strategy` configuration node and built through a `StrategyRegistry`,
//! which maps each hint to a factory.
//!
//! ## Built-in Strategies
//!
//! - **`git`** (`git::GitVersionStrategy`): semantic version derived from the
//!   nearest version tag, commit distance, dirty state and commit hash.
//! - **`file`** (`file::FileStrategy`): first line of a version file.
//! - **`script`** (`script::ScriptStrategy`): first output line of an
//!   external command.
//!
//! Additional strategies can be registered with `StrategyRegistry::register`.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde_yaml::Value;

use crate::error::{Error, Result};
use crate::gav::Gav;

pub mod file;
pub mod git;
pub mod script;

/// Name of the attribute selecting the strategy inside the `strategy` node.
pub const STRATEGY_HINT: &str = "hint";

/// What a strategy gets to see of the project it computes a version for.
pub struct ProjectContext<'a> {
    /// Identity of the project before inference.
    pub identity: &'a Gav,
    /// Directory containing the project descriptor.
    pub basedir: &'a Path,
    /// Project property bag; strategies may publish derived values here.
    pub properties: &'a mut BTreeMap<String, String>,
}

/// Computes a version for a project.
pub trait VersionStrategy: fmt::Debug {
    /// The hint this strategy is registered under.
    fn name(&self) -> &str;

    /// Compute the version for `project`.
    ///
    /// `Ok(None)` means the source produced nothing; callers treat that as a
    /// failure rather than as "keep the current version".
    fn version(&self, project: &mut ProjectContext<'_>) -> Result<Option<String>>;
}

/// Builds a configured strategy from its tunables (the `strategy` node
/// without its `hint`).
pub type StrategyFactory = fn(&Value) -> Result<Box<dyn VersionStrategy>>;

/// Maps strategy hints to factories.
#[derive(Clone)]
pub struct StrategyRegistry {
    factories: HashMap<String, StrategyFactory>,
}

impl StrategyRegistry {
    /// A registry without any strategy.
    pub fn empty() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Register `factory` under `hint`, replacing any previous registration.
    pub fn register(&mut self, hint: impl Into<String>, factory: StrategyFactory) -> &mut Self {
        self.factories.insert(hint.into(), factory);
        self
    }

    /// Registered hints in sorted order.
    pub fn hints(&self) -> Vec<&str> {
        let mut hints: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        hints.sort_unstable();
        hints
    }

    /// Build the strategy described by a `strategy` configuration node.
    pub fn create(&self, node: &Value) -> Result<Box<dyn VersionStrategy>> {
        let Value::Mapping(mapping) = node else {
            return Err(Error::ConfigParse {
                message: "Missing config; strategy must be a mapping with a hint attribute"
                    .to_string(),
                hint: Some("Use e.g. `strategy: { hint: git }`".to_string()),
            });
        };

        let hint = mapping
            .get(STRATEGY_HINT)
            .and_then(Value::as_str)
            .ok_or_else(|| Error::ConfigParse {
                message: format!("Missing config; strategy {} attribute is required", STRATEGY_HINT),
                hint: Some(format!("Known strategies: {}", self.hints().join(", "))),
            })?;

        let factory = self.factories.get(hint).ok_or_else(|| Error::ConfigParse {
            message: format!("Unknown strategy '{}'", hint),
            hint: Some(format!("Known strategies: {}", self.hints().join(", "))),
        })?;

        let mut tunables = mapping.clone();
        tunables.remove(STRATEGY_HINT);
        factory(&Value::Mapping(tunables))
    }
}

impl Default for StrategyRegistry {
    /// Registry with the `git`, `file` and `script` strategies.
    fn default() -> Self {
        let mut registry = Self::empty();
        registry
            .register(git::HINT, git::GitVersionStrategy::from_config)
            .register(file::HINT, file::FileStrategy::from_config)
            .register(script::HINT, script::ScriptStrategy::from_config);
        registry
    }
}

impl fmt::Debug for StrategyRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StrategyRegistry")
            .field("hints", &self.hints())
            .finish()
    }
}

/// Deserialize strategy tunables, reporting failures as configuration errors.
pub(crate) fn settings<T: DeserializeOwned>(hint: &str, node: &Value) -> Result<T> {
    serde_yaml::from_value(node.clone()).map_err(|e| Error::ConfigParse {
        message: format!("Invalid configuration for strategy '{}': {}", hint, e),
        hint: None,
    })
}
