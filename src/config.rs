//! # Plugin Configuration
//!
//! Each project opts into version inference through the
//! `plugins.version-inference` node of its descriptor:
//!
//! ```yaml
//! plugins:
//!   version-inference:
//!     strategy:
//!       hint: git
//!       preReleaseStage: beta
//!     generateTemporaryFile: false
//!     deleteTemporaryFile: false
//!     updateDependencies: true
//! ```
//!
//! ## Resolution
//!
//! A project without its own node inherits the nearest node found along its
//! in-reactor parent chain. `skip: true` opts a project (and the children
//! inheriting from it) out again. Projects with no node at all are left
//! untouched by a run.
//!
//! The `strategy` node is mandatory for an opted-in project and is turned
//! into a `VersionStrategy` through the `StrategyRegistry` as soon as the
//! configuration is resolved, so configuration mistakes surface before any
//! version is computed.
//!
//! `PluginConfigProvider` resolves configurations lazily and caches them for
//! the rest of the run.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use serde_yaml::{Mapping, Value};

use crate::error::{Error, Result};
use crate::reactor::Reactor;
use crate::strategy::{StrategyRegistry, VersionStrategy};

/// Key of the plugin node under a descriptor's `plugins`.
pub const PLUGIN_NAME: &str = "version-inference";

/// Name of the node selecting and tuning the version strategy.
pub const STRATEGY_NODE_NAME: &str = "strategy";

/// Resolved configuration of an opted-in project.
#[derive(Debug)]
pub struct PluginConfig {
    /// Emit the rewritten descriptor to a fresh temporary file instead of a
    /// sibling of the original.
    pub generate_temporary_file: bool,
    /// Remove the emitted descriptor once the run outcome is dropped.
    pub delete_temporary_file: bool,
    /// Rewrite dependency versions that point at other reactor projects.
    pub update_dependencies: bool,
    pub strategy: Box<dyn VersionStrategy>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct PluginNode {
    #[serde(default)]
    skip: bool,
    #[serde(default)]
    strategy: Option<Value>,
    #[serde(default)]
    generate_temporary_file: bool,
    #[serde(default)]
    delete_temporary_file: bool,
    #[serde(default)]
    update_dependencies: bool,
}

impl PluginConfig {
    /// Build the configuration from a `version-inference` node.
    ///
    /// Returns `Ok(None)` when the node sets `skip: true`.
    pub fn from_node(
        node: &Value,
        descriptor: &Path,
        strategies: &StrategyRegistry,
    ) -> Result<Option<Self>> {
        let node = match node {
            Value::Null => Value::Mapping(Mapping::new()),
            other => other.clone(),
        };
        let parsed: PluginNode = serde_yaml::from_value(node).map_err(|e| Error::ConfigParse {
            message: format!(
                "Invalid {} configuration in {}: {}",
                PLUGIN_NAME,
                descriptor.display(),
                e
            ),
            hint: None,
        })?;
        if parsed.skip {
            return Ok(None);
        }

        let strategy_node = parsed.strategy.ok_or_else(|| Error::ConfigParse {
            message: format!(
                "Missing config; {} node is required in {}",
                STRATEGY_NODE_NAME,
                descriptor.display()
            ),
            hint: Some(format!(
                "Add `{}: {{ hint: git }}` under plugins.{}",
                STRATEGY_NODE_NAME, PLUGIN_NAME
            )),
        })?;
        let strategy = strategies
            .create(&strategy_node)
            .map_err(|e| locate(e, descriptor))?;

        Ok(Some(Self {
            generate_temporary_file: parsed.generate_temporary_file,
            delete_temporary_file: parsed.delete_temporary_file,
            update_dependencies: parsed.update_dependencies,
            strategy,
        }))
    }

    /// Resolve the configuration of reactor project `index`, following its
    /// parent chain until a `version-inference` node is found.
    pub fn for_project(
        reactor: &Reactor,
        index: usize,
        strategies: &StrategyRegistry,
    ) -> Result<Option<Self>> {
        let mut visited: Vec<usize> = Vec::new();
        let mut current = Some(index);

        while let Some(i) = current {
            if visited.contains(&i) {
                let cycle = visited
                    .iter()
                    .chain(std::iter::once(&i))
                    .map(|&n| reactor.node(n).coordinates())
                    .collect::<Vec<_>>()
                    .join(" -> ");
                return Err(Error::CycleDetected { cycle });
            }
            visited.push(i);

            let node = reactor.node(i);
            if let Some(plugin) = node.descriptor.plugins.get(PLUGIN_NAME) {
                return Self::from_node(plugin, &node.descriptor_path, strategies);
            }
            current = node.parent;
        }

        Ok(None)
    }
}

fn locate(err: Error, descriptor: &Path) -> Error {
    match err {
        Error::ConfigParse { message, hint } => Error::ConfigParse {
            message: format!("{} (in {})", message, descriptor.display()),
            hint,
        },
        other => other,
    }
}

/// Per-run cache of resolved plugin configurations, keyed by reactor index.
#[derive(Debug, Default)]
pub struct PluginConfigProvider {
    configs: HashMap<usize, Option<PluginConfig>>,
}

impl PluginConfigProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration of project `index`, resolved on first request.
    pub fn get_for_project(
        &mut self,
        reactor: &Reactor,
        index: usize,
        strategies: &StrategyRegistry,
    ) -> Result<Option<&PluginConfig>> {
        let config = match self.configs.entry(index) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                entry.insert(PluginConfig::for_project(reactor, index, strategies)?)
            }
        };
        Ok(config.as_ref())
    }

    /// Configuration of project `index` if it was already resolved and the
    /// project is opted in.
    pub fn cached(&self, index: usize) -> Option<&PluginConfig> {
        self.configs.get(&index).and_then(Option::as_ref)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{Descriptor, DESCRIPTOR_FILE_NAME};
    use crate::reactor::ProjectNode;
    use std::path::PathBuf;

    fn project(dir: &str, yaml: &str) -> ProjectNode {
        ProjectNode::from_descriptor(
            PathBuf::from(dir).join(DESCRIPTOR_FILE_NAME),
            Descriptor::parse(yaml).unwrap(),
        )
        .unwrap()
    }

    fn node(yaml: &str) -> Value {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_from_node_defaults() {
        let config = PluginConfig::from_node(
            &node("strategy: { hint: file }"),
            Path::new("project.yaml"),
            &StrategyRegistry::default(),
        )
        .unwrap()
        .unwrap();

        assert!(!config.generate_temporary_file);
        assert!(!config.delete_temporary_file);
        assert!(!config.update_dependencies);
        assert_eq!(config.strategy.name(), "file");
    }

    #[test]
    fn test_from_node_flags() {
        let config = PluginConfig::from_node(
            &node(
                "strategy: { hint: git, snapshot: true }\ngenerateTemporaryFile: true\ndeleteTemporaryFile: true\nupdateDependencies: true",
            ),
            Path::new("project.yaml"),
            &StrategyRegistry::default(),
        )
        .unwrap()
        .unwrap();

        assert!(config.generate_temporary_file);
        assert!(config.delete_temporary_file);
        assert!(config.update_dependencies);
        assert_eq!(config.strategy.name(), "git");
    }

    #[test]
    fn test_missing_strategy_names_descriptor() {
        let err = PluginConfig::from_node(
            &node("updateDependencies: true"),
            Path::new("/work/core/project.yaml"),
            &StrategyRegistry::default(),
        )
        .unwrap_err();

        let display = err.to_string();
        assert!(display.contains("strategy node is required"));
        assert!(display.contains("/work/core/project.yaml"));
    }

    #[test]
    fn test_empty_node_is_missing_strategy() {
        let err = PluginConfig::from_node(
            &Value::Null,
            Path::new("project.yaml"),
            &StrategyRegistry::default(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::ConfigParse { .. }));
    }

    #[test]
    fn test_unknown_hint_names_descriptor() {
        let err = PluginConfig::from_node(
            &node("strategy: { hint: svn }"),
            Path::new("/work/core/project.yaml"),
            &StrategyRegistry::default(),
        )
        .unwrap_err();

        let display = err.to_string();
        assert!(display.contains("Unknown strategy 'svn'"));
        assert!(display.contains("/work/core/project.yaml"));
    }

    #[test]
    fn test_unknown_flag_is_rejected() {
        let err = PluginConfig::from_node(
            &node("strategy: { hint: git }\nupdateDependency: true"),
            Path::new("project.yaml"),
            &StrategyRegistry::default(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("Invalid version-inference configuration"));
    }

    #[test]
    fn test_skip_opts_out() {
        let config = PluginConfig::from_node(
            &node("skip: true"),
            Path::new("project.yaml"),
            &StrategyRegistry::default(),
        )
        .unwrap();
        assert!(config.is_none());
    }

    #[test]
    fn test_config_inherited_from_parent() {
        let reactor = Reactor::new(vec![
            project(
                "/work",
                "group: g\nartifact: parent\nversion: '1.0'\nplugins:\n  version-inference:\n    strategy: { hint: file }\n    updateDependencies: true\n",
            ),
            project(
                "/work/child",
                "artifact: child\nparent: { group: g, artifact: parent, version: '1.0' }\n",
            ),
            project("/other", "group: g\nartifact: other\nversion: '1.0'\n"),
        ])
        .unwrap();
        let strategies = StrategyRegistry::default();

        let child = PluginConfig::for_project(&reactor, 1, &strategies)
            .unwrap()
            .unwrap();
        assert!(child.update_dependencies);
        assert_eq!(child.strategy.name(), "file");

        assert!(PluginConfig::for_project(&reactor, 2, &strategies)
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_own_node_overrides_parent() {
        let reactor = Reactor::new(vec![
            project(
                "/work",
                "group: g\nartifact: parent\nversion: '1.0'\nplugins:\n  version-inference:\n    strategy: { hint: file }\n",
            ),
            project(
                "/work/child",
                "artifact: child\nparent: { group: g, artifact: parent, version: '1.0' }\nplugins:\n  version-inference:\n    skip: true\n",
            ),
        ])
        .unwrap();

        assert!(
            PluginConfig::for_project(&reactor, 1, &StrategyRegistry::default())
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn test_parent_cycle_is_detected() {
        let reactor = Reactor::new(vec![
            project(
                "/a",
                "group: g\nartifact: a\nversion: '1.0'\nparent: { group: g, artifact: b, version: '1.0' }\n",
            ),
            project(
                "/b",
                "group: g\nartifact: b\nversion: '1.0'\nparent: { group: g, artifact: a, version: '1.0' }\n",
            ),
        ])
        .unwrap();

        let err = PluginConfig::for_project(&reactor, 0, &StrategyRegistry::default()).unwrap_err();
        assert!(matches!(err, Error::CycleDetected { .. }));
    }

    #[test]
    fn test_provider_caches_resolution() {
        let reactor = Reactor::new(vec![
            project(
                "/work",
                "group: g\nartifact: a\nversion: '1.0'\nplugins:\n  version-inference:\n    strategy: { hint: script }\n",
            ),
            project("/other", "group: g\nartifact: b\nversion: '1.0'\n"),
        ])
        .unwrap();
        let strategies = StrategyRegistry::default();
        let mut provider = PluginConfigProvider::new();

        assert!(provider.cached(0).is_none());
        let first = provider
            .get_for_project(&reactor, 0, &strategies)
            .unwrap()
            .map(|config| config as *const PluginConfig);
        let second = provider
            .get_for_project(&reactor, 0, &strategies)
            .unwrap()
            .map(|config| config as *const PluginConfig);
        assert!(first.is_some());
        assert_eq!(first, second);
        assert_eq!(provider.cached(0).unwrap().strategy.name(), "script");

        assert!(provider
            .get_for_project(&reactor, 1, &strategies)
            .unwrap()
            .is_none());
        assert!(provider.cached(1).is_none());
    }
}
