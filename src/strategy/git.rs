//! Repository-derived version strategy.
//!
//! The version is built from the repository state collected by
//! [`crate::git::describe_repository`]:
//!
//! | snapshot | distance > 0 | dirty | result |
//! |---|---|---|---|
//! | true | true | any | `MAJOR.MINOR.PATCH-SNAPSHOT` |
//! | any | false | false | `MAJOR.MINOR.PATCH` |
//! | otherwise | | | `MAJOR.MINOR.PATCH-{stage}.{distance}[.{dirtyQualifier}]+{hash}` |
//!
//! Besides returning the version, the strategy publishes its components as
//! project properties (see the `*_PROPERTY` constants).

use std::collections::BTreeMap;

use log::debug;
use semver::{BuildMetadata, Prerelease, Version};
use serde::Deserialize;
use serde_yaml::Value;

use super::{settings, ProjectContext, VersionStrategy};
use crate::error::Result;
use crate::git::{describe_repository, RepositoryState};

pub const HINT: &str = "git";

pub const DEFAULT_NON_QUALIFIER_BRANCHES: &str = "master";
pub const DEFAULT_PRE_RELEASE_STAGE: &str = "dev";
pub const DEFAULT_DIRTY_QUALIFIER: &str = "uncommitted";
pub const SNAPSHOT_QUALIFIER: &str = "SNAPSHOT";

pub const PROPERTY_PREFIX: &str = "project.";
pub const NORMAL_VERSION_PROPERTY: &str = "project.normalVersion";
pub const PRE_RELEASE_VERSION_PROPERTY: &str = "project.preReleaseVersion";
pub const BUILD_METADATA_PROPERTY: &str = "project.buildMetadata";
pub const FULL_INFERRED_VERSION_PROPERTY: &str = "project.fullInferredVersion";
pub const DOCKER_SAFE_VERSION_PROPERTY: &str = "project.dockerSafeVersion";

/// Tunables of the `git` strategy.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct GitSettings {
    /// Comma-separated branches that never get a branch qualifier.
    #[serde(default = "default_non_qualifier_branches")]
    pub non_qualifier_branches: String,
    #[serde(default = "default_pre_release_stage")]
    pub pre_release_stage: String,
    #[serde(default = "default_dirty_qualifier")]
    pub dirty_qualifier: String,
    #[serde(default)]
    pub snapshot: bool,
}

fn default_non_qualifier_branches() -> String {
    DEFAULT_NON_QUALIFIER_BRANCHES.to_string()
}

fn default_pre_release_stage() -> String {
    DEFAULT_PRE_RELEASE_STAGE.to_string()
}

fn default_dirty_qualifier() -> String {
    DEFAULT_DIRTY_QUALIFIER.to_string()
}

impl Default for GitSettings {
    fn default() -> Self {
        Self {
            non_qualifier_branches: default_non_qualifier_branches(),
            pre_release_stage: default_pre_release_stage(),
            dirty_qualifier: default_dirty_qualifier(),
            snapshot: false,
        }
    }
}

impl GitSettings {
    /// Whether `branch` is listed in `non_qualifier_branches`.
    pub fn is_non_qualifier_branch(&self, branch: &str) -> bool {
        self.non_qualifier_branches
            .split(',')
            .map(str::trim)
            .any(|candidate| candidate == branch)
    }
}

/// Derives the version from the git repository containing the project.
#[derive(Debug, Clone, Default)]
pub struct GitVersionStrategy {
    settings: GitSettings,
}

impl GitVersionStrategy {
    pub fn new(settings: GitSettings) -> Self {
        Self { settings }
    }

    pub fn from_config(node: &Value) -> Result<Box<dyn VersionStrategy>> {
        Ok(Box::new(Self::new(settings(HINT, node)?)))
    }

    pub fn settings(&self) -> &GitSettings {
        &self.settings
    }
}

impl VersionStrategy for GitVersionStrategy {
    fn name(&self) -> &str {
        HINT
    }

    fn version(&self, project: &mut ProjectContext<'_>) -> Result<Option<String>> {
        let state = describe_repository(project.basedir)?;
        if !self.settings.is_non_qualifier_branch(&state.branch) {
            debug!(
                "{} is on qualifier branch '{}'; the version carries no branch qualifier",
                project.identity, state.branch
            );
        }

        let version = infer_version(&state, &self.settings)?;
        publish_properties(project.properties, &version);
        Ok(Some(version.to_string()))
    }
}

/// Apply the version decision procedure to a repository state.
pub fn infer_version(state: &RepositoryState, settings: &GitSettings) -> Result<Version> {
    let mut version = Version::new(
        state.baseline.major,
        state.baseline.minor,
        state.baseline.patch,
    );

    // SNAPSHOT builds ignore the dirty state and the commit hash.
    if settings.snapshot && state.distance > 0 {
        version.pre = Prerelease::new(SNAPSHOT_QUALIFIER)?;
        return Ok(version);
    }

    if state.dirty || state.distance > 0 {
        let mut pre_release = format!("{}.{}", settings.pre_release_stage, state.distance);
        if state.dirty {
            pre_release.push('.');
            pre_release.push_str(&settings.dirty_qualifier);
        }
        version.pre = Prerelease::new(&pre_release)?;
        if !state.short_hash.is_empty() {
            version.build = BuildMetadata::new(&state.short_hash)?;
        }
    }

    Ok(version)
}

/// Publish the components of `version` as project properties.
pub fn publish_properties(properties: &mut BTreeMap<String, String>, version: &Version) {
    let full = version.to_string();
    properties.insert(
        NORMAL_VERSION_PROPERTY.to_string(),
        format!("{}.{}.{}", version.major, version.minor, version.patch),
    );
    properties.insert(
        PRE_RELEASE_VERSION_PROPERTY.to_string(),
        version.pre.as_str().to_string(),
    );
    properties.insert(
        BUILD_METADATA_PROPERTY.to_string(),
        version.build.as_str().to_string(),
    );
    properties.insert(DOCKER_SAFE_VERSION_PROPERTY.to_string(), full.replace('+', "-"));
    properties.insert(FULL_INFERRED_VERSION_PROPERTY.to_string(), full);
}
