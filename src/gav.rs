//! # Project Identity
//!
//! A `Gav` is the (group, artifact, version) triple that identifies a project
//! or a dependency reference. Identity comparison is case-insensitive on all
//! three fields. Fields are lower-cased once at construction, so the derived
//! `PartialEq`, `Eq` and `Hash` implementations agree with each other and a
//! `Gav` can be used directly as a map key.

use std::fmt;

/// Case-insensitive (group, artifact, version) identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Gav {
    group: String,
    artifact: String,
    version: String,
}

impl Gav {
    /// Build an identity, normalizing every field to lower case.
    pub fn of(group: &str, artifact: &str, version: &str) -> Self {
        Self {
            group: group.to_lowercase(),
            artifact: artifact.to_lowercase(),
            version: version.to_lowercase(),
        }
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    pub fn artifact(&self) -> &str {
        &self.artifact
    }

    pub fn version(&self) -> &str {
        &self.version
    }
}

impl fmt::Display for Gav {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group, self.artifact, self.version)
    }
}
