//! # GAV Registry
//!
//! Maps the pre-inference identity of every opted-in project to the version
//! computed for it in pass 1. The registry is only written during pass 1 and
//! only read during pass 2; the orchestrator enforces that by handing pass 2
//! a shared reference.

use std::collections::HashMap;

use crate::gav::Gav;

/// Pre-inference identity to new version string.
#[derive(Debug, Default, Clone)]
pub struct GavRegistry {
    versions: HashMap<Gav, String>,
}

impl GavRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the new version for an original identity.
    pub fn insert(&mut self, original: Gav, new_version: String) {
        self.versions.insert(original, new_version);
    }

    /// New version for an original identity, if that identity was inferred.
    pub fn get(&self, original: &Gav) -> Option<&str> {
        self.versions.get(original).map(String::as_str)
    }

    pub fn contains(&self, original: &Gav) -> bool {
        self.versions.contains_key(original)
    }

    pub fn len(&self) -> usize {
        self.versions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Gav, &str)> {
        self.versions.iter().map(|(k, v)| (k, v.as_str()))
    }
}
