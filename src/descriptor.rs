//! # Project Descriptors
//!
//! This module defines the in-memory model of a `project.yaml` descriptor and
//! the I/O collaborator used to read and write it.
//!
//! ## Key Components
//!
//! - **`Descriptor`**: The structured model. Only the fields the version
//!   engine cares about are typed (identity, parent, modules, dependencies,
//!   build output name, properties, plugin configuration). Everything else is
//!   kept in `extra` maps so that a rewritten descriptor loses nothing.
//!
//! - **`DescriptorIo`**: The read/write seam. The engine never touches the
//!   file format directly; `YamlDescriptorIo` is the implementation used by
//!   the CLI.
//!
//! Version fields accept strings and plain YAML integers (`version: 3`).
//! Floating point numbers are rejected: YAML would read `1.10` as `1.1`, so
//! such versions have to be quoted.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use log::debug;
use serde::{de, Deserialize, Deserializer, Serialize};
use serde_yaml::{Mapping, Value};

use crate::error::{Error, Result};

/// File name of a project descriptor inside its base directory.
pub const DESCRIPTOR_FILE_NAME: &str = "project.yaml";

/// A project descriptor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Descriptor {
    /// Group of the project; inherited from the parent reference when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    pub artifact: String,
    /// Version of the project; inherited from the parent reference when absent.
    #[serde(
        default,
        deserialize_with = "optional_scalar",
        skip_serializing_if = "Option::is_none"
    )]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<ParentRef>,
    /// Relative directories of aggregated child projects.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub modules: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<Dependency>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build: Option<Build>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, Value>,
    /// Plugin configuration nodes keyed by plugin name.
    #[serde(default, skip_serializing_if = "Mapping::is_empty")]
    pub plugins: Mapping,
    #[serde(flatten)]
    pub extra: Mapping,
}

/// Reference to a parent project.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParentRef {
    pub group: String,
    pub artifact: String,
    #[serde(deserialize_with = "scalar")]
    pub version: String,
    #[serde(flatten)]
    pub extra: Mapping,
}

/// A declared dependency.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dependency {
    pub group: String,
    pub artifact: String,
    /// Declared version; dependencies managed elsewhere carry none.
    #[serde(
        default,
        deserialize_with = "optional_scalar",
        skip_serializing_if = "Option::is_none"
    )]
    pub version: Option<String>,
    #[serde(flatten)]
    pub extra: Mapping,
}

/// Build settings of a project.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Build {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_name: Option<String>,
    #[serde(flatten)]
    pub extra: Mapping,
}

/// Text of a scalar YAML value; `None` for sequences, mappings and null.
pub fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Text of a version scalar: a string or an integer.
fn version_text<E: de::Error>(value: &Value) -> std::result::Result<String, E> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) if n.is_f64() => Err(E::custom(format!(
            "version is read as the floating point number {}, quote it to keep it as written",
            n
        ))),
        Value::Number(n) => Ok(n.to_string()),
        _ => Err(E::custom("expected a version string")),
    }
}

fn scalar<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<String, D::Error> {
    version_text(&Value::deserialize(deserializer)?)
}

fn optional_scalar<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Option<String>, D::Error> {
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(value) => version_text(&value).map(Some),
    }
}

impl Descriptor {
    /// Parse a descriptor from YAML text.
    pub fn parse(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Render the descriptor as YAML text.
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}

/// Reads and writes descriptors on behalf of the engine.
pub trait DescriptorIo {
    /// Parse the descriptor stored at `path`.
    fn read(&self, path: &Path) -> Result<Descriptor>;

    /// Serialize `descriptor` to `path`, replacing any existing content.
    fn write(&self, descriptor: &Descriptor, path: &Path) -> Result<()>;
}

/// `DescriptorIo` backed by YAML files on disk.
#[derive(Debug, Default, Clone, Copy)]
pub struct YamlDescriptorIo;

impl DescriptorIo for YamlDescriptorIo {
    fn read(&self, path: &Path) -> Result<Descriptor> {
        let content = fs::read_to_string(path).map_err(|e| Error::Descriptor {
            path: path.to_path_buf(),
            message: format!("Failed to read descriptor: {}", e),
        })?;
        Descriptor::parse(&content).map_err(|e| Error::Descriptor {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    fn write(&self, descriptor: &Descriptor, path: &Path) -> Result<()> {
        let content = descriptor.to_yaml().map_err(|e| Error::Descriptor {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        fs::write(path, content).map_err(|e| Error::Descriptor {
            path: path.to_path_buf(),
            message: format!("Failed to write descriptor: {}", e),
        })?;
        debug!("Wrote descriptor {}", path.display());
        Ok(())
    }
}
