//! Strategy which reads the version from the first line of a file, such as a
//! `VERSION` file containing `1.2.3`. Any other file layout is unsupported.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;

use serde::Deserialize;
use serde_yaml::Value;

use super::{settings, ProjectContext, VersionStrategy};
use crate::error::{Error, Result};

pub const HINT: &str = "file";

pub const DEFAULT_VERSION_FILE: &str = "VERSION";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FileSettings {
    /// Path of the version file, relative to the project directory.
    #[serde(default = "default_version_file", alias = "versionFilePath")]
    pub version_file: PathBuf,
}

fn default_version_file() -> PathBuf {
    PathBuf::from(DEFAULT_VERSION_FILE)
}

#[derive(Debug, Clone)]
pub struct FileStrategy {
    settings: FileSettings,
}

impl FileStrategy {
    pub fn new(settings: FileSettings) -> Self {
        Self { settings }
    }

    pub fn from_config(node: &Value) -> Result<Box<dyn VersionStrategy>> {
        Ok(Box::new(Self::new(settings(HINT, node)?)))
    }
}

impl VersionStrategy for FileStrategy {
    fn name(&self) -> &str {
        HINT
    }

    fn version(&self, project: &mut ProjectContext<'_>) -> Result<Option<String>> {
        let path = project.basedir.join(&self.settings.version_file);
        let failure = |e: std::io::Error| Error::Strategy {
            strategy: HINT.to_string(),
            message: format!("Failed to read version file: [{}]: {}", path.display(), e),
        };

        let mut reader = BufReader::new(File::open(&path).map_err(failure)?);
        let mut line = String::new();
        if reader.read_line(&mut line).map_err(failure)? == 0 {
            return Ok(None);
        }

        let line = line.strip_suffix('\n').unwrap_or(&line);
        let line = line.strip_suffix('\r').unwrap_or(line);
        Ok(Some(line.to_string()))
    }
}
