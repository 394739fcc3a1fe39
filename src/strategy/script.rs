//! Strategy which executes a script or executable to resolve the version.
//!
//! The command runs without arguments in the project directory with stderr
//! merged into stdout. The first output line is the version; the process is
//! always awaited (there is no timeout) and a non-zero exit fails the
//! strategy whatever it printed. Background processes left behind by the
//! script are not waited on.

use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;

use log::{debug, error};
use serde::Deserialize;
use serde_yaml::Value;

use super::{settings, ProjectContext, VersionStrategy};
use crate::error::{Error, Result};

pub const HINT: &str = "script";

pub const DEFAULT_SCRIPT: &str = "./version.sh";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ScriptSettings {
    /// Command to execute. Relative paths with a directory component are
    /// resolved against the project directory; bare names go through `PATH`.
    #[serde(default = "default_script")]
    pub script: String,
}

fn default_script() -> String {
    DEFAULT_SCRIPT.to_string()
}

#[derive(Debug, Clone)]
pub struct ScriptStrategy {
    settings: ScriptSettings,
}

impl ScriptStrategy {
    pub fn new(settings: ScriptSettings) -> Self {
        Self { settings }
    }

    pub fn from_config(node: &Value) -> Result<Box<dyn VersionStrategy>> {
        Ok(Box::new(Self::new(settings(HINT, node)?)))
    }

    fn program(&self, basedir: &Path) -> PathBuf {
        let script = Path::new(&self.settings.script);
        if script.is_relative() && script.components().count() > 1 {
            basedir.join(script)
        } else {
            script.to_path_buf()
        }
    }

    fn failure(&self, e: io::Error) -> Error {
        Error::Strategy {
            strategy: HINT.to_string(),
            message: format!("Failed to execute script {}: {}", self.settings.script, e),
        }
    }
}

impl VersionStrategy for ScriptStrategy {
    fn name(&self) -> &str {
        HINT
    }

    fn version(&self, project: &mut ProjectContext<'_>) -> Result<Option<String>> {
        let program = self.program(project.basedir);
        debug!("Executing version script {}", program.display());

        let (reader, writer) = io::pipe().map_err(|e| self.failure(e))?;
        let mut child = Command::new(&program)
            .current_dir(project.basedir)
            .stdin(Stdio::null())
            .stdout(writer.try_clone().map_err(|e| self.failure(e))?)
            .stderr(writer)
            .spawn()
            .map_err(|e| self.failure(e))?;

        let mut output = BufReader::new(reader);
        let mut line = String::new();
        let read = output.read_line(&mut line);
        // the rest is drained off-thread so the script cannot block on a full
        // pipe; descendants holding the pipe open must not delay the exit
        thread::spawn(move || io::copy(&mut output, &mut io::sink()));
        let status = child.wait().map_err(|e| self.failure(e))?;

        if !status.success() {
            error!("Execution Exit Code: {:?}", status.code());
            return Err(Error::ScriptExit {
                script: self.settings.script.clone(),
                code: status.code(),
            });
        }

        if read.map_err(|e| self.failure(e))? == 0 {
            return Ok(None);
        }

        let line = line.strip_suffix('\n').unwrap_or(&line);
        let line = line.strip_suffix('\r').unwrap_or(line);
        Ok(Some(line.to_string()))
    }
}
