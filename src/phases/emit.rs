//! Phase 4: Emission
//!
//! Writes the rewritten descriptor of every opted-in project and redirects
//! the project to it, so the downstream build reads the new versions.
//!
//! ## Targets
//!
//! - `generateTemporaryFile: true`: a fresh `project*.version-inference` file
//!   in the system temporary directory.
//! - otherwise: `project.yaml.new-version` next to the original descriptor.
//!
//! With `deleteTemporaryFile: true` the written file is removed when the
//! returned guards are dropped, which the orchestrator ties to the lifetime
//! of the run outcome.

use std::io;
use std::path::{Path, PathBuf};

use log::debug;
use tempfile::TempPath;

use super::InferenceContext;
use crate::descriptor::{DescriptorIo, DESCRIPTOR_FILE_NAME};
use crate::error::Result;
use crate::reactor::Reactor;

/// Prefix of temporary descriptor files.
pub const TEMPORARY_PREFIX: &str = "project";

/// Suffix of temporary descriptor files.
pub const TEMPORARY_SUFFIX: &str = ".version-inference";

/// Suffix appended to the descriptor name for sibling targets.
pub const SIBLING_SUFFIX: &str = ".new-version";

/// Execute Phase 4: write every opted-in project's descriptor.
///
/// Returns the cleanup guards of files that must not outlive the run.
pub fn execute(
    reactor: &mut Reactor,
    ctx: &InferenceContext,
    io: &dyn DescriptorIo,
) -> Result<Vec<TempPath>> {
    let mut cleanup = Vec::new();

    for index in 0..reactor.len() {
        let Some(config) = ctx.configs.cached(index) else {
            continue;
        };
        let node = reactor.node_mut(index);

        let (target, guard) = if config.generate_temporary_file {
            let temp = tempfile::Builder::new()
                .prefix(TEMPORARY_PREFIX)
                .suffix(TEMPORARY_SUFFIX)
                .tempfile()?
                .into_temp_path();
            let target = temp.to_path_buf();
            if config.delete_temporary_file {
                (target, Some(temp))
            } else {
                temp.keep().map_err(io::Error::from)?;
                (target, None)
            }
        } else {
            let target = sibling_target(&node.basedir);
            let guard = config
                .delete_temporary_file
                .then(|| TempPath::from_path(&target));
            (target, guard)
        };

        io.write(&node.descriptor, &target)?;
        debug!(
            "Emitted descriptor for {} to {}",
            node.coordinates(),
            target.display()
        );
        node.descriptor_path = target;
        cleanup.extend(guard);
    }

    Ok(cleanup)
}

/// `<basedir>/project.yaml.new-version`.
pub fn sibling_target(basedir: &Path) -> PathBuf {
    basedir.join(format!("{}{}", DESCRIPTOR_FILE_NAME, SIBLING_SUFFIX))
}
