//! Repository state probing through the system `git` command.
//!
//! The repository-derived strategy needs a baseline version from the nearest
//! version tag, the number of commits since that tag, whether the working
//! tree is dirty, the abbreviated commit hash and the current branch. All of
//! it is collected here by shelling out to `git`, which picks up whatever
//! configuration the user has in place.

use std::path::Path;
use std::process::Command;

use log::{debug, warn};
use semver::Version;

use crate::error::{Error, Result};

/// Number of hash characters used as build metadata.
pub const SHORT_HASH_LEN: usize = 8;

/// Tag patterns considered when looking for the baseline version.
const VERSION_TAG_PATTERNS: [&str; 2] = ["[0-9]*", "v[0-9]*"];

/// Snapshot of the repository facts a version is derived from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryState {
    /// MAJOR.MINOR.PATCH to build on, without pre-release or metadata.
    pub baseline: Version,
    /// Commits between the baseline tag (or the root commit) and HEAD.
    pub distance: u64,
    /// Whether the working tree has uncommitted changes.
    pub dirty: bool,
    /// Abbreviated HEAD commit hash.
    pub short_hash: String,
    /// Current branch, `HEAD` when detached.
    pub branch: String,
    /// The tag the baseline was taken from, if any.
    pub tag: Option<String>,
}

/// Collect the repository state for the working tree containing `dir`.
///
/// When the nearest version tag is behind HEAD the baseline patch number is
/// incremented, since HEAD is already past that release. Without any version
/// tag the baseline is `0.0.0` and the distance counts every commit.
pub fn describe_repository(dir: &Path) -> Result<RepositoryState> {
    let head = run_git(dir, &["rev-parse", "HEAD"])?;
    let short_hash: String = head.chars().take(SHORT_HASH_LEN).collect();
    let branch = run_git(dir, &["rev-parse", "--abbrev-ref", "HEAD"])?;
    let dirty = !run_git(dir, &["status", "--porcelain"])?.is_empty();

    let described = describe_nearest_tag(dir).and_then(|(tag, distance)| {
        match parse_version_tag(&tag) {
            Some(version) => Some((tag, version, distance)),
            None => {
                warn!("Ignoring tag '{}': not a version", tag);
                None
            }
        }
    });

    let state = match described {
        Some((tag, version, distance)) => {
            let baseline = baseline_after(&tag, version, distance)?;
            RepositoryState {
                baseline,
                distance,
                dirty,
                short_hash,
                branch,
                tag: Some(tag),
            }
        }
        None => {
            let count = run_git(dir, &["rev-list", "--count", "HEAD"])?;
            let distance = count.parse::<u64>().map_err(|e| Error::GitCommand {
                command: "rev-list --count HEAD".to_string(),
                dir: dir.display().to_string(),
                stderr: format!("unexpected output '{}': {}", count, e),
            })?;
            RepositoryState {
                baseline: Version::new(0, 0, 0),
                distance,
                dirty,
                short_hash,
                branch,
                tag: None,
            }
        }
    };

    debug!("Repository state for {}: {:?}", dir.display(), state);
    Ok(state)
}

/// Baseline for a HEAD `distance` commits past the tagged `version`.
pub fn baseline_after(tag: &str, version: Version, distance: u64) -> Result<Version> {
    if distance == 0 {
        return Ok(version);
    }
    let patch = version.patch.checked_add(1).ok_or_else(|| Error::Strategy {
        strategy: "git".to_string(),
        message: format!("Cannot increment patch number of tag '{}'", tag),
    })?;
    Ok(Version::new(version.major, version.minor, patch))
}

/// Nearest version tag reachable from HEAD and the distance to it.
fn describe_nearest_tag(dir: &Path) -> Option<(String, u64)> {
    let mut args = vec!["describe", "--tags", "--long"];
    for pattern in VERSION_TAG_PATTERNS {
        args.push("--match");
        args.push(pattern);
    }
    args.push("HEAD");

    match run_git(dir, &args) {
        Ok(output) => parse_describe(&output),
        Err(e) => {
            // describe fails when no tag matches
            debug!("No version tag found: {}", e);
            None
        }
    }
}

/// Split `git describe --long` output (`<tag>-<distance>-g<hash>`).
pub fn parse_describe(output: &str) -> Option<(String, u64)> {
    let mut parts = output.trim().rsplitn(3, '-');
    let hash = parts.next()?;
    let distance = parts.next()?.parse().ok()?;
    let tag = parts.next()?;
    if !hash.starts_with('g') || tag.is_empty() {
        return None;
    }
    Some((tag.to_string(), distance))
}

/// Parse a tag into a MAJOR.MINOR.PATCH baseline.
///
/// Accepts an optional `v` prefix and up to three numeric components, missing
/// ones defaulting to zero. Pre-release and build metadata are dropped.
pub fn parse_version_tag(tag: &str) -> Option<Version> {
    let version_str = tag.strip_prefix('v').unwrap_or(tag);

    if let Ok(version) = Version::parse(version_str) {
        return Some(Version::new(version.major, version.minor, version.patch));
    }

    let core = version_str
        .split(['-', '+'])
        .next()
        .filter(|core| !core.is_empty())?;
    let numbers = core
        .split('.')
        .map(|part| part.parse::<u64>().ok())
        .collect::<Option<Vec<u64>>>()?;

    match numbers.as_slice() {
        [major] => Some(Version::new(*major, 0, 0)),
        [major, minor] => Some(Version::new(*major, *minor, 0)),
        [major, minor, patch] => Some(Version::new(*major, *minor, *patch)),
        _ => None,
    }
}

/// Run `git <args>` in `dir` and return its trimmed stdout.
fn run_git(dir: &Path, args: &[&str]) -> Result<String> {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .map_err(|e| Error::GitCommand {
            command: args.join(" "),
            dir: dir.display().to_string(),
            stderr: e.to_string(),
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::GitCommand {
            command: args.join(" "),
            dir: dir.display().to_string(),
            stderr: stderr.trim().to_string(),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}
