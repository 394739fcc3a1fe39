//! Shared test utilities for integration and E2E tests.
//!
//! This module provides common fixtures and helper functions to reduce
//! duplication across test files.
//!
//! ## Usage
//!
//! Add `mod common;` to your test file, then use the helpers:
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     let fixture = TestFixture::new().with_descriptor(".", descriptors::FILE_ROOT);
//!     // ... test code
//! }
//! ```

use assert_fs::prelude::*;
use std::path::Path;
use std::process::Command;

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    pub use assert_cmd::cargo::cargo_bin_cmd;
    pub use assert_fs::prelude::*;
    #[allow(unused_imports)]
    pub use assert_fs::TempDir;
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::descriptors;
    #[allow(unused_imports)]
    pub use super::git;
    pub use super::TestFixture;
}

/// Common descriptor YAML snippets for testing.
#[allow(dead_code)]
pub mod descriptors {
    /// Aggregator root using the `file` strategy, with `lib` and `app` modules.
    pub const FILE_ROOT: &str = r#"
group: com.example
artifact: root
version: 1.0.0-SNAPSHOT
modules: [lib, app]
plugins:
  version-inference:
    strategy:
      hint: file
    updateDependencies: true
"#;

    /// Module inheriting identity and configuration from `FILE_ROOT`.
    pub const LIB: &str = r#"
artifact: lib
parent:
  group: com.example
  artifact: root
  version: 1.0.0-SNAPSHOT
"#;

    /// Module depending on `LIB`, with extra keys that must survive a rewrite.
    pub const APP: &str = r#"
artifact: app
description: Application
parent:
  group: com.example
  artifact: root
  version: 1.0.0-SNAPSHOT
dependencies:
  - group: com.example
    artifact: lib
    version: 1.0.0-SNAPSHOT
    scope: runtime
  - group: org.slf4j
    artifact: slf4j-api
    version: 2.0.9
"#;

    /// Single project using the `git` strategy.
    pub const GIT_ROOT: &str = r#"
group: com.example
artifact: tool
version: 0.0.0
plugins:
  version-inference:
    strategy:
      hint: git
"#;

    /// Project opted in without a `strategy` node.
    pub const MISSING_STRATEGY: &str = r#"
group: com.example
artifact: broken
version: 1.0.0
plugins:
  version-inference:
    updateDependencies: true
"#;
}

/// A test fixture that provides a temporary directory holding a reactor.
///
/// # Example
///
/// ```rust,ignore
/// let fixture = TestFixture::new()
///     .with_descriptor(".", descriptors::FILE_ROOT)
///     .with_file("VERSION", "2.0.0\n");
///
/// fixture.command().arg("apply").assert().success();
/// ```
pub struct TestFixture {
    temp_dir: assert_fs::TempDir,
}

#[allow(dead_code)]
impl TestFixture {
    /// Create a new test fixture with an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: assert_fs::TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Add a `project.yaml` in `dir` (relative to the fixture root).
    pub fn with_descriptor(self, dir: &str, content: &str) -> Self {
        self.with_file(&format!("{}/project.yaml", dir), content)
    }

    /// The `file`-strategy reactor: root, `lib` and `app` with VERSION files.
    pub fn with_file_reactor(self) -> Self {
        self.with_descriptor(".", descriptors::FILE_ROOT)
            .with_file("VERSION", "1.2.0\n")
            .with_descriptor("lib", descriptors::LIB)
            .with_file("lib/VERSION", "2.0.0\n")
            .with_descriptor("app", descriptors::APP)
            .with_file("app/VERSION", "3.0.0\n")
    }

    /// Add a file with the given path and content.
    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.temp_dir
            .child(path)
            .write_str(content)
            .expect("Failed to write file");
        self
    }

    /// Add an executable shell script.
    #[cfg(unix)]
    pub fn with_script(self, path: &str, body: &str) -> Self {
        use std::os::unix::fs::PermissionsExt;

        let fixture = self.with_file(path, &format!("#!/bin/sh\n{}\n", body));
        std::fs::set_permissions(
            fixture.path().join(path),
            std::fs::Permissions::from_mode(0o755),
        )
        .expect("Failed to make script executable");
        fixture
    }

    /// Get the path to the temporary directory.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Create a child path in the temp directory.
    pub fn child(&self, path: &str) -> assert_fs::fixture::ChildPath {
        self.temp_dir.child(path)
    }

    /// Read a file of the fixture as YAML.
    pub fn read_yaml(&self, path: &str) -> serde_yaml::Value {
        let content =
            std::fs::read_to_string(self.path().join(path)).expect("Failed to read file");
        serde_yaml::from_str(&content).expect("File should be valid YAML")
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

impl TestFixture {
    /// Create a command configured to run in this fixture's directory.
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("version-infer");
        cmd.current_dir(self.path());
        cmd.env_remove("VERSION_INFER_ROOT");
        cmd.env_remove("RUST_LOG");
        cmd
    }
}

/// Helpers driving the system `git` in scratch repositories.
#[allow(dead_code)]
pub mod git {
    use super::*;

    /// Whether a usable `git` binary is on the PATH.
    pub fn available() -> bool {
        Command::new("git")
            .arg("--version")
            .output()
            .map(|output| output.status.success())
            .unwrap_or(false)
    }

    /// Run git in `dir` with a fixed identity and no signing.
    pub fn run(dir: &Path, args: &[&str]) -> String {
        let output = Command::new("git")
            .args([
                "-c",
                "user.name=Test",
                "-c",
                "user.email=test@example.com",
                "-c",
                "commit.gpgsign=false",
                "-c",
                "tag.gpgsign=false",
            ])
            .args(args)
            .current_dir(dir)
            .output()
            .expect("Failed to run git");
        assert!(
            output.status.success(),
            "git {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8_lossy(&output.stdout).trim().to_string()
    }

    /// Initialize a repository on branch `master`.
    pub fn init(dir: &Path) {
        run(dir, &["init", "--quiet"]);
        run(dir, &["symbolic-ref", "HEAD", "refs/heads/master"]);
    }

    /// Stage everything and commit.
    pub fn commit_all(dir: &Path, message: &str) {
        run(dir, &["add", "--all"]);
        run(dir, &["commit", "--quiet", "--allow-empty", "-m", message]);
    }

    pub fn tag(dir: &Path, name: &str) {
        run(dir, &["tag", name]);
    }

    /// First 8 characters of the HEAD commit hash.
    pub fn short_head(dir: &Path) -> String {
        run(dir, &["rev-parse", "HEAD"])[..8].to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_creates_temp_dir() {
        let fixture = TestFixture::new();
        assert!(fixture.path().exists());
    }

    #[test]
    fn test_fixture_with_descriptor() {
        let fixture = TestFixture::new().with_descriptor("lib", descriptors::LIB);
        assert!(fixture.path().join("lib/project.yaml").exists());
    }

    #[test]
    fn test_descriptors_are_valid_yaml() {
        let descriptors = [
            descriptors::FILE_ROOT,
            descriptors::LIB,
            descriptors::APP,
            descriptors::GIT_ROOT,
            descriptors::MISSING_STRATEGY,
        ];

        for descriptor in descriptors {
            serde_yaml::from_str::<serde_yaml::Value>(descriptor)
                .expect("Descriptor should be valid YAML");
        }
    }
}
