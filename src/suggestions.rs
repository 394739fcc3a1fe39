//! # Error Suggestions
//!
//! Helpers producing CLI errors that say what went wrong AND how to fix it.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use version_infer::suggestions;
//!
//! // Instead of:
//! anyhow::bail!("Project descriptor not found: {}", path.display());
//!
//! // Use:
//! return Err(suggestions::descriptor_not_found(path));
//! ```

use std::path::Path;

use crate::config::PLUGIN_NAME;
use crate::descriptor::DESCRIPTOR_FILE_NAME;

/// Error for a reactor root without a descriptor.
pub fn descriptor_not_found(path: &Path) -> anyhow::Error {
    anyhow::anyhow!(
        "Project descriptor not found: {path}\n\n\
         hint: Create a {file} in the root project directory\n\
         hint: Use -r/--root to point at a different directory\n\
         hint: Set VERSION_INFER_ROOT environment variable",
        path = path.display(),
        file = DESCRIPTOR_FILE_NAME
    )
}

/// Error for a `--project` directory that is not part of the reactor.
pub fn project_not_in_reactor(dir: &Path, root: &Path) -> anyhow::Error {
    anyhow::anyhow!(
        "No project of the reactor at {root} lives in {dir}\n\n\
         hint: List the project directory under 'modules' of its aggregator\n\
         hint: Pass the directory that contains the project's {file}",
        root = root.display(),
        dir = dir.display(),
        file = DESCRIPTOR_FILE_NAME
    )
}

/// Error for a project that is not opted into version inference.
pub fn project_not_configured(coordinates: &str) -> anyhow::Error {
    anyhow::anyhow!(
        "Project {coordinates} is not configured for version inference\n\n\
         hint: Add a 'plugins.{plugin}' node with a 'strategy' to its descriptor\n\
         hint: Or add it to a parent project so the configuration is inherited",
        plugin = PLUGIN_NAME
    )
}

/// Error for a `--property` that the strategy did not publish.
///
/// Suggests the closest published key when one is similar enough.
pub fn unknown_property(key: &str, published: &[&str]) -> anyhow::Error {
    let suggestion = find_similar(key, published)
        .map(|similar| format!("Did you mean '{}'?\n", similar))
        .unwrap_or_default();

    let available = if published.is_empty() {
        "hint: The project's strategy publishes no properties".to_string()
    } else {
        format!("Published properties are: {}", published.join(", "))
    };

    anyhow::anyhow!("Unknown property: {key}\n\n{suggestion}{available}")
}

/// Find a similar string from a list of candidates using edit distance.
///
/// Returns Some(candidate) if a close match is found (edit distance <= 2).
fn find_similar<'a>(input: &str, candidates: &[&'a str]) -> Option<&'a str> {
    candidates
        .iter()
        .filter_map(|&candidate| {
            let distance = edit_distance(input, candidate);
            if distance <= 2 && distance < input.len() {
                Some((candidate, distance))
            } else {
                None
            }
        })
        .min_by_key(|(_, distance)| *distance)
        .map(|(candidate, _)| candidate)
}

/// Calculate the Levenshtein edit distance between two strings.
fn edit_distance(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();

    let mut previous: Vec<usize> = (0..=b_chars.len()).collect();
    for (i, a_char) in a_chars.iter().enumerate() {
        let mut current = vec![i + 1; b_chars.len() + 1];
        for (j, b_char) in b_chars.iter().enumerate() {
            let cost = usize::from(a_char != b_char);
            current[j + 1] = (previous[j + 1] + 1)
                .min(current[j] + 1)
                .min(previous[j] + cost);
        }
        previous = current;
    }

    previous[b_chars.len()]
}
