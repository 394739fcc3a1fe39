//! # Reactor
//!
//! The reactor is the set of projects processed together in one run. It is
//! stored as a flat `Vec<ProjectNode>`; nodes refer to each other by index
//! (`ProjectNode::parent`) rather than by pointer, so the two inference passes
//! can mutate nodes freely.
//!
//! ## Loading
//!
//! `Reactor::load` starts at a root directory containing a `project.yaml`
//! and follows each descriptor's `modules` list recursively, depth first, the
//! root coming first. A module chain that leads back to one of its own
//! ancestors is reported as a cycle; a module listed twice is loaded once.
//!
//! Once every node is known, parent references are resolved against the
//! original identities of the other nodes. Parents outside the reactor stay
//! unresolved.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use log::debug;

use crate::descriptor::{scalar_text, Descriptor, DescriptorIo, DESCRIPTOR_FILE_NAME};
use crate::error::{Error, Result};
use crate::gav::Gav;

/// One project of the reactor.
#[derive(Debug, Clone)]
pub struct ProjectNode {
    /// Directory holding the project's original descriptor.
    pub basedir: PathBuf,
    /// Current descriptor location; redirected once a rewritten descriptor
    /// has been emitted.
    pub descriptor_path: PathBuf,
    /// The descriptor model, rewritten in place by pass 2.
    pub descriptor: Descriptor,
    pub group: String,
    pub artifact: String,
    /// Current version; replaced once by pass 1.
    pub version: String,
    /// Version the project was loaded with.
    pub original_version: String,
    /// Build output name, embedding the version.
    pub final_name: String,
    /// Project property bag.
    pub properties: BTreeMap<String, String>,
    /// Index of the in-reactor parent project.
    pub parent: Option<usize>,
}

impl ProjectNode {
    /// Build a node from a parsed descriptor.
    ///
    /// Group and version fall back to the parent reference when the
    /// descriptor does not declare them.
    pub fn from_descriptor(descriptor_path: PathBuf, descriptor: Descriptor) -> Result<Self> {
        let basedir = descriptor_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        let parent = descriptor.parent.as_ref();
        let group = descriptor
            .group
            .clone()
            .or_else(|| parent.map(|p| p.group.clone()))
            .ok_or_else(|| Error::Descriptor {
                path: descriptor_path.clone(),
                message: "Missing group (declare one or inherit it from a parent)".to_string(),
            })?;
        let version = descriptor
            .version
            .clone()
            .or_else(|| parent.map(|p| p.version.clone()))
            .ok_or_else(|| Error::Descriptor {
                path: descriptor_path.clone(),
                message: "Missing version (declare one or inherit it from a parent)".to_string(),
            })?;

        let artifact = descriptor.artifact.clone();
        let final_name = descriptor
            .build
            .as_ref()
            .and_then(|build| build.final_name.clone())
            .unwrap_or_else(|| format!("{}-{}", artifact, version));
        let properties = descriptor
            .properties
            .iter()
            .filter_map(|(key, value)| scalar_text(value).map(|text| (key.clone(), text)))
            .collect();

        Ok(Self {
            basedir,
            descriptor_path,
            descriptor,
            group,
            artifact,
            original_version: version.clone(),
            version,
            final_name,
            properties,
            parent: None,
        })
    }

    /// Current identity.
    pub fn identity(&self) -> Gav {
        Gav::of(&self.group, &self.artifact, &self.version)
    }

    /// Identity the project was loaded with.
    pub fn original_identity(&self) -> Gav {
        Gav::of(&self.group, &self.artifact, &self.original_version)
    }

    /// `group:artifact:version` with the original casing.
    pub fn coordinates(&self) -> String {
        format!("{}:{}:{}", self.group, self.artifact, self.version)
    }
}

/// All projects of one run, addressed by index.
#[derive(Debug, Clone, Default)]
pub struct Reactor {
    nodes: Vec<ProjectNode>,
}

impl Reactor {
    /// Assemble a reactor from nodes and resolve their parent links.
    pub fn new(mut nodes: Vec<ProjectNode>) -> Result<Self> {
        let mut by_identity = HashMap::new();
        for (index, node) in nodes.iter().enumerate() {
            if let Some(previous) = by_identity.insert(node.original_identity(), index) {
                return Err(Error::Reactor {
                    message: format!(
                        "Duplicate project {} in {} and {}",
                        node.coordinates(),
                        nodes[previous].descriptor_path.display(),
                        node.descriptor_path.display()
                    ),
                });
            }
        }

        for node in nodes.iter_mut() {
            node.parent = node
                .descriptor
                .parent
                .as_ref()
                .and_then(|p| by_identity.get(&Gav::of(&p.group, &p.artifact, &p.version)))
                .copied();
        }

        Ok(Self { nodes })
    }

    /// Load the reactor rooted at `root` by following `modules` lists.
    pub fn load(root: &Path, io: &dyn DescriptorIo) -> Result<Self> {
        let root = canonical_dir(root)?;
        let mut nodes = Vec::new();
        let mut seen = HashMap::new();
        load_module(&root, io, &mut Vec::new(), &mut seen, &mut nodes)?;
        debug!("Loaded {} project(s) from {}", nodes.len(), root.display());
        Self::new(nodes)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> &[ProjectNode] {
        &self.nodes
    }

    pub fn node(&self, index: usize) -> &ProjectNode {
        &self.nodes[index]
    }

    pub fn node_mut(&mut self, index: usize) -> &mut ProjectNode {
        &mut self.nodes[index]
    }

    /// Index of the project whose base directory is `dir`.
    pub fn find_by_basedir(&self, dir: &Path) -> Option<usize> {
        let dir = fs::canonicalize(dir).ok()?;
        self.nodes.iter().position(|node| node.basedir == dir)
    }
}

fn canonical_dir(dir: &Path) -> Result<PathBuf> {
    fs::canonicalize(dir).map_err(|e| Error::Reactor {
        message: format!("Project directory {} is not accessible: {}", dir.display(), e),
    })
}

fn load_module(
    dir: &Path,
    io: &dyn DescriptorIo,
    path: &mut Vec<PathBuf>,
    seen: &mut HashMap<PathBuf, usize>,
    nodes: &mut Vec<ProjectNode>,
) -> Result<()> {
    if path.iter().any(|ancestor| ancestor == dir) {
        let cycle = path
            .iter()
            .chain(std::iter::once(&dir.to_path_buf()))
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join(" -> ");
        return Err(Error::CycleDetected { cycle });
    }
    if seen.contains_key(dir) {
        return Ok(());
    }

    let descriptor_path = dir.join(DESCRIPTOR_FILE_NAME);
    let descriptor = io.read(&descriptor_path)?;
    let modules = descriptor.modules.clone();
    seen.insert(dir.to_path_buf(), nodes.len());
    nodes.push(ProjectNode::from_descriptor(descriptor_path, descriptor)?);

    path.push(dir.to_path_buf());
    for module in &modules {
        let module_dir = canonical_dir(&dir.join(module))?;
        load_module(&module_dir, io, path, seen, nodes)?;
    }
    path.pop();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::YamlDescriptorIo;
    use tempfile::TempDir;

    fn write_project(root: &Path, dir: &str, yaml: &str) {
        let dir = root.join(dir);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(DESCRIPTOR_FILE_NAME), yaml).unwrap();
    }

    fn node(yaml: &str) -> ProjectNode {
        ProjectNode::from_descriptor(
            PathBuf::from("/work").join(DESCRIPTOR_FILE_NAME),
            Descriptor::parse(yaml).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_node_identity_and_final_name() {
        let node = node("group: com.Example\nartifact: Core\nversion: 1.0-SNAPSHOT\n");
        assert_eq!(node.identity(), Gav::of("com.example", "core", "1.0-snapshot"));
        assert_eq!(node.coordinates(), "com.Example:Core:1.0-SNAPSHOT");
        assert_eq!(node.final_name, "Core-1.0-SNAPSHOT");
        assert_eq!(node.basedir, PathBuf::from("/work"));
    }

    #[test]
    fn test_node_properties_from_descriptor() {
        let node = node(
            "group: g\nartifact: a\nversion: '1.0'\nproperties:\n  encoding: UTF-8\n  threads: 4\n  nested: { x: 1 }\n",
        );
        assert_eq!(node.properties["encoding"], "UTF-8");
        assert_eq!(node.properties["threads"], "4");
        assert!(!node.properties.contains_key("nested"));
    }

    #[test]
    fn test_node_inherits_group_and_version_from_parent() {
        let node = node(
            "artifact: core\nparent:\n  group: com.example\n  artifact: parent\n  version: '2.0'\n",
        );
        assert_eq!(node.group, "com.example");
        assert_eq!(node.version, "2.0");
        assert_eq!(node.original_version, "2.0");
    }

    #[test]
    fn test_node_without_version_is_an_error() {
        let result = ProjectNode::from_descriptor(
            PathBuf::from("/work/project.yaml"),
            Descriptor::parse("group: g\nartifact: a\n").unwrap(),
        );
        assert!(matches!(result, Err(Error::Descriptor { .. })));
    }

    #[test]
    fn test_explicit_final_name() {
        let node = node("group: g\nartifact: a\nversion: '1.0'\nbuild:\n  finalName: app-1.0-bin\n");
        assert_eq!(node.final_name, "app-1.0-bin");
    }

    #[test]
    fn test_parent_links_resolve_by_original_identity() {
        let parent = node("group: g\nartifact: parent\nversion: '1.0'\n");
        let child = node(
            "artifact: child\nparent:\n  group: G\n  artifact: PARENT\n  version: '1.0'\n",
        );
        let outsider = node(
            "group: g\nartifact: other\nversion: '1.0'\nparent:\n  group: org\n  artifact: base\n  version: 5\n",
        );

        let reactor = Reactor::new(vec![parent, child, outsider]).unwrap();
        assert_eq!(reactor.node(0).parent, None);
        assert_eq!(reactor.node(1).parent, Some(0));
        assert_eq!(reactor.node(2).parent, None);
    }

    #[test]
    fn test_duplicate_projects_are_rejected() {
        let first = node("group: g\nartifact: a\nversion: '1.0'\n");
        let second = node("group: G\nartifact: A\nversion: '1.0'\n");
        let err = Reactor::new(vec![first, second]).unwrap_err();
        assert!(err.to_string().contains("Duplicate project"));
    }

    #[test]
    fn test_load_follows_modules() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        write_project(
            root,
            ".",
            "group: g\nartifact: parent\nversion: '1.0'\nmodules: [api, impl]\n",
        );
        write_project(
            root,
            "api",
            "artifact: api\nparent: { group: g, artifact: parent, version: '1.0' }\n",
        );
        write_project(
            root,
            "impl",
            "artifact: impl\nparent: { group: g, artifact: parent, version: '1.0' }\nmodules: [plugin]\n",
        );
        write_project(
            root,
            "impl/plugin",
            "group: g\nartifact: plugin\nversion: '0.1'\n",
        );

        let reactor = Reactor::load(root, &YamlDescriptorIo).unwrap();
        let artifacts: Vec<&str> = reactor.nodes().iter().map(|n| n.artifact.as_str()).collect();
        assert_eq!(artifacts, vec!["parent", "api", "impl", "plugin"]);
        assert_eq!(reactor.node(1).parent, Some(0));
        assert_eq!(reactor.node(2).parent, Some(0));
        assert_eq!(reactor.node(3).parent, None);

        let api_dir = root.join("api");
        assert_eq!(reactor.find_by_basedir(&api_dir), Some(1));
        assert_eq!(reactor.find_by_basedir(root), Some(0));
    }

    #[test]
    fn test_load_detects_module_cycles() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        write_project(root, ".", "group: g\nartifact: root\nversion: 1\nmodules: [a]\n");
        write_project(root, "a", "group: g\nartifact: a\nversion: 1\nmodules: ['..']\n");

        let err = Reactor::load(root, &YamlDescriptorIo).unwrap_err();
        assert!(matches!(err, Error::CycleDetected { .. }));
    }

    #[test]
    fn test_load_missing_module_directory() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        write_project(root, ".", "group: g\nartifact: root\nversion: 1\nmodules: [gone]\n");

        let err = Reactor::load(root, &YamlDescriptorIo).unwrap_err();
        assert!(matches!(err, Error::Reactor { .. }));
    }

    #[test]
    fn test_load_module_listed_twice() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        write_project(root, ".", "group: g\nartifact: root\nversion: 1\nmodules: [a, ./a]\n");
        write_project(root, "a", "group: g\nartifact: a\nversion: 1\n");

        let reactor = Reactor::load(root, &YamlDescriptorIo).unwrap();
        assert_eq!(reactor.len(), 2);
    }
}
