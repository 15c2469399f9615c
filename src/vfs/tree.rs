// Arena storage for the virtual filesystem. Nodes live in a flat map keyed by
// a stable id; directories hold name -> id links to their children and every
// node records its parent. Only this module hands out ids, so a node can never
// be linked from two places.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use uuid::Uuid;

use super::path::VfsPath;
use crate::config::DirectoryOverwrite;
use crate::errors::{DeskError, DeskErrorType, Result};

pub(crate) type NodeId = Uuid;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum NodeKind {
    Directory { children: BTreeMap<String, NodeId> },
    File { content: String },
}

#[derive(Debug, Clone)]
pub(crate) struct Node {
    pub(crate) name: String,
    pub(crate) parent: Option<NodeId>,
    pub(crate) kind: NodeKind,
}

impl Node {
    pub(crate) fn is_dir(&self) -> bool {
        matches!(self.kind, NodeKind::Directory { .. })
    }
}

/// What happened to an existing entry when a file was written over it.
#[derive(Debug, PartialEq)]
pub(crate) enum FileWrite {
    Created,
    Overwrote,
    ReplacedDirectory { dropped: usize },
}

// Serialized shape, shared with the browser build:
// {"root": {"type": "dir", "children": {"a.txt": {"type": "file", "content": ""}}}}
#[derive(Serialize, Deserialize, Debug)]
#[serde(tag = "type")]
enum PersistedNode {
    #[serde(rename = "dir")]
    Directory {
        #[serde(default)]
        children: BTreeMap<String, PersistedNode>,
    },
    #[serde(rename = "file")]
    File {
        #[serde(default)]
        content: String,
    },
}

#[derive(Serialize, Deserialize, Debug)]
struct PersistedTree {
    root: PersistedNode,
}

pub(crate) struct NodeTree {
    nodes: HashMap<NodeId, Node>,
    root: NodeId,
}

impl NodeTree {
    pub(crate) fn new() -> NodeTree {
        let root = Uuid::new_v4();
        let mut nodes = HashMap::new();
        nodes.insert(
            root,
            Node {
                name: "root".to_string(),
                parent: None,
                kind: NodeKind::Directory {
                    children: BTreeMap::new(),
                },
            },
        );
        NodeTree { nodes, root }
    }

    #[cfg(test)]
    pub(crate) fn root(&self) -> NodeId {
        self.root
    }

    pub(crate) fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }

    pub(crate) fn child(&self, dir: NodeId, name: &str) -> Option<NodeId> {
        match self.nodes.get(&dir).map(|n| &n.kind) {
            Some(NodeKind::Directory { children }) => children.get(name).copied(),
            _ => None,
        }
    }

    /// Walks `path` from the root. Every segment must exist and every
    /// segment but the last must be a directory.
    pub(crate) fn resolve(&self, path: &VfsPath) -> Result<NodeId> {
        let mut current = self.root;
        for segment in path.segments() {
            match self.child(current, segment) {
                Some(next) => current = next,
                None => {
                    return Err(DeskError::new(
                        DeskErrorType::NotFound,
                        format!("No such file or directory: {}", path),
                    ))
                }
            }
        }
        Ok(current)
    }

    pub(crate) fn children(&self, dir: NodeId) -> Option<impl Iterator<Item = (&String, &Node)>> {
        match self.nodes.get(&dir).map(|n| &n.kind) {
            Some(NodeKind::Directory { children }) => Some(
                children
                    .iter()
                    .filter_map(move |(name, id)| self.nodes.get(id).map(|n| (name, n))),
            ),
            _ => None,
        }
    }

    // Links a fresh node under `parent` without collision checks.
    fn attach(&mut self, parent: NodeId, name: &str, kind: NodeKind) -> NodeId {
        let id = Uuid::new_v4();
        self.nodes.insert(
            id,
            Node {
                name: name.to_string(),
                parent: Some(parent),
                kind,
            },
        );
        if let Some(Node {
            kind: NodeKind::Directory { children },
            ..
        }) = self.nodes.get_mut(&parent)
        {
            children.insert(name.to_string(), id);
        }
        id
    }

    fn empty_dir() -> NodeKind {
        NodeKind::Directory {
            children: BTreeMap::new(),
        }
    }

    pub(crate) fn insert_dir(&mut self, parent: NodeId, name: &str) -> Result<NodeId> {
        self.expect_dir(parent)?;
        if self.child(parent, name).is_some() {
            tracing::info!("Path already exists");
            return Err(DeskError::new(
                DeskErrorType::AlreadyExists,
                format!("File/Dir exists: {}", name),
            ));
        }
        Ok(self.attach(parent, name, NodeTree::empty_dir()))
    }

    pub(crate) fn put_file(
        &mut self,
        parent: NodeId,
        name: &str,
        content: &str,
        policy: DirectoryOverwrite,
    ) -> Result<FileWrite> {
        self.expect_dir(parent)?;
        let existing = match self.child(parent, name) {
            None => {
                self.attach(
                    parent,
                    name,
                    NodeKind::File {
                        content: content.to_string(),
                    },
                );
                return Ok(FileWrite::Created);
            }
            Some(id) => id,
        };

        let node = self.nodes.get_mut(&existing).ok_or_else(|| {
            DeskError::new(
                DeskErrorType::InternalError,
                format!("Dangling entry {} in directory", name),
            )
        })?;
        if let NodeKind::File { content: old } = &mut node.kind {
            *old = content.to_string();
            return Ok(FileWrite::Overwrote);
        }

        match policy {
            DirectoryOverwrite::Reject => Err(DeskError::new(
                DeskErrorType::IsADirectory,
                format!("Is a directory: {}", name),
            )),
            DirectoryOverwrite::Replace => {
                let dropped = self.remove_subtree(existing);
                self.attach(
                    parent,
                    name,
                    NodeKind::File {
                        content: content.to_string(),
                    },
                );
                Ok(FileWrite::ReplacedDirectory { dropped })
            }
        }
    }

    /// Unlinks `id` from its parent and frees it along with everything
    /// below it. Returns the number of nodes freed.
    pub(crate) fn remove_subtree(&mut self, id: NodeId) -> usize {
        let Some(node) = self.nodes.get(&id) else {
            return 0;
        };
        if let Some(parent) = node.parent {
            let name = node.name.clone();
            if let Some(Node {
                kind: NodeKind::Directory { children },
                ..
            }) = self.nodes.get_mut(&parent)
            {
                children.remove(&name);
            }
        }

        let mut stack = vec![id];
        let mut freed = 0;
        while let Some(next) = stack.pop() {
            if let Some(node) = self.nodes.remove(&next) {
                freed += 1;
                if let NodeKind::Directory { children } = node.kind {
                    stack.extend(children.into_values());
                }
            }
        }
        freed
    }

    fn expect_dir(&self, id: NodeId) -> Result<()> {
        match self.nodes.get(&id) {
            Some(node) if node.is_dir() => Ok(()),
            Some(node) => Err(DeskError::new(
                DeskErrorType::NotADirectory,
                format!("Not a directory: {}", node.name),
            )),
            None => Err(DeskError::new(
                DeskErrorType::NotFound,
                "Directory no longer exists".to_string(),
            )),
        }
    }

    fn to_persisted(&self, id: NodeId) -> PersistedNode {
        match self.nodes.get(&id).map(|n| &n.kind) {
            Some(NodeKind::File { content }) => PersistedNode::File {
                content: content.clone(),
            },
            Some(NodeKind::Directory { children }) => PersistedNode::Directory {
                children: children
                    .iter()
                    .map(|(name, child)| (name.clone(), self.to_persisted(*child)))
                    .collect(),
            },
            None => PersistedNode::Directory {
                children: BTreeMap::new(),
            },
        }
    }

    pub(crate) fn to_value(&self) -> Result<Value> {
        let tree = PersistedTree {
            root: self.to_persisted(self.root),
        };
        Ok(serde_json::to_value(tree)?)
    }

    pub(crate) fn from_value(value: &Value) -> Result<NodeTree> {
        let persisted = PersistedTree::deserialize(value)?;
        let children = match persisted.root {
            PersistedNode::Directory { children } => children,
            PersistedNode::File { .. } => {
                return Err(DeskError::new(
                    DeskErrorType::InvalidPath,
                    "Stored root is a file".to_string(),
                ))
            }
        };
        let mut tree = NodeTree::new();
        let root = tree.root;
        tree.load_children(root, children);
        Ok(tree)
    }

    fn load_children(&mut self, parent: NodeId, children: BTreeMap<String, PersistedNode>) {
        for (name, child) in children {
            match child {
                PersistedNode::File { content } => {
                    self.attach(parent, &name, NodeKind::File { content });
                }
                PersistedNode::Directory { children } => {
                    let id = self.attach(parent, &name, NodeTree::empty_dir());
                    self.load_children(id, children);
                }
            }
        }
    }

    pub(crate) fn default_tree() -> NodeTree {
        let mut tree = NodeTree::new();
        let root = tree.root;
        let home = tree.attach(root, "home", NodeTree::empty_dir());
        let user = tree.attach(home, "user", NodeTree::empty_dir());
        tree.attach(user, "documents", NodeTree::empty_dir());
        tree.attach(user, "pictures", NodeTree::empty_dir());
        tree.attach(
            user,
            "welcome.txt",
            NodeKind::File {
                content: "Welcome to SakuraOS!\nThis is a virtual file system.".to_string(),
            },
        );
        let bin = tree.attach(root, "bin", NodeTree::empty_dir());
        for exe in ["echo", "ls"] {
            tree.attach(
                bin,
                exe,
                NodeKind::File {
                    content: "[Executable]".to_string(),
                },
            );
        }
        tree
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn path(text: &str) -> VfsPath {
        VfsPath::root().resolve(text)
    }

    #[test]
    fn default_tree_layout() {
        let tree = NodeTree::default_tree();
        let user = tree.resolve(&path("/home/user")).unwrap();
        let names: Vec<_> = tree.children(user).unwrap().map(|(n, _)| n.clone()).collect();
        assert_eq!(names, vec!["documents", "pictures", "welcome.txt"]);
        assert!(tree.resolve(&path("/bin/ls")).is_ok());
        assert_eq!(tree.len(), 9);
    }

    #[test]
    fn resolve_through_a_file_is_not_found() {
        let tree = NodeTree::default_tree();
        let err = tree.resolve(&path("/bin/ls/deeper")).unwrap_err();
        assert_eq!(err.error_type, DeskErrorType::NotFound);
    }

    #[test]
    fn replace_directory_frees_the_subtree() {
        let mut tree = NodeTree::default_tree();
        let root = tree.root();
        let before = tree.len();
        let result = tree
            .put_file(root, "home", "flat", DirectoryOverwrite::Replace)
            .unwrap();
        // home, user, documents, pictures, welcome.txt
        assert_eq!(result, FileWrite::ReplacedDirectory { dropped: 5 });
        assert_eq!(tree.len(), before - 5 + 1);
        let home = tree.resolve(&path("/home")).unwrap();
        assert!(!tree.get(home).unwrap().is_dir());
    }

    #[test]
    fn reject_policy_keeps_directory() {
        let mut tree = NodeTree::default_tree();
        let root = tree.root();
        let err = tree
            .put_file(root, "bin", "", DirectoryOverwrite::Reject)
            .unwrap_err();
        assert_eq!(err.error_type, DeskErrorType::IsADirectory);
        let bin = tree.resolve(&path("/bin")).unwrap();
        assert!(tree.get(bin).unwrap().is_dir());
    }

    #[test]
    fn persisted_shape_matches_browser_format() {
        let mut tree = NodeTree::new();
        let root = tree.root();
        let docs = tree.insert_dir(root, "docs").unwrap();
        tree.put_file(docs, "a.txt", "hi", DirectoryOverwrite::Replace)
            .unwrap();
        let value = tree.to_value().unwrap();
        assert_eq!(
            value,
            json!({"root": {"type": "dir", "children": {
                "docs": {"type": "dir", "children": {
                    "a.txt": {"type": "file", "content": "hi"}
                }}
            }}})
        );
    }

    #[test]
    fn from_value_accepts_missing_children() {
        let tree = NodeTree::from_value(&json!({"root": {"type": "dir"}})).unwrap();
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn from_value_rejects_file_root() {
        let result = NodeTree::from_value(&json!({"root": {"type": "file", "content": ""}}));
        assert!(result.is_err());
    }
}
