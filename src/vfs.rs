// The virtual filesystem behind the desktop's file browser and terminal.
// The whole tree lives in memory and is written back to the persistence
// adapter after every successful mutation. Nothing here touches the real disk.

mod path;
mod tree;

pub use path::VfsPath;

use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::instrument;

use crate::config::DirectoryOverwrite;
use crate::errors::{DeskError, DeskErrorType, Result};
use crate::storage::Persistence;
use path::validate_name;
use tree::{FileWrite, NodeKind, NodeTree};

/// Key the tree is stored under (legacy addressing, `vfs_data.json`).
const STORAGE_KEY: &str = "vfs_data";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Dir,
    File,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirEntry {
    pub name: String,
    pub kind: EntryKind,
}

pub struct VirtualFileSystem {
    tree: NodeTree,
    current: VfsPath,
    store: Arc<dyn Persistence>,
    overwrite: DirectoryOverwrite,
}

fn default_path() -> VfsPath {
    VfsPath::from_segments(["home", "user"])
}

fn is_directory(tree: &NodeTree, path: &VfsPath) -> bool {
    tree.resolve(path)
        .ok()
        .and_then(|id| tree.get(id))
        .map(|node| node.is_dir())
        .unwrap_or(false)
}

impl VirtualFileSystem {
    /// Loads the persisted tree, or creates and persists the default one.
    #[instrument(skip(store))]
    pub fn new(store: Arc<dyn Persistence>, overwrite: DirectoryOverwrite) -> VirtualFileSystem {
        let tree = match store.load_data(STORAGE_KEY) {
            Some(value) => match NodeTree::from_value(&value) {
                Ok(tree) => {
                    tracing::info!("Loaded filesystem with {} nodes", tree.len());
                    Some(tree)
                }
                Err(e) => {
                    tracing::error!("Stored filesystem could not be read, starting over: {}", e);
                    None
                }
            },
            None => None,
        };

        let fresh = tree.is_none();
        let tree = tree.unwrap_or_else(NodeTree::default_tree);
        let current = if is_directory(&tree, &default_path()) {
            default_path()
        } else {
            tracing::warn!("{} is not a directory, starting at /", default_path());
            VfsPath::root()
        };
        let vfs = VirtualFileSystem {
            tree,
            current,
            store,
            overwrite,
        };
        if fresh {
            tracing::info!("Creating default filesystem");
            vfs.save();
        }
        vfs
    }

    fn save(&self) {
        match self.tree.to_value() {
            Ok(value) => self.store.save_data(STORAGE_KEY, &value),
            Err(e) => tracing::error!("Failed to serialize filesystem: {}", e),
        }
    }

    /// The persisted form of the tree.
    pub fn snapshot(&self) -> Result<Value> {
        self.tree.to_value()
    }

    pub fn current_path(&self) -> String {
        self.current.to_string()
    }

    pub fn resolve_display_path(&self, text: &str) -> VfsPath {
        self.current.resolve(text)
    }

    #[instrument(skip(self))]
    pub fn list(&self, path: Option<&str>) -> Result<Vec<DirEntry>> {
        let target = match path {
            Some(text) => self.resolve_display_path(text),
            None => self.current.clone(),
        };
        let id = self.tree.resolve(&target)?;
        let children = match self.tree.children(id) {
            Some(children) => children,
            None => {
                tracing::info!("Path is a file!");
                return Err(DeskError::new(
                    DeskErrorType::NotADirectory,
                    format!("Not a directory: {}", target),
                ));
            }
        };
        Ok(children
            .map(|(name, node)| DirEntry {
                name: name.clone(),
                kind: match node.kind {
                    NodeKind::Directory { .. } => EntryKind::Dir,
                    NodeKind::File { .. } => EntryKind::File,
                },
            })
            .collect())
    }

    #[instrument(skip(self))]
    pub fn change_directory(&mut self, path: &str) -> Result<String> {
        match path {
            ".." => {
                self.current.pop();
            }
            "/" => self.current = VfsPath::root(),
            _ => {
                let target = self.resolve_display_path(path);
                if !is_directory(&self.tree, &target) {
                    return Err(DeskError::new(
                        DeskErrorType::NotFound,
                        format!("Directory not found: {}", path),
                    ));
                }
                self.current = target;
            }
        }
        Ok(self.current_path())
    }

    #[instrument(skip(self))]
    pub fn make_directory(&mut self, name: &str) -> Result<String> {
        validate_name(name)?;
        let cwd = self.tree.resolve(&self.current)?;
        self.tree.insert_dir(cwd, name)?;
        self.save();
        Ok(format!("Created directory: {}", name))
    }

    #[instrument(skip(self, content))]
    pub fn create_file(&mut self, name: &str, content: &str) -> Result<String> {
        validate_name(name)?;
        let cwd = self.tree.resolve(&self.current)?;
        if let FileWrite::ReplacedDirectory { dropped } =
            self.tree.put_file(cwd, name, content, self.overwrite)?
        {
            tracing::warn!("Replaced directory {} ({} nodes) with a file", name, dropped);
        }
        self.save();
        Ok(format!("Created file: {}", name))
    }

    #[instrument(skip(self))]
    pub fn read_file(&self, name: &str) -> Result<String> {
        let cwd = self.tree.resolve(&self.current)?;
        let node = self.tree.child(cwd, name).and_then(|id| self.tree.get(id));
        match node.map(|n| &n.kind) {
            Some(NodeKind::File { content }) => Ok(content.clone()),
            Some(NodeKind::Directory { .. }) => Err(DeskError::new(
                DeskErrorType::IsADirectory,
                format!("Is a directory: {}", name),
            )),
            None => Err(DeskError::new(
                DeskErrorType::NotFound,
                format!("File not found: {}", name),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StorageConfig;
    use crate::storage::SledStore;

    fn store() -> Arc<SledStore> {
        Arc::new(SledStore::temporary(StorageConfig::default()).unwrap())
    }

    fn fresh() -> VirtualFileSystem {
        VirtualFileSystem::new(store(), DirectoryOverwrite::Replace)
    }

    fn names(entries: &[DirEntry]) -> Vec<(&str, EntryKind)> {
        entries.iter().map(|e| (e.name.as_str(), e.kind)).collect()
    }

    #[test]
    fn starts_in_home_user() {
        let vfs = fresh();
        assert_eq!(vfs.current_path(), "/home/user");
        assert_eq!(
            names(&vfs.list(None).unwrap()),
            vec![
                ("documents", EntryKind::Dir),
                ("pictures", EntryKind::Dir),
                ("welcome.txt", EntryKind::File),
            ]
        );
    }

    #[test]
    fn first_construction_persists_default_tree() {
        let store = store();
        let _vfs = VirtualFileSystem::new(store.clone(), DirectoryOverwrite::Replace);
        assert!(store.load("vfs_data.json").is_some());
    }

    #[test]
    fn created_entries_are_listed_with_kinds() {
        let mut vfs = fresh();
        vfs.change_directory("documents").unwrap();
        vfs.make_directory("drafts").unwrap();
        vfs.create_file("b.txt", "").unwrap();
        vfs.create_file("a.txt", "x").unwrap();
        assert_eq!(
            names(&vfs.list(None).unwrap()),
            vec![
                ("a.txt", EntryKind::File),
                ("b.txt", EntryKind::File),
                ("drafts", EntryKind::Dir),
            ]
        );
    }

    #[test]
    fn list_errors() {
        let vfs = fresh();
        let err = vfs.list(Some("welcome.txt")).unwrap_err();
        assert_eq!(err.error_type, DeskErrorType::NotADirectory);
        let err = vfs.list(Some("/nope/deeper")).unwrap_err();
        assert_eq!(err.error_type, DeskErrorType::NotFound);
        assert_eq!(vfs.list(Some("/bin")).unwrap().len(), 2);
    }

    #[test]
    fn cd_up_at_root_is_idempotent() {
        let mut vfs = fresh();
        assert_eq!(vfs.change_directory("/").unwrap(), "/");
        assert_eq!(vfs.change_directory("..").unwrap(), "/");
        assert_eq!(vfs.current_path(), "/");
    }

    #[test]
    fn enter_and_leave_returns_to_start() {
        let mut vfs = fresh();
        let before = vfs.current_path();
        vfs.make_directory("tmp").unwrap();
        vfs.change_directory("tmp").unwrap();
        assert_eq!(vfs.current_path(), "/home/user/tmp");
        vfs.change_directory("..").unwrap();
        assert_eq!(vfs.current_path(), before);
    }

    #[test]
    fn cd_to_missing_or_file_is_not_found() {
        let mut vfs = fresh();
        let err = vfs.change_directory("nowhere").unwrap_err();
        assert_eq!(err.error_type, DeskErrorType::NotFound);
        let err = vfs.change_directory("welcome.txt").unwrap_err();
        assert_eq!(err.error_type, DeskErrorType::NotFound);
        assert_eq!(vfs.current_path(), "/home/user");
        assert_eq!(vfs.change_directory("/bin").unwrap(), "/bin");
    }

    #[test]
    fn mkdir_collision() {
        let mut vfs = fresh();
        let err = vfs.make_directory("welcome.txt").unwrap_err();
        assert_eq!(err.error_type, DeskErrorType::AlreadyExists);
        let err = vfs.make_directory("documents").unwrap_err();
        assert_eq!(err.error_type, DeskErrorType::AlreadyExists);
    }

    #[test]
    fn create_file_overwrites_silently() {
        let mut vfs = fresh();
        vfs.create_file("welcome.txt", "changed").unwrap();
        assert_eq!(vfs.read_file("welcome.txt").unwrap(), "changed");
    }

    #[test]
    fn create_file_over_directory_follows_policy() {
        let mut vfs = fresh();
        assert_eq!(
            vfs.create_file("documents", "flat").unwrap(),
            "Created file: documents"
        );
        assert_eq!(vfs.read_file("documents").unwrap(), "flat");

        let mut strict = VirtualFileSystem::new(store(), DirectoryOverwrite::Reject);
        let err = strict.create_file("documents", "flat").unwrap_err();
        assert_eq!(err.error_type, DeskErrorType::IsADirectory);
    }

    #[test]
    fn read_file_errors() {
        let vfs = fresh();
        let err = vfs.read_file("missing").unwrap_err();
        assert_eq!(err.error_type, DeskErrorType::NotFound);
        let err = vfs.read_file("pictures").unwrap_err();
        assert_eq!(err.error_type, DeskErrorType::IsADirectory);
    }

    #[test]
    fn projects_scenario() {
        let mut vfs = fresh();
        vfs.make_directory("projects").unwrap();
        vfs.change_directory("projects").unwrap();
        vfs.create_file("a.txt", "hi").unwrap();
        assert_eq!(vfs.read_file("a.txt").unwrap(), "hi");
        vfs.change_directory("..").unwrap();
        let listing = vfs.list(None).unwrap();
        assert!(listing.contains(&DirEntry {
            name: "projects".to_string(),
            kind: EntryKind::Dir,
        }));
    }

    #[test]
    fn reload_from_store_round_trips() {
        let store = store();
        let mut vfs = VirtualFileSystem::new(store.clone(), DirectoryOverwrite::Replace);
        vfs.make_directory("projects").unwrap();
        vfs.change_directory("projects").unwrap();
        vfs.create_file("a.txt", "hi").unwrap();
        let before = vfs.snapshot().unwrap();

        let mut reloaded = VirtualFileSystem::new(store, DirectoryOverwrite::Replace);
        assert_eq!(reloaded.snapshot().unwrap(), before);
        assert_eq!(reloaded.current_path(), "/home/user");
        reloaded.change_directory("projects").unwrap();
        assert_eq!(reloaded.read_file("a.txt").unwrap(), "hi");
    }

    #[test]
    fn reload_starts_at_root_when_home_is_gone() {
        let store = store();
        let mut vfs = VirtualFileSystem::new(store.clone(), DirectoryOverwrite::Replace);
        vfs.change_directory("/").unwrap();
        vfs.create_file("home", "flat").unwrap();

        let mut reloaded = VirtualFileSystem::new(store, DirectoryOverwrite::Replace);
        assert_eq!(reloaded.current_path(), "/");
        assert_eq!(reloaded.make_directory("tmp").unwrap(), "Created directory: tmp");
        assert_eq!(reloaded.read_file("home").unwrap(), "flat");
    }

    #[test]
    fn reads_do_not_save() {
        let store = store();
        let vfs = VirtualFileSystem::new(store.clone(), DirectoryOverwrite::Replace);
        store.save_data(STORAGE_KEY, &serde_json::json!({"root": {"type": "dir"}}));
        vfs.list(None).unwrap();
        vfs.read_file("welcome.txt").unwrap();
        assert_eq!(
            store.load_data(STORAGE_KEY),
            Some(serde_json::json!({"root": {"type": "dir"}}))
        );
    }

    #[test]
    fn invalid_names_are_rejected() {
        let mut vfs = fresh();
        let err = vfs.make_directory("a/b").unwrap_err();
        assert_eq!(err.error_type, DeskErrorType::InvalidPath);
        let err = vfs.create_file("", "x").unwrap_err();
        assert_eq!(err.error_type, DeskErrorType::InvalidPath);
    }
}
