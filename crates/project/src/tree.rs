use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use marknote_note::NoteId;

/// The kind of tree node.
/// 樹節點的類型。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum NodeKind {
    Folder,
    File,
}

/// Per-entry stats captured while enumerating.
/// 列舉時擷取的檔案狀態。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct NodeStats {
    pub len: u64,
    #[serde(default)]
    pub modified_unix: Option<i64>,
}

/// One node of the enumerated project tree.
/// 專案樹中的單一節點。
///
/// File nodes carry the [`NoteId`] the session resolves them to; folder
/// nodes carry their children, sorted folders-first then by name.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TreeNode {
    pub name: String,
    pub path: PathBuf,
    pub kind: NodeKind,
    #[serde(default)]
    pub stats: NodeStats,
    #[serde(default)]
    pub children: Vec<TreeNode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note_id: Option<NoteId>,
}

impl TreeNode {
    pub fn is_folder(&self) -> bool {
        self.kind == NodeKind::Folder
    }

    /// Total number of nodes in this subtree, the root included.
    /// 此子樹（含根節點）的節點總數。
    pub fn node_count(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(TreeNode::node_count)
            .sum::<usize>()
    }
}

/// Errors raised while building a project tree.
/// 建立專案樹時可能拋出的錯誤。
#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("project tree IO error: {0}")]
    Io(#[from] io::Error),
    #[error("project root {0} is not a directory")]
    NotADirectory(PathBuf),
}

/// Enumerates the full subtree under `root`, stat-ing every entry.
/// 列舉根目錄之下的完整子樹並擷取每個項目的狀態。
///
/// Returns only once the whole subtree has been walked; callers treat the
/// returned tree as a single finished value.
pub fn load_tree(root: impl AsRef<Path>) -> Result<TreeNode, ProjectError> {
    let root = root.as_ref();
    let metadata = fs::metadata(root)?;
    if !metadata.is_dir() {
        return Err(ProjectError::NotADirectory(root.to_path_buf()));
    }

    let name = root
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| root.display().to_string());
    let mut node = TreeNode {
        name,
        path: root.to_path_buf(),
        kind: NodeKind::Folder,
        stats: stats_of(&metadata),
        children: Vec::new(),
        note_id: None,
    };
    load_children(&mut node)?;
    tracing::debug!(root = %root.display(), nodes = node.node_count(), "project tree loaded");
    Ok(node)
}

fn load_children(parent: &mut TreeNode) -> Result<(), ProjectError> {
    for entry in fs::read_dir(&parent.path)? {
        let entry = entry?;
        let path = entry.path();
        let metadata = entry.metadata()?;
        let name = entry.file_name().to_string_lossy().into_owned();

        let mut child = if metadata.is_dir() {
            TreeNode {
                name,
                path,
                kind: NodeKind::Folder,
                stats: stats_of(&metadata),
                children: Vec::new(),
                note_id: None,
            }
        } else {
            TreeNode {
                note_id: Some(NoteId::file(&path)),
                name,
                path,
                kind: NodeKind::File,
                stats: stats_of(&metadata),
                children: Vec::new(),
            }
        };
        if child.is_folder() {
            load_children(&mut child)?;
        }
        parent.children.push(child);
    }

    // Deterministic order: folders first, then by name.
    parent
        .children
        .sort_by(|a, b| b.is_folder().cmp(&a.is_folder()).then(a.name.cmp(&b.name)));
    Ok(())
}

fn stats_of(metadata: &fs::Metadata) -> NodeStats {
    NodeStats {
        len: metadata.len(),
        modified_unix: metadata
            .modified()
            .ok()
            .and_then(|time| time.duration_since(UNIX_EPOCH).ok())
            .map(|duration| duration.as_secs() as i64),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn fixture() -> tempfile::TempDir {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("docs")).unwrap();
        fs::write(dir.path().join("docs/guide.md"), "# guide").unwrap();
        fs::write(dir.path().join("readme.md"), "# readme").unwrap();
        fs::write(dir.path().join("a.txt"), "a").unwrap();
        dir
    }

    #[test]
    fn builds_full_subtree_with_stats() {
        let dir = fixture();
        let tree = load_tree(dir.path()).unwrap();

        assert!(tree.is_folder());
        assert_eq!(tree.node_count(), 5);
        // Folders sort before files.
        assert_eq!(tree.children[0].name, "docs");
        assert_eq!(tree.children[1].name, "a.txt");
        assert_eq!(tree.children[2].name, "readme.md");

        let readme = &tree.children[2];
        assert_eq!(readme.kind, NodeKind::File);
        assert_eq!(readme.stats.len, "# readme".len() as u64);
        assert!(readme.stats.modified_unix.is_some());
        assert_eq!(
            readme.note_id,
            Some(NoteId::file(dir.path().join("readme.md")))
        );
    }

    #[test]
    fn file_root_is_rejected() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("single.md");
        fs::write(&file, "x").unwrap();
        let err = load_tree(&file).unwrap_err();
        assert!(matches!(err, ProjectError::NotADirectory(_)));
    }

    #[test]
    fn missing_root_propagates_io_error() {
        let dir = tempdir().unwrap();
        let err = load_tree(dir.path().join("absent")).unwrap_err();
        assert!(matches!(err, ProjectError::Io(_)));
    }

    #[test]
    fn tree_serializes_to_json() {
        let dir = fixture();
        let tree = load_tree(dir.path()).unwrap();
        let json = serde_json::to_string(&tree).unwrap();
        let back: TreeNode = serde_json::from_str(&json).unwrap();
        assert_eq!(back, tree);
    }
}
