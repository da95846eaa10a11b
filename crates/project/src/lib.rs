//! Project tree enumeration for Marknote.
//! Marknote 的專案目錄樹列舉模組。

pub mod tree;

pub use tree::{load_tree, NodeKind, NodeStats, ProjectError, TreeNode};
