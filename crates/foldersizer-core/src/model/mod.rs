/// Data model for the FolderSizer file tree.
///
/// Re-exports the arena-allocated tree structure and supporting types.
pub mod file_node;
pub mod file_tree;
pub mod size;

pub use file_node::{FileNode, NodeIndex, NodeKind, FOLDER_ENTRY_OVERHEAD};
pub use file_tree::FileTree;
pub use size::format_size;
