/// A single node in the arena-allocated file tree.
///
/// Nodes are stored in a flat `Vec<FileNode>` for cache-friendly traversal.
/// Parent-child relationships use indices rather than pointers, so the
/// parent back-reference is non-owning and no reference cycle can form.
use compact_str::CompactString;
use std::path::{Path, PathBuf};

/// Bytes attributed to a folder entry itself, excluding its contents.
///
/// Models one allocation block per directory entry so that an empty folder
/// has a consistent nonzero cost and child percentages sum sensibly.
pub const FOLDER_ENTRY_OVERHEAD: u64 = 4_096;

/// Lightweight index into the arena `Vec<FileNode>`.
///
/// Uses `u32` to keep nodes small — supports up to ~4 billion nodes,
/// which is more than enough for any real filesystem.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeIndex(pub u32);

impl NodeIndex {
    /// Create a new `NodeIndex` from a `usize`, panicking if it exceeds `u32::MAX`.
    #[inline]
    pub fn new(index: usize) -> Self {
        debug_assert!(index <= u32::MAX as usize, "NodeIndex overflow");
        Self(index as u32)
    }

    /// Return the index as a `usize` for Vec indexing.
    #[inline]
    pub fn idx(self) -> usize {
        self.0 as usize
    }
}

/// Whether a node is a file leaf or a folder.
///
/// Symlinks and other non-directory entries are `File` leaves measured by
/// their own metadata; the scanner never follows a link target.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeKind {
    File,
    Folder,
}

/// A single file or folder in the tree.
///
/// Stored in a flat arena (`Vec<FileNode>`). The aggregate fields
/// (`total_size`, `item_count`) are maintained on every attach, so a
/// reader holding the tree at any moment sees consistent values.
#[derive(Debug, Clone)]
pub struct FileNode {
    /// Absolute path of the entry. Immutable after creation.
    pub path: PathBuf,

    /// Last path component, derived from `path` at creation.
    pub name: CompactString,

    /// File leaf or folder.
    pub kind: NodeKind,

    /// Bytes occupied by this entry itself. Files: metadata length.
    /// Folders: [`FOLDER_ENTRY_OVERHEAD`].
    pub own_size: u64,

    /// Files: equals `own_size`. Folders: `own_size` plus the sum of all
    /// descendants' `total_size`.
    pub total_size: u64,

    /// Number of descendant entries. Always 0 for files.
    pub item_count: u64,

    /// Index of the parent node. `None` only for the scan root.
    pub parent: Option<NodeIndex>,

    /// Direct children in filesystem-enumeration order (folders only).
    /// The model never re-sorts this; presentation order is the driver's
    /// decision.
    pub children: Vec<NodeIndex>,

    /// `true` if this entry's metadata could not be read. The node stays
    /// in the tree with zero size so users can see where errors occurred.
    pub unreadable: bool,
}

impl FileNode {
    /// Create a new file leaf with the given on-disk size.
    pub fn new_file(path: PathBuf, size: u64, parent: Option<NodeIndex>) -> Self {
        Self {
            name: leaf_name(&path),
            path,
            kind: NodeKind::File,
            own_size: size,
            total_size: size,
            item_count: 0,
            parent,
            children: Vec::new(),
            unreadable: false,
        }
    }

    /// Create a new empty folder node.
    pub fn new_folder(path: PathBuf, parent: Option<NodeIndex>) -> Self {
        Self {
            name: leaf_name(&path),
            path,
            kind: NodeKind::Folder,
            own_size: FOLDER_ENTRY_OVERHEAD,
            total_size: FOLDER_ENTRY_OVERHEAD,
            item_count: 0,
            parent,
            children: Vec::new(),
            unreadable: false,
        }
    }

    /// Create an unreadable placeholder (e.g. permission denied).
    ///
    /// Unreadable entries carry zero size regardless of kind — a folder we
    /// could not even stat should not charge the overhead of a folder we
    /// actually enumerated.
    pub fn new_unreadable(path: PathBuf, kind: NodeKind, parent: Option<NodeIndex>) -> Self {
        Self {
            name: leaf_name(&path),
            path,
            kind,
            own_size: 0,
            total_size: 0,
            item_count: 0,
            parent,
            children: Vec::new(),
            unreadable: true,
        }
    }

    /// Check if this node is a folder.
    #[inline]
    pub fn is_folder(&self) -> bool {
        self.kind == NodeKind::Folder
    }

    /// Check if this node is a file leaf.
    #[inline]
    pub fn is_file(&self) -> bool {
        self.kind == NodeKind::File
    }
}

/// Last path component as a compact string.
///
/// Roots like `/` have no file name; fall back to the full rendered path
/// so the node is never nameless.
fn leaf_name(path: &Path) -> CompactString {
    match path.file_name() {
        Some(name) => CompactString::new(name.to_string_lossy()),
        None => CompactString::new(path.to_string_lossy()),
    }
}
