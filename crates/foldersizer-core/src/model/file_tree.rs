/// Arena-backed file tree with incremental bottom-up aggregation.
///
/// All nodes live in a single `Vec<FileNode>`. Relationships between nodes
/// use `NodeIndex` (a thin `u32` wrapper) rather than heap pointers, giving
/// cache-friendly traversal and no ownership cycles despite the parent
/// back-references.
///
/// Every attach propagates its size/count delta up through the ancestor
/// chain immediately, so a reader taking the tree between any two
/// mutations always observes the structural invariants:
///
/// - `total_size(folder) == own_size(folder) + Σ total_size(child)`
/// - `item_count(folder) == Σ (1 + item_count(child))`
use super::file_node::{FileNode, NodeIndex, NodeKind};
use std::path::PathBuf;

/// The complete file tree produced by a scan. Single-rooted.
#[derive(Debug, Clone)]
pub struct FileTree {
    /// Arena: every node in a flat, cache-friendly vector.
    pub nodes: Vec<FileNode>,

    /// Index of the root folder node (always present).
    pub root: NodeIndex,
}

impl FileTree {
    /// Create a tree containing only the root folder node.
    pub fn new(root_path: PathBuf) -> Self {
        Self::with_capacity(root_path, 1)
    }

    /// Create a tree with pre-allocated arena capacity.
    ///
    /// `estimated_nodes` should be a rough upper bound. The arena grows if
    /// needed, but pre-allocation avoids repeated re-allocation while the
    /// scanner is inserting.
    pub fn with_capacity(root_path: PathBuf, estimated_nodes: usize) -> Self {
        let mut nodes = Vec::with_capacity(estimated_nodes.max(1));
        nodes.push(FileNode::new_folder(root_path, None));
        Self {
            nodes,
            root: NodeIndex::new(0),
        }
    }

    /// Index of the root node.
    #[inline]
    pub fn root(&self) -> NodeIndex {
        self.root
    }

    /// Attach a new file leaf under `parent`. Aggregates along the whole
    /// ancestor chain are updated before this returns.
    pub fn add_file(&mut self, parent: NodeIndex, path: PathBuf, size: u64) -> NodeIndex {
        let node = FileNode::new_file(path, size, Some(parent));
        self.attach(parent, node)
    }

    /// Attach a new empty folder under `parent`.
    pub fn add_folder(&mut self, parent: NodeIndex, path: PathBuf) -> NodeIndex {
        let node = FileNode::new_folder(path, Some(parent));
        self.attach(parent, node)
    }

    /// Attach an unreadable placeholder under `parent`.
    pub fn add_unreadable(&mut self, parent: NodeIndex, path: PathBuf, kind: NodeKind) -> NodeIndex {
        let node = FileNode::new_unreadable(path, kind, Some(parent));
        self.attach(parent, node)
    }

    /// Append `node` to `parent`'s children and roll its aggregates up
    /// through every ancestor. O(depth) per attach.
    ///
    /// Children keep filesystem-enumeration order: always appended, never
    /// re-sorted.
    fn attach(&mut self, parent: NodeIndex, node: FileNode) -> NodeIndex {
        debug_assert!(self.nodes[parent.idx()].is_folder(), "attach to non-folder");
        let size_delta = node.total_size;
        let count_delta = 1 + node.item_count;

        let idx = NodeIndex::new(self.nodes.len());
        self.nodes.push(node);
        self.nodes[parent.idx()].children.push(idx);

        let mut current = Some(parent);
        while let Some(ancestor) = current {
            let n = &mut self.nodes[ancestor.idx()];
            n.total_size += size_delta;
            n.item_count += count_delta;
            current = n.parent;
        }
        idx
    }

    /// Flag a node as unreadable after the fact (e.g. a folder whose
    /// listing failed after the node was already attached).
    pub fn mark_unreadable(&mut self, index: NodeIndex) {
        self.nodes[index.idx()].unreadable = true;
    }

    /// Drop all children of `index` without touching aggregates.
    ///
    /// The caller must follow up with [`recalculate`](Self::recalculate).
    /// Detached nodes stay in the arena (indices are never reused) but are
    /// unreachable from the root.
    pub(crate) fn clear_children(&mut self, index: NodeIndex) {
        self.nodes[index.idx()].children.clear();
    }

    /// Recompute a subtree's aggregates purely from its current children,
    /// recursively, then propagate the delta up to the root.
    ///
    /// `attach` keeps aggregates correct on the normal path; this is for
    /// bulk mutation done around it, e.g. a subtree refresh that replaced
    /// the children wholesale.
    pub fn recalculate(&mut self, index: NodeIndex) {
        let old_total = self.nodes[index.idx()].total_size;
        let old_count = self.nodes[index.idx()].item_count;

        self.recalculate_subtree(index);

        let new_total = self.nodes[index.idx()].total_size;
        let new_count = self.nodes[index.idx()].item_count;

        let mut current = self.nodes[index.idx()].parent;
        while let Some(ancestor) = current {
            let n = &mut self.nodes[ancestor.idx()];
            n.total_size = n.total_size + new_total - old_total;
            n.item_count = n.item_count + new_count - old_count;
            current = n.parent;
        }
    }

    /// Post-order re-aggregation of one subtree.
    fn recalculate_subtree(&mut self, index: NodeIndex) {
        let children = self.nodes[index.idx()].children.clone();
        for &child in &children {
            self.recalculate_subtree(child);
        }

        if !self.nodes[index.idx()].is_folder() {
            return;
        }
        let mut total = self.nodes[index.idx()].own_size;
        let mut count = 0;
        for &child in &children {
            total += self.nodes[child.idx()].total_size;
            count += 1 + self.nodes[child.idx()].item_count;
        }
        let node = &mut self.nodes[index.idx()];
        node.total_size = total;
        node.item_count = count;
    }

    /// Share of the parent's total size, as a whole-number percentage.
    ///
    /// The root reports 100. A parent with zero total size reports 0
    /// rather than dividing by zero.
    pub fn percent_of_parent(&self, index: NodeIndex) -> f64 {
        let node = &self.nodes[index.idx()];
        let Some(parent) = node.parent else {
            return 100.0;
        };
        let parent_total = self.nodes[parent.idx()].total_size;
        if parent_total == 0 {
            return 0.0;
        }
        (node.total_size as f64 / parent_total as f64 * 100.0).round()
    }

    /// Ancestor chain from the node's parent up to the root, for upward
    /// navigation.
    pub fn ancestors(&self, index: NodeIndex) -> Vec<NodeIndex> {
        let mut chain = Vec::new();
        let mut current = self.nodes[index.idx()].parent;
        while let Some(idx) = current {
            chain.push(idx);
            current = self.nodes[idx.idx()].parent;
        }
        chain
    }

    /// Direct children in stored (filesystem-enumeration) order.
    #[inline]
    pub fn children(&self, parent: NodeIndex) -> &[NodeIndex] {
        &self.nodes[parent.idx()].children
    }

    /// Direct children as a fresh Vec: folders first, then by total size
    /// descending. A presentation convenience — the stored order is
    /// untouched.
    pub fn children_sorted_by_size(&self, parent: NodeIndex) -> Vec<NodeIndex> {
        let mut children = self.nodes[parent.idx()].children.clone();
        children.sort_unstable_by(|a, b| {
            let a_node = &self.nodes[a.idx()];
            let b_node = &self.nodes[b.idx()];
            b_node
                .is_folder()
                .cmp(&a_node.is_folder())
                .then(b_node.total_size.cmp(&a_node.total_size))
        });
        children
    }

    /// Get the node at the given index.
    #[inline]
    pub fn node(&self, index: NodeIndex) -> &FileNode {
        &self.nodes[index.idx()]
    }

    /// Total size rooted at the scan root.
    #[inline]
    pub fn total_size(&self) -> u64 {
        self.nodes[self.root.idx()].total_size
    }

    /// Total number of nodes in the arena, detached nodes included.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if the tree contains no nodes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
