/// Synchronous subtree refresh — re-size one folder in place.
///
/// The background scan handles whole-tree sizing; this entry point
/// recomputes a single subtree after an external change (a manual
/// "reload this folder" request) without restarting the whole scan. It
/// runs on the calling thread, reports no progress, and honors no
/// cancellation flag — refreshes are expected to be small and fast.
use crate::model::{FileTree, NodeIndex, NodeKind};
use crate::scanner::ScanError;

use std::fs;
use std::path::Path;
use tracing::warn;

/// Options for [`refresh_subtree`].
#[derive(Debug, Clone, Copy, Default)]
pub struct RefreshOptions {
    /// Record subfolders as empty folder nodes without descending into
    /// them. A fast shallow refresh when only the direct children's own
    /// sizes are needed.
    pub skip_folders: bool,
}

/// Re-enumerate `folder` from the filesystem, replacing its children and
/// re-aggregating sizes up to the root.
///
/// The stale children are detached first (the arena never reuses
/// indices; detached nodes become unreachable and are freed with the
/// tree). Per-entry failures are recorded as unreadable nodes exactly as
/// in the background scan. Fails without mutating the tree if `folder`
/// is not a folder node or its path cannot be listed.
pub fn refresh_subtree(
    tree: &mut FileTree,
    folder: NodeIndex,
    options: RefreshOptions,
) -> Result<(), ScanError> {
    if !tree.node(folder).is_folder() {
        return Err(ScanError::InvalidRoot {
            path: tree.node(folder).path.clone(),
        });
    }

    let path = tree.node(folder).path.clone();
    let entries = fs::read_dir(&path)?;

    tree.clear_children(folder);
    tree.recalculate(folder);

    fill_folder(tree, folder, entries, options.skip_folders);
    Ok(())
}

/// Attach the entries of one listed directory, recursing unless shallow.
fn fill_folder(tree: &mut FileTree, folder: NodeIndex, entries: fs::ReadDir, shallow: bool) {
    for entry_result in entries {
        let entry = match entry_result {
            Ok(entry) => entry,
            Err(err) => {
                warn!("unreadable entry during refresh: {err}");
                continue;
            }
        };

        let child_path = entry.path();
        match fs::symlink_metadata(&child_path) {
            Ok(meta) if meta.is_dir() => {
                let idx = tree.add_folder(folder, child_path.clone());
                if !shallow {
                    descend(tree, idx, &child_path);
                }
            }
            // Symlinks and special entries are leaves measured by their
            // own metadata, same as the background scan.
            Ok(meta) => {
                tree.add_file(folder, child_path, meta.len());
            }
            Err(err) => {
                warn!("cannot stat {}: {err}", child_path.display());
                let kind = if entry.file_type().map(|t| t.is_dir()).unwrap_or(false) {
                    NodeKind::Folder
                } else {
                    NodeKind::File
                };
                tree.add_unreadable(folder, child_path, kind);
            }
        }
    }
}

/// List a freshly attached subfolder and fill it recursively.
fn descend(tree: &mut FileTree, folder: NodeIndex, path: &Path) {
    match fs::read_dir(path) {
        Ok(entries) => fill_folder(tree, folder, entries, false),
        Err(err) => {
            warn!("cannot list {}: {err}", path.display());
            tree.mark_unreadable(folder);
        }
    }
}
