/// Single-threaded depth-first walker — the worker behind `start_scan`.
///
/// Traversal is pre-order recursive descent: a directory's entries are
/// processed in enumeration order, descending into each subdirectory
/// before moving to its siblings. Every node is attached under one brief
/// write-lock acquisition that also propagates aggregates to the root, so
/// a concurrent reader never observes a half-propagated tree.
///
/// The cancellation flag is checked once per filesystem entry. Per-entry
/// failures become unreadable nodes plus diagnostics; only a failure to
/// list the root itself fails the scan.
use crate::model::{NodeIndex, NodeKind};
use crate::scanner::progress::ScanProgress;
use crate::scanner::{LiveTree, ScanStatus};

use crossbeam_channel::Sender;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

/// Coalescing interval for progress messages: at most one `Update` per
/// this many entries. Keeps the channel traffic bounded on huge trees
/// while still updating several times a second on a spinning disk.
const PROGRESS_EVERY: u64 = 512;

/// Marker for cooperative cancellation unwinding the recursion.
struct Stopped;

struct WalkContext {
    live_tree: LiveTree,
    progress_tx: Sender<ScanProgress>,
    cancel_flag: Arc<AtomicBool>,
    files_found: u64,
    dirs_found: u64,
    total_size: u64,
    error_count: u64,
    entries_seen: u64,
    /// Completed top-level entries over the root's entry count. Only ever
    /// increases, and stays below 1.0 — completion is reported by the
    /// terminal message alone.
    fraction: f32,
    /// Most recently attached node, named in `Update` messages.
    last_attached: NodeIndex,
}

impl WalkContext {
    /// Handle one directory entry: cancellation check, classification,
    /// attach, and recursive descent for subdirectories.
    fn process_entry(
        &mut self,
        parent: NodeIndex,
        entry_result: io::Result<fs::DirEntry>,
    ) -> Result<(), Stopped> {
        if self.cancel_flag.load(Ordering::Relaxed) {
            return Err(Stopped);
        }

        let entry = match entry_result {
            Ok(entry) => entry,
            Err(err) => {
                // The entry could not even be enumerated, so there is no
                // name to pin a node on; report against the parent.
                let parent_path = self.live_tree.read().node(parent).path.clone();
                self.error_count += 1;
                warn!("unreadable entry under {}: {err}", parent_path.display());
                let _ = self.progress_tx.send(ScanProgress::Error {
                    path: parent_path.display().to_string(),
                    message: format!("{err}"),
                });
                self.bump(&parent_path);
                return Ok(());
            }
        };

        let path = entry.path();
        let meta = match fs::symlink_metadata(&path) {
            Ok(meta) => meta,
            Err(err) => {
                // Stat failure: keep the entry in the tree with zero size.
                let kind = if entry.file_type().map(|t| t.is_dir()).unwrap_or(false) {
                    NodeKind::Folder
                } else {
                    NodeKind::File
                };
                let idx = self
                    .live_tree
                    .write()
                    .add_unreadable(parent, path.clone(), kind);
                self.last_attached = idx;
                self.error_count += 1;
                warn!("cannot stat {}: {err}", path.display());
                let _ = self.progress_tx.send(ScanProgress::Error {
                    path: path.display().to_string(),
                    message: format!("{err}"),
                });
                self.bump(&path);
                return Ok(());
            }
        };

        // symlink_metadata never follows links, so a symlink lands in the
        // leaf branch below and is measured by the link's own metadata.
        if meta.is_dir() {
            let idx = self.live_tree.write().add_folder(parent, path.clone());
            self.last_attached = idx;
            self.dirs_found += 1;
            self.bump(&path);

            match fs::read_dir(&path) {
                Ok(entries) => {
                    for child in entries {
                        self.process_entry(idx, child)?;
                    }
                }
                Err(err) => {
                    // The folder was statted fine but cannot be listed
                    // (typically permission denied). Flag it and move on.
                    self.live_tree.write().mark_unreadable(idx);
                    self.error_count += 1;
                    warn!("cannot list {}: {err}", path.display());
                    let _ = self.progress_tx.send(ScanProgress::Error {
                        path: path.display().to_string(),
                        message: format!("{err}"),
                    });
                }
            }
        } else {
            let size = meta.len();
            let idx = self.live_tree.write().add_file(parent, path.clone(), size);
            self.last_attached = idx;
            self.files_found += 1;
            self.total_size += size;
            self.bump(&path);
        }

        Ok(())
    }

    /// Count one processed entry and emit a coalesced progress update.
    fn bump(&mut self, current: &Path) {
        self.entries_seen += 1;
        if self.entries_seen % PROGRESS_EVERY == 0 {
            let _ = self.progress_tx.send(ScanProgress::Update {
                fraction: self.fraction,
                node: self.last_attached,
                files_found: self.files_found,
                dirs_found: self.dirs_found,
                total_size: self.total_size,
                current_path: current.display().to_string(),
            });
        }
    }
}

/// Scan a directory tree depth-first on the calling (worker) thread.
///
/// Writes nodes into `live_tree` incrementally; stores the terminal
/// [`ScanStatus`] before sending the single terminal progress message.
pub(crate) fn scan_tree(
    root_path: PathBuf,
    live_tree: LiveTree,
    progress_tx: Sender<ScanProgress>,
    cancel_flag: Arc<AtomicBool>,
    status: Arc<AtomicU8>,
) {
    let start = Instant::now();
    let root_idx = live_tree.read().root();

    // The root listing is the one failure that fails the whole scan —
    // `start_scan` validated the root, so an error here means it vanished
    // or became unreadable in between.
    let top_entries: Vec<io::Result<fs::DirEntry>> = match fs::read_dir(&root_path) {
        Ok(entries) => entries.collect(),
        Err(err) => {
            warn!("cannot list scan root {}: {err}", root_path.display());
            status.store(ScanStatus::Failed as u8, Ordering::Release);
            let _ = progress_tx.send(ScanProgress::Failed {
                message: format!("cannot list {}: {err}", root_path.display()),
            });
            return;
        }
    };

    let top_total = top_entries.len().max(1);
    let mut ctx = WalkContext {
        live_tree,
        progress_tx,
        cancel_flag,
        files_found: 0,
        dirs_found: 1, // count the root
        total_size: 0,
        error_count: 0,
        entries_seen: 0,
        fraction: 0.0,
        last_attached: root_idx,
    };

    for (done, entry_result) in top_entries.into_iter().enumerate() {
        if ctx.process_entry(root_idx, entry_result).is_err() {
            status.store(ScanStatus::Cancelled as u8, Ordering::Release);
            debug!(
                "Scan cancelled after {} entries in {:?}",
                ctx.entries_seen,
                start.elapsed()
            );
            let _ = ctx.progress_tx.send(ScanProgress::Cancelled);
            return;
        }

        // Progress denominator is the number of top-level entries; the
        // estimate advances as each top-level subtree completes and caps
        // below 1.0 so only the terminal message reports completion.
        let raw = (done + 1) as f32 / top_total as f32;
        if raw < 1.0 {
            ctx.fraction = raw;
        }
    }

    let duration = start.elapsed();
    debug!(
        "Scan walk complete: {} files, {} dirs, {} errors in {duration:?}",
        ctx.files_found, ctx.dirs_found, ctx.error_count
    );

    status.store(ScanStatus::Completed as u8, Ordering::Release);
    let _ = ctx.progress_tx.send(ScanProgress::Complete {
        duration,
        error_count: ctx.error_count,
    });
}
