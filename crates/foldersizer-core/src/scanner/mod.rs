/// Scanner module — orchestrates filesystem sizing scans.
///
/// A scan is a single cancellable depth-first traversal run by **one**
/// background worker thread. The worker writes into a shared `LiveTree`
/// (`Arc<RwLock<FileTree>>`) so the driver can render a real-time,
/// incrementally-growing view while the scan is running, and reports
/// lightweight progress over a bounded channel.
pub mod progress;
pub mod refresh;

mod walker;

use crate::model::FileTree;
use progress::ScanProgress;

use crossbeam_channel::Receiver;
use parking_lot::RwLock;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;
use std::thread;
use thiserror::Error;
use tracing::info;

/// A shared, concurrently-readable file tree.
///
/// The scanner holds a write lock briefly for each attach. The driver
/// takes a read lock whenever it wants a snapshot; because every attach
/// propagates aggregates before releasing the lock, any snapshot is
/// structurally consistent, merely size-incomplete while the scan runs.
pub type LiveTree = Arc<RwLock<FileTree>>;

/// Maximum number of progress messages that may queue up in the channel.
///
/// The driver drains this channel on its own cadence. A burst of 4 096
/// messages gives the scanner generous headroom before back-pressure
/// causes `send` to block; if the driver falls behind, the scanner stalls
/// briefly rather than consuming unbounded heap.
pub const PROGRESS_CHANNEL_CAPACITY: usize = 4_096;

/// Lifecycle of one scan: `Idle -> Running -> {Completed | Cancelled | Failed}`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum ScanStatus {
    /// No worker bound yet. Never observed through a live handle.
    Idle = 0,
    Running = 1,
    Completed = 2,
    Cancelled = 3,
    Failed = 4,
}

impl ScanStatus {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => ScanStatus::Idle,
            1 => ScanStatus::Running,
            2 => ScanStatus::Completed,
            3 => ScanStatus::Cancelled,
            _ => ScanStatus::Failed,
        }
    }

    /// Whether this is a terminal state.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            ScanStatus::Completed | ScanStatus::Cancelled | ScanStatus::Failed
        )
    }
}

/// Errors reported synchronously by the scanning entry points.
///
/// Per-entry failures during traversal are never errors at this level;
/// they become unreadable nodes plus [`ScanProgress::Error`] diagnostics.
#[derive(Debug, Error)]
pub enum ScanError {
    /// The scan or refresh target is missing or not a directory.
    #[error("invalid scan root: {path:?} does not exist or is not a directory")]
    InvalidRoot { path: PathBuf },

    /// I/O failure on the synchronous (refresh) path.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Handle to a running or completed scan. Allows cancellation, status
/// queries, and receiving progress updates.
pub struct ScanHandle {
    /// Receiver for progress updates from the scan thread.
    pub progress_rx: Receiver<ScanProgress>,
    /// Shared tree that is populated incrementally during scanning.
    pub live_tree: LiveTree,
    /// Flag to request cancellation.
    cancel_flag: Arc<AtomicBool>,
    /// Current scan state, written by the worker.
    status: Arc<AtomicU8>,
    /// Join handle for the scan thread.
    thread: Option<thread::JoinHandle<()>>,
}

impl ScanHandle {
    /// Request the scan to stop as soon as possible.
    ///
    /// Safe from any thread, idempotent, and a no-op once the scan has
    /// reached a terminal state. Cancellation is cooperative: the worker
    /// checks the flag once per filesystem entry.
    pub fn cancel(&self) {
        self.cancel_flag.store(true, Ordering::Relaxed);
    }

    /// Check whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancel_flag.load(Ordering::Relaxed)
    }

    /// Current state of the scan's lifecycle.
    ///
    /// The worker stores the terminal state *before* sending the terminal
    /// progress message, so a driver that has seen the terminal message
    /// always reads a settled status here.
    pub fn status(&self) -> ScanStatus {
        ScanStatus::from_u8(self.status.load(Ordering::Acquire))
    }

    /// Block until the worker thread has exited.
    ///
    /// Only needed for explicit shutdown; dropping the handle detaches
    /// the worker instead, which keeps running until its next
    /// cancellation check.
    pub fn join(mut self) {
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

/// Start a new scan on a background thread.
///
/// Validates the root synchronously: if `root_path` does not exist or is
/// not a directory, returns [`ScanError::InvalidRoot`] and no worker is
/// started (and no progress message will ever arrive). Otherwise returns
/// a [`ScanHandle`] for receiving progress, accessing the live tree, and
/// requesting cancellation.
pub fn start_scan(root_path: PathBuf) -> Result<ScanHandle, ScanError> {
    let is_dir = std::fs::metadata(&root_path)
        .map(|meta| meta.is_dir())
        .unwrap_or(false);
    if !is_dir {
        return Err(ScanError::InvalidRoot { path: root_path });
    }

    let (progress_tx, progress_rx) =
        crossbeam_channel::bounded::<ScanProgress>(PROGRESS_CHANNEL_CAPACITY);
    let cancel_flag = Arc::new(AtomicBool::new(false));
    let cancel_clone = cancel_flag.clone();
    let status = Arc::new(AtomicU8::new(ScanStatus::Running as u8));
    let status_clone = status.clone();

    let live_tree: LiveTree = Arc::new(RwLock::new(FileTree::with_capacity(
        root_path.clone(),
        100_000,
    )));
    let tree_clone = live_tree.clone();

    let thread = thread::Builder::new()
        .name("foldersizer-scanner".into())
        .spawn(move || {
            info!("Starting scan of {}", root_path.display());
            walker::scan_tree(root_path, tree_clone, progress_tx, cancel_clone, status_clone);
        })
        .expect("failed to spawn scanner thread");

    Ok(ScanHandle {
        progress_rx,
        live_tree,
        cancel_flag,
        status,
        thread: Some(thread),
    })
}
