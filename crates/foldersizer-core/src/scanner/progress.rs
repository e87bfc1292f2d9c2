/// Scan progress reporting — lightweight messages sent from the scan
/// thread to the driver via a crossbeam channel.
use crate::model::NodeIndex;
use std::time::Duration;

/// Progress updates sent from the scan thread to the driver.
///
/// The actual tree data is in the shared `LiveTree`; these messages carry
/// only lightweight counters and status flags. A node named by an
/// `Update` was attached (with settled aggregates) before the message was
/// sent, so the driver may read it immediately.
#[derive(Debug, Clone)]
pub enum ScanProgress {
    /// Periodic update with running totals.
    ///
    /// `fraction` estimates overall completion in `[0, 1)`: completed
    /// top-level entries over the root's entry count. Non-decreasing
    /// within one scan; only the terminal message reports completion.
    Update {
        fraction: f32,
        /// Most recently attached node.
        node: NodeIndex,
        files_found: u64,
        dirs_found: u64,
        total_size: u64,
        current_path: String,
    },
    /// A non-fatal error (e.g. permission denied on one entry). The entry
    /// is recorded in the tree as unreadable; traversal continues.
    Error { path: String, message: String },
    /// Scanning completed successfully. The finished tree is in the
    /// shared `LiveTree` with all aggregates settled.
    Complete { duration: Duration, error_count: u64 },
    /// Scan was cancelled by the driver. The partial tree remains
    /// consistent for the subtree actually visited.
    Cancelled,
    /// Unrecoverable failure affecting the whole scan (e.g. the root
    /// vanished mid-traversal). The partial tree is retained.
    Failed { message: String },
}
