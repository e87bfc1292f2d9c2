/// FolderSizer Core — tree model and sizing engine.
///
/// This crate contains all business logic with zero UI dependencies.
/// It is designed to be reusable across different frontends (CLI, GUI, TUI).
///
/// # Modules
///
/// - [`model`] — Arena-allocated file tree with live aggregates, plus
///   presentation helpers (`format_size`, `percent_of_parent`).
/// - [`scanner`] — Single-worker background traversal with progress
///   reporting, cooperative cancellation, and synchronous subtree refresh.
pub mod model;
pub mod scanner;
