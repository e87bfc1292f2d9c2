//! FolderSizer — disk usage analyser for directory trees.
//!
//! Thin binary entry point: argument parsing, log wiring, and rendering.
//! All sizing logic lives in the `foldersizer-core` crate.

use anyhow::Context;
use clap::Parser;
use foldersizer_core::model::{format_size, FileTree, NodeIndex};
use foldersizer_core::scanner::progress::ScanProgress;
use foldersizer_core::scanner::start_scan;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "foldersizer",
    version,
    about = "Measure how disk space is spent across a directory tree"
)]
struct Args {
    /// Directory to scan.
    path: PathBuf,

    /// How many levels of the sized tree to print.
    #[arg(long, default_value_t = 2)]
    depth: usize,

    /// Print each folder's children largest-first instead of in
    /// filesystem order.
    #[arg(long)]
    sort_size: bool,

    /// Suppress per-entry diagnostics (unreadable files, denied folders).
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> anyhow::Result<()> {
    // Initialise structured logging.
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let args = Args::parse();

    let handle = start_scan(args.path.clone())
        .with_context(|| format!("cannot scan {}", args.path.display()))?;

    // Drain progress until the terminal message. The worker never blocks
    // on us for long (bounded channel), and we never touch the tree until
    // the terminal handoff.
    loop {
        match handle.progress_rx.recv() {
            Ok(ScanProgress::Update {
                fraction,
                files_found,
                dirs_found,
                total_size,
                ..
            }) => {
                tracing::debug!(
                    "{:3.0}% — {files_found} files, {dirs_found} dirs, {}",
                    fraction * 100.0,
                    format_size(total_size)
                );
            }
            Ok(ScanProgress::Error { path, message }) => {
                if !args.quiet {
                    tracing::warn!("{path}: {message}");
                }
            }
            Ok(ScanProgress::Complete {
                duration,
                error_count,
            }) => {
                tracing::info!(
                    "Scan of {} complete in {duration:?} ({error_count} unreadable entries)",
                    args.path.display()
                );
                break;
            }
            Ok(ScanProgress::Cancelled) => {
                tracing::info!("Scan cancelled — printing the partial tree");
                break;
            }
            Ok(ScanProgress::Failed { message }) => {
                anyhow::bail!("scan failed: {message}");
            }
            Err(_) => break,
        }
    }

    let tree = handle.live_tree.read();
    print_subtree(&tree, tree.root(), 0, &args);
    Ok(())
}

/// Render one node and, within the depth budget, its children.
fn print_subtree(tree: &FileTree, index: NodeIndex, level: usize, args: &Args) {
    let node = tree.node(index);
    let indent = "  ".repeat(level);
    let marker = if node.unreadable { "  [unreadable]" } else { "" };
    let percent = tree.percent_of_parent(index);

    if node.is_folder() {
        println!(
            "{indent}{}/  {}  {percent:3.0}%  {} items{marker}",
            node.name,
            format_size(node.total_size),
            node.item_count
        );
    } else {
        println!(
            "{indent}{}  {}  {percent:3.0}%{marker}",
            node.name,
            format_size(node.total_size)
        );
    }

    if level >= args.depth || !node.is_folder() {
        return;
    }
    let children = if args.sort_size {
        tree.children_sorted_by_size(index)
    } else {
        tree.children(index).to_vec()
    };
    for child in children {
        print_subtree(tree, child, level + 1, args);
    }
}
