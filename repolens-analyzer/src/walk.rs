//! Snapshot tree traversal and aggregation
//!
//! Walks a cloned working tree with an explicit accumulator, skipping
//! `node_modules` and `.git` subtrees entirely.

use repolens_core::{ErrorContext, FileCategory, ProjectStats, SnapshotError, SnapshotResult};
use std::path::Path;
use tracing::trace;
use walkdir::{DirEntry, WalkDir};

/// Directories pruned from the walk, wherever they appear in the tree
const SKIPPED_DIRS: [&str; 2] = ["node_modules", ".git"];

/// Running totals for one tree scan
///
/// Merged by plain addition over disjoint files, so the walk order never
/// affects the outcome.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TreeTotals {
    pub file_count: usize,
    pub total_lines: usize,
    pub stats: ProjectStats,
}

impl TreeTotals {
    fn visit_file(&mut self, path: &Path, content: &str) {
        self.file_count += 1;
        self.total_lines += line_segments(content);

        if let Some(category) = path
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(FileCategory::from_extension)
        {
            self.stats.record(category);
        }
    }
}

/// Number of `\n`-delimited segments in the content
///
/// This is newline-count + 1: a trailing newline produces one extra empty
/// segment and an empty file counts as a single line. Downstream consumers
/// depend on this exact arithmetic, so it is kept as-is rather than
/// normalized to an editor-style line count.
fn line_segments(content: &str) -> usize {
    content.split('\n').count()
}

fn is_skipped_dir(entry: &DirEntry) -> bool {
    entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .map(|name| SKIPPED_DIRS.contains(&name))
            .unwrap_or(false)
}

/// Scan a snapshot tree and aggregate file/line statistics
///
/// Only regular files are visited; symlinks are not followed and non-regular
/// entries (devices, sockets) contribute nothing. Any listing or read error
/// aborts the scan - no partial totals escape.
pub fn scan_tree<P: AsRef<Path>>(root: P) -> SnapshotResult<TreeTotals> {
    let root = root.as_ref();
    let mut totals = TreeTotals::default();

    // The skip set applies to directories inside the tree, never to the
    // root itself (a repository may legitimately be named node_modules).
    let walker = WalkDir::new(root)
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_skipped_dir(entry));

    for entry in walker {
        let entry = entry.map_err(|e| SnapshotError::Traversal {
            message: format!("Failed to list directory entry: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("tree_walk")
                .with_operation("scan_tree")
                .with_metadata("root", &root.display().to_string()),
        })?;

        if !entry.file_type().is_file() {
            continue;
        }

        let content =
            std::fs::read_to_string(entry.path()).map_err(|e| SnapshotError::Traversal {
                message: format!("Failed to read file {}: {}", entry.path().display(), e),
                source: Some(Box::new(e)),
                context: ErrorContext::new("tree_walk").with_operation("read_file"),
            })?;

        totals.visit_file(entry.path(), &content);
        trace!(path = %entry.path().display(), "Visited file");
    }

    Ok(totals)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_file(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent dirs");
        }
        fs::write(path, content).expect("write fixture file");
    }

    #[test]
    fn counts_lines_with_trailing_newline() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "a.ts", "x\ny\n");

        let totals = scan_tree(dir.path()).unwrap();
        assert_eq!(totals.file_count, 1);
        // Two newlines split into three segments
        assert_eq!(totals.total_lines, 3);
        assert_eq!(totals.stats.script_files, 1);
    }

    #[test]
    fn counts_lines_without_trailing_newline() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "data.json", "{}");

        let totals = scan_tree(dir.path()).unwrap();
        assert_eq!(totals.file_count, 1);
        assert_eq!(totals.total_lines, 1);
        assert_eq!(totals.stats.data_files, 1);
    }

    #[test]
    fn empty_file_counts_one_segment() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "empty.md", "");

        let totals = scan_tree(dir.path()).unwrap();
        assert_eq!(totals.total_lines, 1);
        assert_eq!(totals.stats.doc_files, 1);
    }

    #[test]
    fn skips_node_modules_and_git_subtrees() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "readme.md", "# hello\n");
        write_file(dir.path(), "node_modules/lib/index.js", "module.exports = 1;\n");
        write_file(dir.path(), ".git/config", "[core]\n");
        write_file(dir.path(), "nested/node_modules/deep/file.ts", "x\n");

        let totals = scan_tree(dir.path()).unwrap();
        assert_eq!(totals.file_count, 1);
        assert_eq!(totals.total_lines, 2);
        assert_eq!(totals.stats.script_files, 0);
        assert_eq!(totals.stats.doc_files, 1);
    }

    #[test]
    fn root_named_like_skipped_dir_is_scanned() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("node_modules");
        write_file(&root, "a.ts", "x\ny\n");
        write_file(&root, "node_modules/inner.js", "skipped\n");

        let totals = scan_tree(&root).unwrap();
        assert_eq!(totals.file_count, 1);
        assert_eq!(totals.total_lines, 3);
        assert_eq!(totals.stats.script_files, 1);
    }

    #[test]
    fn classification_is_case_insensitive() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "README.MD", "docs\n");
        write_file(dir.path(), "App.TSX", "render\n");

        let totals = scan_tree(dir.path()).unwrap();
        assert_eq!(totals.stats.doc_files, 1);
        assert_eq!(totals.stats.script_files, 1);
    }

    #[test]
    fn uncategorized_files_still_count() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "main.rs", "fn main() {}\n");
        write_file(dir.path(), "Makefile", "all:\n");

        let totals = scan_tree(dir.path()).unwrap();
        assert_eq!(totals.file_count, 2);
        assert_eq!(totals.total_lines, 4);
        assert_eq!(totals.stats.categorized(), 0);
    }

    #[test]
    fn empty_tree_yields_zero_totals() {
        let dir = TempDir::new().unwrap();

        let totals = scan_tree(dir.path()).unwrap();
        assert_eq!(totals, TreeTotals::default());
    }

    #[cfg(unix)]
    #[test]
    fn symlinks_are_not_visited() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "real.md", "content\n");
        std::os::unix::fs::symlink(dir.path().join("real.md"), dir.path().join("link.md"))
            .expect("create symlink");

        let totals = scan_tree(dir.path()).unwrap();
        assert_eq!(totals.file_count, 1);
        assert_eq!(totals.stats.doc_files, 1);
    }
}
