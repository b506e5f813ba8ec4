//! Repository snapshot analyzer
//!
//! One public operation: shallow-clone a branch into a per-call scratch
//! directory, aggregate statistics over the working tree, and remove the
//! snapshot before returning (on the failure path cleanup is best-effort so
//! the original error is what propagates).

use crate::walk::{scan_tree, TreeTotals};
use chrono::Utc;
use repolens_core::{AnalysisResult, ErrorContext, SnapshotError, SnapshotResult};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::process::Command;
use tracing::{debug, info, warn};

const DEFAULT_BRANCH: &str = "main";

/// Analyzer over transient repository snapshots
///
/// The temp-directory root is an explicit construction-time value; each
/// `analyze` call owns a unique scratch path beneath it, so concurrent calls
/// sharing one root do not interfere.
#[derive(Debug, Clone)]
pub struct RepositoryAnalyzer {
    /// Root under which per-call scratch directories are created
    temp_dir: PathBuf,
    /// Optional bound on the clone step; `None` leaves git's own behavior
    clone_timeout: Option<Duration>,
}

impl RepositoryAnalyzer {
    /// Create a new analyzer rooted at the given temp directory
    pub fn new<P: AsRef<Path>>(temp_dir: P) -> Self {
        Self {
            temp_dir: temp_dir.as_ref().to_path_buf(),
            clone_timeout: None,
        }
    }

    /// Bound the clone step, which is otherwise an unbounded network operation
    pub fn with_clone_timeout(mut self, timeout: Duration) -> Self {
        self.clone_timeout = Some(timeout);
        self
    }

    /// Analyze one branch of a remote repository
    ///
    /// `branch` defaults to `"main"`. Returns aggregate statistics plus the
    /// completion timestamp, or the first failure encountered; no partial
    /// statistics are ever returned.
    pub async fn analyze(
        &self,
        repository_url: &str,
        branch: Option<&str>,
    ) -> SnapshotResult<AnalysisResult> {
        let branch = branch.unwrap_or(DEFAULT_BRANCH);
        let scratch_dir = self.temp_dir.join(scratch_dir_name());
        let snapshot_path = scratch_dir.join(repo_local_name(repository_url));

        info!(
            repository_url = %repository_url,
            branch = %branch,
            snapshot_path = %snapshot_path.display(),
            "Starting repository analysis"
        );

        match self
            .clone_and_scan(repository_url, branch, &snapshot_path)
            .await
        {
            Ok(totals) => {
                cleanup_snapshot(&scratch_dir).await?;

                let result = AnalysisResult {
                    file_count: totals.file_count,
                    total_lines: totals.total_lines,
                    stats: totals.stats,
                    analysis_date: Utc::now(),
                };

                info!(
                    repository_url = %repository_url,
                    file_count = result.file_count,
                    total_lines = result.total_lines,
                    "Repository analysis complete"
                );

                Ok(result)
            }
            Err(e) => {
                // Best-effort cleanup; its own failure never masks the
                // original error.
                if let Err(cleanup_err) = remove_scratch(&scratch_dir).await {
                    warn!(
                        scratch_dir = %scratch_dir.display(),
                        error = %cleanup_err,
                        "Failed to remove snapshot after analysis error"
                    );
                }
                Err(e)
            }
        }
    }

    async fn clone_and_scan(
        &self,
        repository_url: &str,
        branch: &str,
        snapshot_path: &Path,
    ) -> SnapshotResult<TreeTotals> {
        if let Some(parent) = snapshot_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        self.clone_repository(repository_url, branch, snapshot_path)
            .await?;

        // The walk is blocking I/O, so keep it off the async workers
        let snapshot_path = snapshot_path.to_path_buf();
        tokio::task::spawn_blocking(move || scan_tree(snapshot_path))
            .await
            .map_err(|e| SnapshotError::Traversal {
                message: format!("Snapshot scan task failed: {}", e),
                source: Some(Box::new(e)),
                context: ErrorContext::new("repository_analyzer")
                    .with_operation("scan_snapshot"),
            })?
    }

    /// Shallow-clone the requested branch using the system git command
    async fn clone_repository(
        &self,
        repository_url: &str,
        branch: &str,
        target_path: &Path,
    ) -> SnapshotResult<()> {
        let mut cmd = Command::new("git");
        // Discrete argv elements; nothing passes through a shell, so branch
        // and URL cannot smuggle in shell metacharacters.
        cmd.arg("clone")
            .arg("--depth")
            .arg("1")
            .arg("--branch")
            .arg(branch)
            .arg(repository_url)
            .arg(target_path);

        debug!(
            repository_url = %repository_url,
            branch = %branch,
            target_path = %target_path.display(),
            "Running git clone"
        );

        let output = match self.clone_timeout {
            Some(limit) => tokio::time::timeout(limit, cmd.output())
                .await
                .map_err(|_| SnapshotError::Clone {
                    message: format!("Git clone timed out after {:?}", limit),
                    source: None,
                    context: ErrorContext::new("repository_analyzer")
                        .with_operation("clone_repository")
                        .with_suggestion("Increase the clone timeout or check connectivity"),
                })?,
            None => cmd.output().await,
        }
        .map_err(|e| SnapshotError::Clone {
            message: format!("Failed to execute git clone: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("repository_analyzer")
                .with_operation("clone_repository")
                .with_suggestion("Ensure git is installed and accessible"),
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SnapshotError::Clone {
                message: format!("Git clone failed: {}", stderr.trim()),
                source: None,
                context: ErrorContext::new("repository_analyzer")
                    .with_operation("clone_repository")
                    .with_suggestion("Check the repository URL, branch name, and access permissions"),
            });
        }

        Ok(())
    }
}

/// Local name for the snapshot directory: last non-empty path segment with a
/// trailing `.git` stripped, else the literal `"repo"`
fn repo_local_name(repository_url: &str) -> String {
    let segment = repository_url.rsplit('/').next().unwrap_or("");
    // Strip the suffix once; "project.git.git" keeps its inner ".git"
    let name = segment.strip_suffix(".git").unwrap_or(segment);

    if name.is_empty() {
        "repo".to_string()
    } else {
        name.to_string()
    }
}

/// Per-call scratch directory name: millisecond timestamp plus a random
/// token, so calls sharing a temp root never collide even on the same tick
fn scratch_dir_name() -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);

    format!("{}-{:08x}", millis, fastrand::u32(..))
}

/// Success-path cleanup: a removal failure here violates the
/// no-residual-snapshot postcondition and surfaces to the caller
async fn cleanup_snapshot(scratch_dir: &Path) -> SnapshotResult<()> {
    remove_scratch(scratch_dir)
        .await
        .map_err(|e| SnapshotError::Cleanup {
            message: format!(
                "Failed to remove snapshot directory {}: {}",
                scratch_dir.display(),
                e
            ),
            source: Some(Box::new(e)),
            context: ErrorContext::new("repository_analyzer")
                .with_operation("cleanup")
                .with_suggestion("Remove the scratch directory manually"),
        })
}

/// Remove the scratch tree recursively; non-existence is not an error
async fn remove_scratch(path: &Path) -> std::io::Result<()> {
    match tokio::fs::remove_dir_all(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}
