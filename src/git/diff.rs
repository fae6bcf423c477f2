//! Staged diff collection using git2.

use std::fmt;

use git2::{Delta, Diff, DiffFormat, ErrorCode, Repository, Tree};
use tracing::{debug, warn};

use crate::error::GitError;

/// Diffs beyond this size get a warning; the prompt builder truncates later.
const LARGE_DIFF_BYTES: usize = 1024 * 1024;

/// Status of a staged file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileStatus {
    Added,
    Modified,
    Deleted,
    Renamed,
}

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileStatus::Added => write!(f, "Added"),
            FileStatus::Modified => write!(f, "Modified"),
            FileStatus::Deleted => write!(f, "Deleted"),
            FileStatus::Renamed => write!(f, "Renamed"),
        }
    }
}

/// A file with staged changes.
#[derive(Debug, Clone)]
pub struct ChangedFile {
    pub path: String,
    pub status: FileStatus,
    /// Old path for renamed files (None for non-rename changes).
    pub old_path: Option<String>,
}

/// The staged changes for one invocation: the unified diff text plus the
/// statistics shown at the review step. Non-empty by construction.
#[derive(Debug, Clone)]
pub struct StagedDiff {
    pub text: String,
    pub files: Vec<ChangedFile>,
    pub insertions: usize,
    pub deletions: usize,
}

impl StagedDiff {
    pub fn byte_len(&self) -> usize {
        self.text.len()
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }
}

/// Resolve the HEAD tree, distinguishing empty-repo errors from real failures.
///
/// Returns `Ok(None)` for repos with no commits (unborn branch / not found),
/// so the initial commit diffs against an empty tree.
fn resolve_head_tree(repo: &Repository) -> Result<Option<Tree<'_>>, GitError> {
    let head_ref = match repo.head() {
        Ok(r) => r,
        Err(e) if e.code() == ErrorCode::UnbornBranch || e.code() == ErrorCode::NotFound => {
            return Ok(None);
        }
        Err(e) => return Err(GitError::DiffFailed(e)),
    };

    let tree = head_ref.peel_to_tree().map_err(GitError::DiffFailed)?;
    Ok(Some(tree))
}

/// Collect the staged diff (index vs HEAD).
///
/// An empty staged diff is [`GitError::NoStagedChanges`], not an empty
/// success: nothing staged means there is nothing to describe, and no model
/// call should happen.
pub fn collect_staged_diff(repo: &Repository) -> Result<StagedDiff, GitError> {
    let head_tree = resolve_head_tree(repo)?;

    let diff = repo
        .diff_tree_to_index(head_tree.as_ref(), None, None)
        .map_err(GitError::DiffFailed)?;

    let files = collect_files(&diff);
    if files.is_empty() {
        return Err(GitError::NoStagedChanges);
    }

    let (text, insertions, deletions) = collect_diff_text(&diff)?;
    if text.trim().is_empty() {
        return Err(GitError::NoStagedChanges);
    }

    if text.len() > LARGE_DIFF_BYTES {
        warn!(bytes = text.len(), "large staged diff; prompt will be truncated");
    }
    debug!(
        files = files.len(),
        insertions, deletions, "collected staged diff"
    );

    Ok(StagedDiff {
        text,
        files,
        insertions,
        deletions,
    })
}

/// Collect changed file entries from the staged diff.
fn collect_files(diff: &Diff<'_>) -> Vec<ChangedFile> {
    let mut files = Vec::new();

    for delta in diff.deltas() {
        let status = match delta.status() {
            Delta::Added => FileStatus::Added,
            Delta::Deleted => FileStatus::Deleted,
            Delta::Renamed => FileStatus::Renamed,
            _ => FileStatus::Modified,
        };

        let new_path = delta
            .new_file()
            .path()
            .map(|p| p.to_string_lossy().to_string());
        let old_path = delta
            .old_file()
            .path()
            .map(|p| p.to_string_lossy().to_string());

        let (path, old_path) = match status {
            FileStatus::Renamed => {
                let path = new_path.or_else(|| old_path.clone()).unwrap_or_default();
                (path, old_path)
            }
            _ => (new_path.or(old_path).unwrap_or_default(), None),
        };

        if !path.is_empty() {
            files.push(ChangedFile {
                path,
                status,
                old_path,
            });
        }
    }

    files.sort_by(|a, b| a.path.cmp(&b.path));
    files
}

/// Assemble unified diff text with insertion/deletion counts.
fn collect_diff_text(diff: &Diff<'_>) -> Result<(String, usize, usize), GitError> {
    let mut text = String::new();
    let mut insertions = 0usize;
    let mut deletions = 0usize;

    diff.print(DiffFormat::Patch, |_delta, _hunk, line| {
        match line.origin() {
            '+' => insertions += 1,
            '-' => deletions += 1,
            _ => {}
        }

        let origin = line.origin();
        if origin == '+' || origin == '-' || origin == ' ' {
            text.push(origin);
        }
        text.push_str(std::str::from_utf8(line.content()).unwrap_or(""));

        true
    })
    .map_err(GitError::DiffFailed)?;

    Ok((text, insertions, deletions))
}
