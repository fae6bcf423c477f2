//! Repository discovery and validation.

use std::path::Path;

use git2::Repository;
use tracing::debug;

use crate::error::GitError;

/// Open the repository containing `path`, walking up parent directories the
/// way `git` itself does.
///
/// This is the precondition gate for the whole pipeline: it runs before any
/// network activity so a bad working directory never costs an API call.
pub fn open_repository(path: &Path) -> Result<Repository, GitError> {
    let repo = Repository::discover(path).map_err(GitError::NotARepository)?;
    debug!(workdir = ?repo.workdir(), "opened repository");
    Ok(repo)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_repository_in_work_tree() {
        let dir = tempfile::tempdir().unwrap();
        Repository::init(dir.path()).unwrap();

        let repo = open_repository(dir.path()).unwrap();
        assert!(repo.workdir().is_some());
    }

    #[test]
    fn test_open_repository_discovers_from_subdirectory() {
        let dir = tempfile::tempdir().unwrap();
        Repository::init(dir.path()).unwrap();
        let sub = dir.path().join("src/nested");
        std::fs::create_dir_all(&sub).unwrap();

        assert!(open_repository(&sub).is_ok());
    }

    #[test]
    fn test_not_a_repository_error_message() {
        // Repository::open does not walk up, so an empty tempdir always fails
        let dir = tempfile::tempdir().unwrap();
        let inner = Repository::open(dir.path()).err().unwrap();
        let err = GitError::NotARepository(inner);
        assert!(err.to_string().contains("Not a git repository"));
    }
}
