//! Commit creation for already-staged content.

use git2::{Oid, Repository};
use tracing::debug;

use crate::error::GitError;

/// Create a commit from the current index with the given message text.
///
/// The index is used as-is: graphe describes what the user staged, it never
/// stages anything itself. Must be the last operation in the pipeline.
pub fn create_commit(repo: &Repository, message: &str) -> Result<Oid, GitError> {
    let mut index = repo.index().map_err(GitError::CommitFailed)?;
    let tree_id = index.write_tree().map_err(GitError::CommitFailed)?;
    let tree = repo.find_tree(tree_id).map_err(GitError::CommitFailed)?;

    let sig = repo.signature().map_err(GitError::ConfigError)?;

    // No parent on an unborn branch (initial commit)
    let parent = match repo.head() {
        Ok(head) => Some(head.peel_to_commit().map_err(GitError::CommitFailed)?),
        Err(_) => None,
    };
    let parents: Vec<&git2::Commit> = parent.iter().collect();

    let oid = repo
        .commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
        .map_err(GitError::CommitFailed)?;

    debug!(%oid, "created commit");
    Ok(oid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn init_repo(dir: &Path) -> Repository {
        let repo = Repository::init(dir).unwrap();
        let mut config = repo.config().unwrap();
        config.set_str("user.name", "Test User").unwrap();
        config.set_str("user.email", "test@test.com").unwrap();
        repo
    }

    #[test]
    fn test_commit_staged_file() {
        let dir = tempfile::tempdir().unwrap();
        let repo = init_repo(dir.path());

        std::fs::write(dir.path().join("test.txt"), "hello\n").unwrap();
        let mut index = repo.index().unwrap();
        index.add_path(Path::new("test.txt")).unwrap();
        index.write().unwrap();

        let oid = create_commit(&repo, "feat: add test file").unwrap();
        let commit = repo.find_commit(oid).unwrap();
        assert_eq!(commit.message().unwrap(), "feat: add test file");
        // Initial commit on an unborn branch has no parents
        assert_eq!(commit.parent_count(), 0);
    }

    #[test]
    fn test_commit_chains_onto_head() {
        let dir = tempfile::tempdir().unwrap();
        let repo = init_repo(dir.path());

        std::fs::write(dir.path().join("a.txt"), "a\n").unwrap();
        let mut index = repo.index().unwrap();
        index.add_path(Path::new("a.txt")).unwrap();
        index.write().unwrap();
        let first = create_commit(&repo, "feat: first").unwrap();

        std::fs::write(dir.path().join("b.txt"), "b\n").unwrap();
        let mut index = repo.index().unwrap();
        index.add_path(Path::new("b.txt")).unwrap();
        index.write().unwrap();
        let second = create_commit(&repo, "feat: second").unwrap();

        let commit = repo.find_commit(second).unwrap();
        assert_eq!(commit.parent_count(), 1);
        assert_eq!(commit.parent_id(0).unwrap(), first);
    }

    #[test]
    fn test_commit_preserves_multiline_message() {
        let dir = tempfile::tempdir().unwrap();
        let repo = init_repo(dir.path());

        std::fs::write(dir.path().join("x.txt"), "x\n").unwrap();
        let mut index = repo.index().unwrap();
        index.add_path(Path::new("x.txt")).unwrap();
        index.write().unwrap();

        let message = "fix(core): handle zero\n\nZero-length input crashed the parser.";
        let oid = create_commit(&repo, message).unwrap();
        assert_eq!(repo.find_commit(oid).unwrap().message().unwrap(), message);
    }
}
