//! Git operations using git2-rs.

pub mod commit;
pub mod diff;
pub mod repo;

pub use commit::create_commit;
pub use diff::{ChangedFile, FileStatus, StagedDiff, collect_staged_diff};
pub use repo::open_repository;
