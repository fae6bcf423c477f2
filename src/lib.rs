//! graphe - A CLI tool that turns staged git changes into conventional
//! commit messages.
//!
//! # Overview
//!
//! graphe reads the staged diff, asks a Gemini model for a Conventional
//! Commits message, validates the reply against the grammar, and commits
//! once the user accepts the candidate.

pub mod config;
pub mod error;
pub mod git;
pub mod message;
pub mod model;
pub mod pipeline;
pub mod prompt;

// Re-export commonly used types
pub use config::{Config, GenerationParams};
pub use error::{EnvError, FormatError, GitError, ModelError};
pub use git::{ChangedFile, FileStatus, StagedDiff};
pub use message::{CommitMessage, CommitType};
pub use model::{GeminiClient, ModelResponse, TextGenerator};
pub use pipeline::{AbortReason, Outcome, ReviewDecision, Reviewer};
pub use prompt::{PromptPayload, PromptStyle};
