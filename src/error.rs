//! Error types for graphe modules using thiserror.

use thiserror::Error;

/// Errors from environment/configuration loading.
#[derive(Error, Debug)]
pub enum EnvError {
    #[error(
        "GEMINI_API_KEY not set. Export it or add it to a .env file in the repository root."
    )]
    MissingApiKey,

    #[error("Invalid value for {var}: '{value}' ({reason})")]
    InvalidValue {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Errors from git operations.
#[derive(Error, Debug)]
pub enum GitError {
    #[error("Not a git repository. Run graphe from within a git work tree.")]
    NotARepository(#[source] git2::Error),

    #[error("No staged changes found. Stage your changes with 'git add' first.")]
    NoStagedChanges,

    #[error("Failed to collect staged diff: {0}")]
    DiffFailed(#[source] git2::Error),

    #[error("Failed to create commit: {0}")]
    CommitFailed(#[source] git2::Error),

    #[error("Git config error (missing user.name or user.email): {0}")]
    ConfigError(#[source] git2::Error),
}

/// Errors from the remote generation service.
///
/// Split along the transient/permanent line: transient kinds are retried with
/// backoff up to the configured attempt cap, permanent kinds fail immediately.
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Authentication failed ({status}): check GEMINI_API_KEY")]
    AuthFailed { status: u16 },

    #[error("Rate limited by the generation API")]
    RateLimited,

    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    #[error("Generation API unavailable ({status}): {message}")]
    Unavailable { status: u16, message: String },

    #[error("Malformed request rejected by the generation API: {0}")]
    InvalidRequest(String),

    #[error("Failed to reach the generation API: {0}")]
    Network(#[source] reqwest::Error),

    #[error("Generation API returned an unexpected response: {0}")]
    UnexpectedResponse(String),

    #[error("All {attempts} attempt(s) failed: {source}")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        source: Box<ModelError>,
    },
}

impl ModelError {
    /// Whether a retry could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            ModelError::RateLimited
            | ModelError::Timeout(_)
            | ModelError::Unavailable { .. }
            | ModelError::Network(_) => true,
            ModelError::AuthFailed { .. }
            | ModelError::InvalidRequest(_)
            | ModelError::UnexpectedResponse(_)
            | ModelError::RetriesExhausted { .. } => false,
        }
    }
}

/// Errors from commit message grammar validation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("Model returned an empty message")]
    EmptyMessage,

    #[error("Subject line has no ':' separating type and description")]
    MissingColon,

    #[error("Unknown commit type '{0}' (expected one of the conventional types)")]
    UnknownType(String),

    #[error("Scope cannot be empty when parentheses are present")]
    EmptyScope,

    #[error("Description after ':' is empty")]
    EmptySubject,

    #[error("Subject repeats the '{0}:' type prefix")]
    RepeatedTypePrefix(String),

    #[error("Subject line is {actual} characters (limit {limit})")]
    SubjectTooLong { actual: usize, limit: usize },

    #[error("Message contains multiple header lines")]
    MultipleHeaders,

    #[error("Body must be separated from the subject by a blank line")]
    UnseparatedBody,
}
