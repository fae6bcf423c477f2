//! The generate/review/commit pipeline, modeled as an explicit state machine.
//!
//! States: Idle → Diffing → Generating → AwaitingReview → Committing → Done,
//! with Aborted reachable from every non-terminal state. The controller is
//! the only place that decides retry-versus-surface; lower layers classify
//! failures and return them untouched.

pub mod review;

use std::fmt;
use std::path::Path;

use tracing::debug;

use crate::config::Config;
use crate::error::GitError;
use crate::git::{collect_staged_diff, create_commit, open_repository};
use crate::message::{CommitMessage, parse_message};
use crate::model::{TextGenerator, generate_with_retry};
use crate::prompt::{PromptStyle, build_prompt};

pub use review::{AutoAcceptReviewer, ReviewDecision, Reviewer, TermReviewer};

/// Pipeline states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Idle,
    Diffing,
    Generating,
    AwaitingReview,
    Committing,
    Done,
    Aborted,
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            State::Idle => "Idle",
            State::Diffing => "Diffing",
            State::Generating => "Generating",
            State::AwaitingReview => "AwaitingReview",
            State::Committing => "Committing",
            State::Done => "Done",
            State::Aborted => "Aborted",
        };
        f.write_str(name)
    }
}

/// One generation attempt that failed format validation, preserved so the
/// user can recover the raw text manually.
#[derive(Debug, Clone)]
pub struct GenerationAttempt {
    pub raw: String,
    pub error: String,
}

/// Why the run aborted. Always carries a human-readable reason.
#[derive(Debug)]
pub enum AbortReason {
    NotARepository(String),
    NothingStaged,
    GitFailed(String),
    GenerationFailed {
        detail: String,
        attempts: Vec<GenerationAttempt>,
    },
    RegenerateLimitReached {
        last_message: CommitMessage,
    },
    Cancelled,
    CommitFailed {
        rendered_message: String,
        detail: String,
    },
}

impl AbortReason {
    /// Distinct exit codes for scripting: 2 = not a repository,
    /// 3 = nothing staged, 4 = generation failed, 1 = everything else.
    pub fn exit_code(&self) -> i32 {
        match self {
            AbortReason::NotARepository(_) => 2,
            AbortReason::NothingStaged => 3,
            AbortReason::GenerationFailed { .. } => 4,
            AbortReason::GitFailed(_)
            | AbortReason::RegenerateLimitReached { .. }
            | AbortReason::Cancelled
            | AbortReason::CommitFailed { .. } => 1,
        }
    }
}

impl fmt::Display for AbortReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbortReason::NotARepository(detail) => write!(f, "{detail}"),
            AbortReason::NothingStaged => {
                write!(f, "No staged changes found. Stage your changes with 'git add' first.")
            }
            AbortReason::GitFailed(detail) => write!(f, "Git operation failed: {detail}"),
            AbortReason::GenerationFailed { detail, attempts } => {
                write!(f, "Commit message generation failed: {detail}")?;
                for (i, attempt) in attempts.iter().enumerate() {
                    write!(
                        f,
                        "\n\nRejected candidate {} ({}):\n{}",
                        i + 1,
                        attempt.error,
                        attempt.raw
                    )?;
                }
                Ok(())
            }
            AbortReason::RegenerateLimitReached { last_message } => write!(
                f,
                "Regeneration limit reached. Last candidate:\n\n{}",
                last_message.render()
            ),
            AbortReason::Cancelled => write!(f, "Commit cancelled by user"),
            AbortReason::CommitFailed {
                rendered_message,
                detail,
            } => write!(
                f,
                "Commit failed: {detail}\n\nYour generated message is preserved below for manual use:\n\n{rendered_message}"
            ),
        }
    }
}

/// Terminal pipeline result.
#[derive(Debug)]
pub enum Outcome {
    Done {
        oid: git2::Oid,
        message: CommitMessage,
    },
    /// Dry run: a message was accepted but no commit was created.
    Previewed { message: CommitMessage },
    Aborted(AbortReason),
}

impl Outcome {
    pub fn exit_code(&self) -> i32 {
        match self {
            Outcome::Done { .. } | Outcome::Previewed { .. } => 0,
            Outcome::Aborted(reason) => reason.exit_code(),
        }
    }
}

fn transition(from: &mut State, to: State) {
    debug!(%from, %to, "state transition");
    *from = to;
}

/// Run the whole pipeline for the repository containing `workdir`.
///
/// The generator and reviewer are injected so tests can drive the machine
/// with scripted model outputs and scripted user responses.
pub async fn run(
    workdir: &Path,
    generator: &dyn TextGenerator,
    reviewer: &mut dyn Reviewer,
    config: &Config,
    dry_run: bool,
) -> Outcome {
    let mut state = State::Idle;

    // Repository validation happens before any network activity
    transition(&mut state, State::Diffing);
    let repo = match open_repository(workdir) {
        Ok(repo) => repo,
        Err(e) => {
            transition(&mut state, State::Aborted);
            return Outcome::Aborted(AbortReason::NotARepository(e.to_string()));
        }
    };

    let diff = match collect_staged_diff(&repo) {
        Ok(diff) => diff,
        Err(GitError::NoStagedChanges) => {
            transition(&mut state, State::Aborted);
            return Outcome::Aborted(AbortReason::NothingStaged);
        }
        Err(e) => {
            transition(&mut state, State::Aborted);
            return Outcome::Aborted(AbortReason::GitFailed(e.to_string()));
        }
    };

    let style = PromptStyle {
        max_subject_length: config.max_subject_length,
        ..PromptStyle::default()
    };

    let mut regenerates = 0u32;
    let mut format_retry_used = false;
    let mut rejected: Vec<GenerationAttempt> = Vec::new();

    loop {
        transition(&mut state, State::Generating);

        // Fresh payload per attempt; regenerations carry a hint so the model
        // does not repeat the wording it already produced.
        let mut prompt = build_prompt(&diff, &style).text;
        if regenerates > 0 {
            prompt.push_str(&format!(
                "\n\nThe user rejected {regenerates} previous suggestion(s). Propose a different angle or wording."
            ));
        }

        let response = match generate_with_retry(
            generator,
            &prompt,
            &config.generation,
            config.max_attempts,
        )
        .await
        {
            Ok(response) => response,
            Err(e) => {
                transition(&mut state, State::Aborted);
                return Outcome::Aborted(AbortReason::GenerationFailed {
                    detail: e.to_string(),
                    attempts: rejected,
                });
            }
        };

        debug!(
            attempts = response.attempts,
            latency_ms = response.latency.as_millis() as u64,
            "model response received"
        );

        let message = match parse_message(&response.text, config.max_subject_length) {
            Ok(message) => message,
            Err(format_err) => {
                rejected.push(GenerationAttempt {
                    raw: response.text,
                    error: format_err.to_string(),
                });
                // One automatic regenerate per candidate, then surface
                if !format_retry_used {
                    format_retry_used = true;
                    continue;
                }
                transition(&mut state, State::Aborted);
                return Outcome::Aborted(AbortReason::GenerationFailed {
                    detail: format_err.to_string(),
                    attempts: rejected,
                });
            }
        };

        transition(&mut state, State::AwaitingReview);
        match reviewer.review(&message, &diff) {
            ReviewDecision::Accept => {
                if dry_run {
                    transition(&mut state, State::Done);
                    return Outcome::Previewed { message };
                }
                transition(&mut state, State::Committing);
                return match create_commit(&repo, &message.render()) {
                    Ok(oid) => {
                        transition(&mut state, State::Done);
                        Outcome::Done { oid, message }
                    }
                    Err(e) => {
                        transition(&mut state, State::Aborted);
                        Outcome::Aborted(AbortReason::CommitFailed {
                            rendered_message: message.render(),
                            detail: e.to_string(),
                        })
                    }
                };
            }
            ReviewDecision::Regenerate => {
                if regenerates >= config.max_regenerates {
                    transition(&mut state, State::Aborted);
                    return Outcome::Aborted(AbortReason::RegenerateLimitReached {
                        last_message: message,
                    });
                }
                regenerates += 1;
                format_retry_used = false;
            }
            ReviewDecision::Abort => {
                transition(&mut state, State::Aborted);
                return Outcome::Aborted(AbortReason::Cancelled);
            }
        }
    }
}
