//! The accept / regenerate / abort review step.

use dialoguer::Select;
use dialoguer::theme::ColorfulTheme;

use crate::git::StagedDiff;
use crate::message::CommitMessage;

/// User verdict on a candidate message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewDecision {
    Accept,
    Regenerate,
    Abort,
}

/// Presents a candidate message and collects the verdict. Injected into the
/// pipeline so tests can script responses.
pub trait Reviewer {
    fn review(&mut self, message: &CommitMessage, diff: &StagedDiff) -> ReviewDecision;
}

/// Accepts every candidate without prompting (`--yes` / `--dry-run`).
pub struct AutoAcceptReviewer;

impl Reviewer for AutoAcceptReviewer {
    fn review(&mut self, _message: &CommitMessage, _diff: &StagedDiff) -> ReviewDecision {
        ReviewDecision::Accept
    }
}

/// Interactive terminal reviewer.
pub struct TermReviewer;

impl Reviewer for TermReviewer {
    fn review(&mut self, message: &CommitMessage, diff: &StagedDiff) -> ReviewDecision {
        println!(
            "\n{} file(s) changed, +{} -{}\n",
            diff.file_count(),
            diff.insertions,
            diff.deletions
        );
        println!("Proposed commit message:\n");
        for line in message.render().lines() {
            println!("    {line}");
        }
        println!();

        let choice = Select::with_theme(&ColorfulTheme::default())
            .with_prompt("Commit with this message?")
            .items(&["Commit", "Regenerate", "Abort"])
            .default(0)
            .interact();

        match choice {
            Ok(0) => ReviewDecision::Accept,
            Ok(1) => ReviewDecision::Regenerate,
            // Esc/q surfaces as an error from dialoguer; treat it as abort
            _ => ReviewDecision::Abort,
        }
    }
}
