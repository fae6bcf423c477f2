//! Conventional commit message model, rendering, and validation.

pub mod parse;
pub mod types;

pub use parse::{parse_message, strip_wrappers};
pub use types::{CommitMessage, CommitType};
