//! Validation of raw model output against the conventional commit grammar.
//!
//! The parser never repairs output semantically: superficial wrappers
//! (markdown fences, surrounding quotes) are stripped before validation,
//! but anything that still violates the grammar is rejected with a
//! [`FormatError`] so the controller can decide to regenerate.

use regex_lite::Regex;

use crate::error::FormatError;
use crate::message::types::{CommitMessage, CommitType};

/// Header pattern: `type(scope)!: subject` with scope and `!` optional.
/// Scope allows empty parentheses so `EmptyScope` can be reported distinctly.
const HEADER_PATTERN: &str = r"^([A-Za-z]+)(?:\(([^)]*)\))?(!)?:\s*(.*)$";

/// Footer markers that flag a breaking change.
const BREAKING_MARKERS: [&str; 2] = ["BREAKING CHANGE:", "BREAKING-CHANGE:"];

/// Strip superficial wrapping the model tends to add around the message.
///
/// Handles a markdown fence (with optional language tag) around the whole
/// reply and matching surrounding backticks or quotes. This is normalization
/// of presentation only; the content is untouched.
pub fn strip_wrappers(raw: &str) -> String {
    let mut text = raw.trim().to_string();

    if text.starts_with("```") && text.ends_with("```") && text.len() >= 6 {
        let inner = &text[3..text.len() - 3];
        // Drop an opening-fence language tag ("```text\n...") but keep a
        // first line that is actual content ("```feat: x```").
        let inner = match inner.split_once('\n') {
            Some((tag, rest))
                if !tag.trim().is_empty() && !tag.contains(':') && !tag.trim().contains(' ') =>
            {
                rest
            }
            _ => inner,
        };
        text = inner.trim().to_string();
    }

    for quote in ['`', '"', '\''] {
        while text.len() >= 2 && text.starts_with(quote) && text.ends_with(quote) {
            text = text[1..text.len() - 1].trim().to_string();
        }
    }

    text
}

/// Parse raw model output into a [`CommitMessage`].
///
/// `max_subject_length` bounds the full first line (type, scope, and subject)
/// in characters.
pub fn parse_message(raw: &str, max_subject_length: usize) -> Result<CommitMessage, FormatError> {
    let text = strip_wrappers(raw);
    if text.is_empty() {
        return Err(FormatError::EmptyMessage);
    }

    let header_re = Regex::new(HEADER_PATTERN).expect("header pattern is valid");

    let mut paragraphs = split_paragraphs(&text);
    let header_para = paragraphs.remove(0);

    // The header must be a single line. Extra header-looking lines in the
    // first paragraph mean the model emitted several candidates at once;
    // anything else glued to the header is a body missing its blank line.
    // Neither is repaired.
    let header_lines: Vec<&str> = header_para.lines().collect();
    if header_lines.len() > 1 {
        let extra_header = header_lines[1..].iter().any(|line| {
            header_re
                .captures(line.trim())
                .is_some_and(|c| c[1].parse::<CommitType>().is_ok())
        });
        if extra_header {
            return Err(FormatError::MultipleHeaders);
        }
        return Err(FormatError::UnseparatedBody);
    }
    let header_line = header_lines[0].to_string();

    if !header_line.contains(':') {
        return Err(FormatError::MissingColon);
    }

    let caps = header_re
        .captures(header_line.trim())
        .ok_or(FormatError::MissingColon)?;

    let type_str = &caps[1];
    let commit_type: CommitType = type_str
        .parse()
        .map_err(|_| FormatError::UnknownType(type_str.to_string()))?;

    let scope = match caps.get(2) {
        Some(m) if m.as_str().trim().is_empty() => return Err(FormatError::EmptyScope),
        Some(m) => Some(m.as_str().to_string()),
        None => None,
    };
    let breaking = caps.get(3).is_some();

    let subject = caps[4].trim().to_string();
    if subject.is_empty() {
        return Err(FormatError::EmptySubject);
    }
    if let Some(repeated) = repeated_type_prefix(&subject) {
        return Err(FormatError::RepeatedTypePrefix(repeated));
    }

    let message = CommitMessage {
        commit_type,
        scope,
        breaking,
        subject,
        body: None,
        footer: None,
    };

    let header_len = message.header().chars().count();
    if header_len > max_subject_length {
        return Err(FormatError::SubjectTooLong {
            actual: header_len,
            limit: max_subject_length,
        });
    }

    // Remaining paragraphs split into body and footer; a paragraph opening
    // with a breaking-change marker belongs to the footer.
    let mut body_parts = Vec::new();
    let mut footer_parts = Vec::new();
    for para in paragraphs {
        if is_footer_paragraph(&para) {
            footer_parts.push(para);
        } else {
            body_parts.push(para);
        }
    }

    Ok(CommitMessage {
        body: join_nonempty(body_parts),
        footer: join_nonempty(footer_parts),
        ..message
    })
}

/// Split into blank-line separated paragraphs, dropping empty ones.
fn split_paragraphs(text: &str) -> Vec<String> {
    let mut paragraphs = Vec::new();
    let mut current = Vec::new();
    for line in text.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                paragraphs.push(current.join("\n"));
                current.clear();
            }
        } else {
            current.push(line.trim_end());
        }
    }
    if !current.is_empty() {
        paragraphs.push(current.join("\n"));
    }
    paragraphs
}

fn is_footer_paragraph(para: &str) -> bool {
    let first = para.lines().next().unwrap_or("");
    BREAKING_MARKERS.iter().any(|m| first.starts_with(m))
}

/// Detect a subject that itself begins with a `type:` prefix.
fn repeated_type_prefix(subject: &str) -> Option<String> {
    let (head, _) = subject.split_once(':')?;
    head.trim().parse::<CommitType>().ok().map(|t| t.as_str().to_string())
}

fn join_nonempty(parts: Vec<String>) -> Option<String> {
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("\n\n"))
    }
}
