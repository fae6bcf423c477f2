//! Prompt construction for commit message generation.
//!
//! Pure and deterministic: the same staged diff and style always render the
//! same payload. Overlong diffs are trimmed hunk by hunk, keeping file
//! boundaries intact and dropping whitespace-only hunks before structural
//! ones.

use crate::git::StagedDiff;
use crate::message::CommitType;

/// Style constraints embedded in the instruction text.
#[derive(Debug, Clone)]
pub struct PromptStyle {
    /// Maximum characters for the whole first line.
    pub max_subject_length: usize,
    /// Column at which body lines should wrap.
    pub body_wrap: usize,
    /// Maximum characters of diff text included in the payload.
    pub max_diff_chars: usize,
}

impl Default for PromptStyle {
    fn default() -> Self {
        Self {
            max_subject_length: 50,
            body_wrap: 72,
            max_diff_chars: 30_000,
        }
    }
}

/// The fully rendered instruction text for one generation attempt.
#[derive(Debug, Clone)]
pub struct PromptPayload {
    pub text: String,
    pub diff_truncated: bool,
}

/// Build the generation prompt from the staged diff and style constraints.
pub fn build_prompt(diff: &StagedDiff, style: &PromptStyle) -> PromptPayload {
    let files_section: String = diff
        .files
        .iter()
        .map(|f| match &f.old_path {
            Some(old) => format!("- {} ({}, was {})", f.path, f.status, old),
            None => format!("- {} ({})", f.path, f.status),
        })
        .collect::<Vec<_>>()
        .join("\n");

    let types_section: String = CommitType::ALL
        .iter()
        .map(|ty| format!("- {}: {}", ty, ty.semantics()))
        .collect::<Vec<_>>()
        .join("\n");

    let (diff_text, truncated) = truncate_diff(&diff.text, style.max_diff_chars);

    let truncation_note = if truncated {
        "\n\nNote: the diff was trimmed to fit the input limit. Describe the visible changes."
    } else {
        ""
    };

    let text = format!(
        r#"You are generating a Git commit message for the staged changes below, following the Conventional Commits convention.

## Staged Files ({insertions} insertions, {deletions} deletions)
{files_section}

## Diff
```diff
{diff_text}
```{truncation_note}

## Allowed Types
{types_section}

## Subject Line Rules (STRICT)
- Format: `type(scope): description` (scope optional)
- Append `!` to the type for a breaking change, e.g. `type!: description`
- Imperative mood ("add", not "added"), lowercase after the colon, no trailing period
- HARD LIMIT: the entire first line, including type and scope, must be at most {max_subject} characters

## Body Rules
- Separate from the subject with one blank line
- Explain what changed and why, not how; wrap lines at {body_wrap} characters
- Reference ticket or issue numbers when they are identifiable from the diff
- Omit the body entirely for trivial changes
- A `BREAKING CHANGE: description` paragraph at the end describes any incompatible change

## Output
Return ONLY the commit message itself. No surrounding quotes, no code fences, no commentary."#,
        insertions = diff.insertions,
        deletions = diff.deletions,
        max_subject = style.max_subject_length,
        body_wrap = style.body_wrap,
    );

    PromptPayload {
        text,
        diff_truncated: truncated,
    }
}

/// One `diff --git` section: its header lines plus parsed hunks.
struct FileSection<'a> {
    header: Vec<&'a str>,
    hunks: Vec<Hunk<'a>>,
}

struct Hunk<'a> {
    lines: Vec<&'a str>,
    /// Hunks whose every changed line is blank or whitespace-only carry the
    /// least signal and are dropped first.
    low_signal: bool,
    chars: usize,
}

/// Trim a unified diff to at most `max_chars` characters.
///
/// File-change boundaries stay intact: headers are always kept, and hunks are
/// removed whole. Whitespace-only hunks go first, then structural hunks from
/// the end of the diff. Returns the trimmed text and whether trimming
/// happened.
pub fn truncate_diff(text: &str, max_chars: usize) -> (String, bool) {
    if text.len() <= max_chars {
        return (text.to_string(), false);
    }

    let mut sections = parse_sections(text);

    let mut current: usize = sections
        .iter()
        .map(|s| {
            s.header.iter().map(|l| l.len() + 1).sum::<usize>()
                + s.hunks.iter().map(|h| h.chars).sum::<usize>()
        })
        .sum();

    // Pass 1: drop whitespace-only hunks, largest first
    let mut low: Vec<(usize, usize)> = Vec::new();
    for (si, s) in sections.iter().enumerate() {
        for (hi, h) in s.hunks.iter().enumerate() {
            if h.low_signal {
                low.push((si, hi));
            }
        }
    }
    low.sort_by_key(|&(si, hi)| std::cmp::Reverse(sections[si].hunks[hi].chars));
    for (si, hi) in low {
        if current <= max_chars {
            break;
        }
        current -= sections[si].hunks[hi].chars;
        sections[si].hunks[hi].lines.clear();
        sections[si].hunks[hi].chars = 0;
    }

    // Pass 2: drop structural hunks from the end of the diff
    if current > max_chars {
        'outer: for si in (0..sections.len()).rev() {
            for hi in (0..sections[si].hunks.len()).rev() {
                if sections[si].hunks[hi].chars == 0 {
                    continue;
                }
                current -= sections[si].hunks[hi].chars;
                sections[si].hunks[hi].lines.clear();
                sections[si].hunks[hi].chars = 0;
                if current <= max_chars {
                    break 'outer;
                }
            }
        }
    }

    let mut out = String::new();
    for s in &sections {
        for line in &s.header {
            out.push_str(line);
            out.push('\n');
        }
        for h in &s.hunks {
            for line in &h.lines {
                out.push_str(line);
                out.push('\n');
            }
        }
    }

    // Headers alone can still exceed the cap on pathological diffs
    if out.len() > max_chars {
        let mut end = max_chars;
        while end > 0 && !out.is_char_boundary(end) {
            end -= 1;
        }
        out.truncate(end);
    }

    (out, true)
}

fn parse_sections(text: &str) -> Vec<FileSection<'_>> {
    let mut sections: Vec<FileSection> = Vec::new();

    for line in text.lines() {
        if line.starts_with("diff --git") || sections.is_empty() {
            sections.push(FileSection {
                header: Vec::new(),
                hunks: Vec::new(),
            });
        }
        let section = sections.last_mut().expect("section pushed above");

        if line.starts_with("@@") {
            section.hunks.push(Hunk {
                lines: Vec::new(),
                low_signal: true,
                chars: 0,
            });
        }

        match section.hunks.last_mut() {
            Some(hunk) => {
                hunk.chars += line.len() + 1;
                if (line.starts_with('+') || line.starts_with('-'))
                    && !line[1..].trim().is_empty()
                {
                    hunk.low_signal = false;
                }
                hunk.lines.push(line);
            }
            None => section.header.push(line),
        }
    }

    sections
}
