//! Commit type enumeration and the structured commit message.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Conventional commit types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommitType {
    Build,
    Ci,
    Chore,
    Docs,
    Feat,
    Fix,
    Perf,
    Refactor,
    Revert,
    Style,
    Test,
    Security,
}

impl CommitType {
    /// All accepted types, in the order they are listed in the prompt.
    pub const ALL: [CommitType; 12] = [
        CommitType::Build,
        CommitType::Ci,
        CommitType::Chore,
        CommitType::Docs,
        CommitType::Feat,
        CommitType::Fix,
        CommitType::Perf,
        CommitType::Refactor,
        CommitType::Revert,
        CommitType::Style,
        CommitType::Test,
        CommitType::Security,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CommitType::Build => "build",
            CommitType::Ci => "ci",
            CommitType::Chore => "chore",
            CommitType::Docs => "docs",
            CommitType::Feat => "feat",
            CommitType::Fix => "fix",
            CommitType::Perf => "perf",
            CommitType::Refactor => "refactor",
            CommitType::Revert => "revert",
            CommitType::Style => "style",
            CommitType::Test => "test",
            CommitType::Security => "security",
        }
    }

    /// Short semantics line used when enumerating types in the prompt.
    pub fn semantics(&self) -> &'static str {
        match self {
            CommitType::Build => "changes to the build system or external dependencies",
            CommitType::Ci => "changes to CI configuration or scripts",
            CommitType::Chore => "routine maintenance with no production code change",
            CommitType::Docs => "documentation-only changes",
            CommitType::Feat => "a new feature",
            CommitType::Fix => "a bug fix",
            CommitType::Perf => "a change that improves performance",
            CommitType::Refactor => "a code change that neither fixes a bug nor adds a feature",
            CommitType::Revert => "reverts a previous commit",
            CommitType::Style => "formatting changes that do not affect meaning",
            CommitType::Test => "adding or correcting tests",
            CommitType::Security => "a change that addresses a security concern",
        }
    }
}

impl FromStr for CommitType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "build" => Ok(Self::Build),
            "ci" => Ok(Self::Ci),
            "chore" => Ok(Self::Chore),
            "docs" => Ok(Self::Docs),
            "feat" => Ok(Self::Feat),
            "fix" => Ok(Self::Fix),
            "perf" => Ok(Self::Perf),
            "refactor" => Ok(Self::Refactor),
            "revert" => Ok(Self::Revert),
            "style" => Ok(Self::Style),
            "test" => Ok(Self::Test),
            "security" => Ok(Self::Security),
            _ => Err(format!("Unknown commit type: {}", s)),
        }
    }
}

impl fmt::Display for CommitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated conventional commit message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitMessage {
    pub commit_type: CommitType,
    pub scope: Option<String>,
    /// `!` breaking-change marker on the header line.
    pub breaking: bool,
    pub subject: String,
    pub body: Option<String>,
    pub footer: Option<String>,
}

impl CommitMessage {
    /// The `type[(scope)][!]: subject` first line.
    pub fn header(&self) -> String {
        let mut header = self.commit_type.as_str().to_string();
        if let Some(ref scope) = self.scope {
            header.push('(');
            header.push_str(scope);
            header.push(')');
        }
        if self.breaking {
            header.push('!');
        }
        header.push_str(": ");
        header.push_str(&self.subject);
        header
    }

    /// Render the full message in wire grammar: header, blank line, body,
    /// blank line, footer. Sections without content are omitted entirely.
    pub fn render(&self) -> String {
        let mut parts = vec![self.header()];

        if let Some(ref body) = self.body
            && !body.trim().is_empty()
        {
            parts.push(String::new());
            parts.push(body.trim().to_string());
        }

        if let Some(ref footer) = self.footer
            && !footer.trim().is_empty()
        {
            parts.push(String::new());
            parts.push(footer.trim().to_string());
        }

        parts.join("\n")
    }
}

impl fmt::Display for CommitMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_types_round_trip_as_str() {
        for ty in CommitType::ALL {
            assert_eq!(ty.as_str().parse::<CommitType>().unwrap(), ty);
        }
    }

    #[test]
    fn test_uppercase_type_is_rejected() {
        assert!("Feat".parse::<CommitType>().is_err());
        assert!("FIX".parse::<CommitType>().is_err());
    }

    #[test]
    fn test_header_with_scope_and_breaking() {
        let msg = CommitMessage {
            commit_type: CommitType::Feat,
            scope: Some("auth".into()),
            breaking: true,
            subject: "drop legacy token format".into(),
            body: None,
            footer: None,
        };
        assert_eq!(msg.header(), "feat(auth)!: drop legacy token format");
    }

    #[test]
    fn test_render_subject_only() {
        let msg = CommitMessage {
            commit_type: CommitType::Chore,
            scope: None,
            breaking: false,
            subject: "bump deps".into(),
            body: Some("   ".into()),
            footer: None,
        };
        // Whitespace-only body renders as subject only
        assert_eq!(msg.render(), "chore: bump deps");
    }

    #[test]
    fn test_render_full_message() {
        let msg = CommitMessage {
            commit_type: CommitType::Fix,
            scope: Some("parser".into()),
            breaking: false,
            subject: "handle empty input".into(),
            body: Some("The parser crashed on zero-length buffers.".into()),
            footer: Some("BREAKING CHANGE: empty input now returns an error".into()),
        };
        assert_eq!(
            msg.render(),
            "fix(parser): handle empty input\n\nThe parser crashed on zero-length buffers.\n\nBREAKING CHANGE: empty input now returns an error"
        );
    }
}
