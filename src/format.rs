//! Line classification for advice text.
//!
//! Each input line becomes exactly one [`FormattedLine`], in order.

use serde::ser::{Serialize, SerializeStruct, Serializer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// `#`, `##` or `###` heading (level 1..=3).
    Heading(u8),
    /// Line starting with `- `.
    ListItem,
    /// Line wrapped in `**`.
    Emphasis,
    Blank,
    Paragraph,
}

impl LineKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Heading(_) => "heading",
            Self::ListItem => "list_item",
            Self::Emphasis => "emphasis",
            Self::Blank => "blank",
            Self::Paragraph => "paragraph",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormattedLine {
    pub kind: LineKind,
    /// Line content with its marker removed.
    pub text: String,
}

/// Serialized as `{"kind": .., "level": .., "text": ..}`; `level` only for headings.
impl Serialize for FormattedLine {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let level = match self.kind {
            LineKind::Heading(level) => Some(level),
            _ => None,
        };
        let mut state =
            serializer.serialize_struct("FormattedLine", 2 + usize::from(level.is_some()))?;
        state.serialize_field("kind", self.kind.name())?;
        if let Some(level) = level {
            state.serialize_field("level", &level)?;
        }
        state.serialize_field("text", &self.text)?;
        state.end()
    }
}

/// Classify a single line.
pub fn classify_line(line: &str) -> FormattedLine {
    let trimmed = line.trim_end();

    if trimmed.trim_start().is_empty() {
        return FormattedLine {
            kind: LineKind::Blank,
            text: String::new(),
        };
    }

    // Longest marker first so "### x" is not read as level 1.
    for (level, marker) in [(3u8, "### "), (2, "## "), (1, "# ")] {
        if let Some(rest) = trimmed.strip_prefix(marker) {
            return FormattedLine {
                kind: LineKind::Heading(level),
                text: rest.trim().to_string(),
            };
        }
    }

    if let Some(rest) = trimmed.strip_prefix("- ") {
        return FormattedLine {
            kind: LineKind::ListItem,
            text: rest.trim().to_string(),
        };
    }

    if trimmed.len() > 4 && trimmed.starts_with("**") && trimmed.ends_with("**") {
        return FormattedLine {
            kind: LineKind::Emphasis,
            text: trimmed[2..trimmed.len() - 2].trim().to_string(),
        };
    }

    FormattedLine {
        kind: LineKind::Paragraph,
        text: trimmed.to_string(),
    }
}

/// Classify every `\n`-separated segment of `text`, including a trailing
/// empty one. A `\r` before the break is dropped.
pub fn format_answer(text: &str) -> Vec<FormattedLine> {
    text.split('\n')
        .map(|line| classify_line(line.strip_suffix('\r').unwrap_or(line)))
        .collect()
}
