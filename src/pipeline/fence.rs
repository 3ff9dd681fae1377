//! Fenced code block tracking.
//!
//! A fence is a run of at least three backticks or tildes. It is closed only
//! by a bare run of the same character that is at least as long, so a
//! ` ```mermaid ` example inside a ` ````markdown ` listing stays part of the
//! listing. Backtick fences cannot carry a backtick in their info string.
//!
//! Leading indentation is accepted on both fence lines (fences nested in list
//! items are indented).

/// An open fence: its character and run length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Fence {
    ch: char,
    len: usize,
}

impl Fence {
    /// Parse a fence line into the fence and its (trimmed) info string.
    fn parse(line: &str) -> Option<(Fence, &str)> {
        let trimmed = line.trim_start();
        let ch = trimmed.chars().next().filter(|c| *c == '`' || *c == '~')?;
        let len = trimmed.len() - trimmed.trim_start_matches(ch).len();
        if len < 3 {
            return None;
        }
        let info = trimmed[len..].trim();
        if ch == '`' && info.contains('`') {
            return None;
        }
        Some((Fence { ch, len }, info))
    }
}

/// How a line relates to the fenced blocks around it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FenceLine<'a> {
    /// Ordinary text outside any fenced block.
    Text,
    /// Opens a block; carries the info string (language tag and attributes).
    Open { info: &'a str },
    /// Content of an open block, including fence-like lines that do not close it.
    Body,
    /// Closes the open block.
    Close,
}

/// Line-by-line fence state. Feed every line of a document in order.
#[derive(Debug, Default)]
pub(crate) struct FenceTracker {
    open: Option<Fence>,
}

impl FenceTracker {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Classify `line` (with or without its line terminator) and advance.
    pub(crate) fn classify<'a>(&mut self, line: &'a str) -> FenceLine<'a> {
        match (self.open, Fence::parse(line)) {
            (None, Some((fence, info))) => {
                self.open = Some(fence);
                FenceLine::Open { info }
            }
            (Some(open), Some((fence, ""))) if fence.ch == open.ch && fence.len >= open.len => {
                self.open = None;
                FenceLine::Close
            }
            (Some(_), _) => FenceLine::Body,
            (None, None) => FenceLine::Text,
        }
    }
}
