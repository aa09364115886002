//! Status classification for ported examples.
//!
//! A classification is re-derived from the filesystem on every call — the
//! external pipeline produces artifacts at any time, and the monitor depends
//! on repeated queries picking them up immediately.

use std::fs;

use crate::layout::{ArtifactSet, Layout};

/// Keywords that mark a textual comparison result as a visual match.
///
/// Matched as whole word tokens, case-insensitively: `MISMATCH` must not
/// satisfy `MATCH`.
pub const MATCH_KEYWORDS: &[&str] = &["MATCH", "IDENTICAL", "SUCCESS"];

/// Lifecycle state of one example.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Status {
    NotStarted,
    InProgress,
    Done,
}

impl Status {
    /// All states, in the order the monitor groups them.
    #[must_use]
    pub fn all() -> &'static [Self] {
        &[Self::NotStarted, Self::InProgress, Self::Done]
    }

    /// Display label.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotStarted => "NOT_STARTED",
            Self::InProgress => "IN PROGRESS",
            Self::Done => "DONE",
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A Match/Mismatch/Unknown judgment about visual equivalence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Match,
    Mismatch,
    Unknown,
}

impl Verdict {
    /// Table mark for this verdict.
    #[must_use]
    pub fn mark(self) -> &'static str {
        match self {
            Self::Match => "✓",
            Self::Mismatch => "✗",
            Self::Unknown => "?",
        }
    }
}

/// The raw signals a classification was derived from, for table display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signals {
    /// Target implementation file exists.
    pub implementation: bool,
    /// Combined comparison screenshot exists.
    pub screenshot: bool,
    /// Verdict of the textual comparison result.
    pub text_verdict: Verdict,
    /// Relocated output document exists.
    pub output: bool,
}

/// Result of classifying one example.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub status: Status,
    pub message: String,
    pub signals: Signals,
}

/// Scan comparison-result text for a match keyword.
///
/// Tokenizes the uppercased content at non-alphanumeric boundaries, so a
/// reported `MISMATCH` does not count as `MATCH`.
#[must_use]
pub fn scan_result_text(content: &str) -> Verdict {
    let upper = content.to_uppercase();
    let matched = upper
        .split(|c: char| !c.is_ascii_alphanumeric())
        .any(|token| MATCH_KEYWORDS.contains(&token));
    if matched {
        Verdict::Match
    } else {
        Verdict::Mismatch
    }
}

/// Read and scan the textual comparison result of an artifact set.
///
/// Best-effort: a missing or unreadable file yields `Unknown`, never an
/// error.
#[must_use]
pub fn result_text_verdict(set: &ArtifactSet) -> Verdict {
    if !set.result_text.exists {
        return Verdict::Unknown;
    }
    match fs::read_to_string(&set.result_text.path) {
        Ok(content) => scan_result_text(&content),
        Err(err) => {
            tracing::debug!(
                path = %set.result_text.path.display(),
                error = %err,
                "comparison result unreadable; treating as unknown"
            );
            Verdict::Unknown
        }
    }
}

/// Classify one example from the current filesystem state.
///
/// Done requires the implementation file, the combined screenshot, a textual
/// result containing a match keyword, and the relocated output document.
/// An implementation file alone is InProgress; without it the example is
/// NotStarted no matter what else exists.
#[must_use]
pub fn classify(layout: &Layout, name: &str) -> Classification {
    classify_set(&layout.locate(name))
}

/// Classify an already-located artifact set.
#[must_use]
pub fn classify_set(set: &ArtifactSet) -> Classification {
    let text_verdict = result_text_verdict(set);
    let signals = Signals {
        implementation: set.implementation.exists,
        screenshot: set.screenshot.exists,
        text_verdict,
        output: set.output.exists,
    };

    let done = signals.implementation
        && signals.screenshot
        && signals.text_verdict == Verdict::Match
        && signals.output;

    let name = &set.name;
    let (status, message) = if done {
        (
            Status::Done,
            format!("example '{name}' is fully implemented and verified"),
        )
    } else if signals.implementation {
        (
            Status::InProgress,
            format!("example '{name}' is implemented but not fully verified"),
        )
    } else {
        (
            Status::NotStarted,
            format!("example '{name}' is not implemented"),
        )
    };

    Classification {
        status,
        message,
        signals,
    }
}
