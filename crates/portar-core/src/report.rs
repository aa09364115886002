//! Aggregate reporting across the full example set.

use std::collections::BTreeSet;
use std::fs;

use crate::layout::Layout;
use crate::status::{classify, Classification, Status};

/// One classified example, ready for table display.
#[derive(Debug, Clone)]
pub struct ExampleRow {
    pub name: String,
    pub classification: Classification,
}

/// Counts and percentages over the full example set.
///
/// Recomputed from scratch on every call; nothing here is incrementally
/// maintained.
#[derive(Debug, Clone, Default)]
pub struct AggregateReport {
    /// Rows in display order (sorted by name).
    pub rows: Vec<ExampleRow>,
    pub done: usize,
    pub in_progress: usize,
    pub not_started: usize,
}

impl AggregateReport {
    /// Total number of examples.
    #[must_use]
    pub fn total(&self) -> usize {
        self.rows.len()
    }

    /// Fraction of fully verified examples, as a percentage. 0.0 for an
    /// empty set.
    #[must_use]
    pub fn done_pct(&self) -> f64 {
        percentage(self.done, self.total())
    }

    /// Fraction of examples at least started, as a percentage. 0.0 for an
    /// empty set.
    #[must_use]
    pub fn started_pct(&self) -> f64 {
        percentage(self.done + self.in_progress, self.total())
    }

    /// Count for one status.
    #[must_use]
    pub fn count(&self, status: Status) -> usize {
        match status {
            Status::Done => self.done,
            Status::InProgress => self.in_progress,
            Status::NotStarted => self.not_started,
        }
    }
}

fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64 * 100.0
    }
}

/// Enumerate the example set by scanning the reference directory.
///
/// Unique base names, sorted. An unreadable directory is an empty set, not
/// an error.
#[must_use]
pub fn all_examples(layout: &Layout) -> Vec<String> {
    let dir = layout.reference_dir();
    let Ok(entries) = fs::read_dir(&dir) else {
        tracing::debug!(dir = %dir.display(), "reference directory unreadable; empty example set");
        return Vec::new();
    };

    let mut names = BTreeSet::new();
    for entry in entries.filter_map(Result::ok) {
        let path = entry.path();
        let is_reference = path
            .extension()
            .and_then(std::ffi::OsStr::to_str)
            .is_some_and(|ext| ext == layout.reference_ext());
        if is_reference {
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                names.insert(stem.to_string());
            }
        }
    }
    names.into_iter().collect()
}

/// Classify every example and tally the counts.
#[must_use]
pub fn summarize(layout: &Layout) -> AggregateReport {
    let mut report = AggregateReport::default();
    for name in all_examples(layout) {
        let classification = classify(layout, &name);
        match classification.status {
            Status::Done => report.done += 1,
            Status::InProgress => report.in_progress += 1,
            Status::NotStarted => report.not_started += 1,
        }
        report.rows.push(ExampleRow {
            name,
            classification,
        });
    }
    report
}
