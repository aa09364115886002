//! Frame composition for the status table.
//!
//! Composition is a pure function of (report, area, refresh timestamp) so a
//! redraw always operates on freshly computed state and two redraws with the
//! same inputs produce identical frames.

use portar_core::{AggregateReport, ExampleRow, Status};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Terminal area the frame must fit into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Area {
    pub width: u16,
    pub height: u16,
}

impl Area {
    /// Fallback when the terminal size is unavailable.
    pub const DEFAULT: Self = Self {
        width: 80,
        height: 24,
    };
}

impl Default for Area {
    fn default() -> Self {
        Self::DEFAULT
    }
}

// Lines the monitor frame spends outside the row budget: title, timestamp
// line, separator, column header, separator above the footer, totals,
// progress, plus one safety margin row against terminal scroll.
const HEADER_LINES: u16 = 4;
const FOOTER_LINES: u16 = 3;
const SAFETY_MARGIN: u16 = 1;

const STATUS_COL: usize = 12;
// status + three mark columns + separating spaces
const FIXED_COLS: usize = STATUS_COL + 1 + 4 + 5 + 6;

/// One fully composed monitor frame.
#[derive(Debug, Clone)]
pub struct MonitorFrame {
    lines: Vec<String>,
    /// Example rows that did not fit the height budget.
    pub hidden_rows: usize,
}

impl MonitorFrame {
    /// Frame content, line by line, without terminators.
    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Frame as one newline-joined string.
    #[must_use]
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }
}

/// Compose the bounded monitor frame.
///
/// Rows are grouped by status (not started, in progress, done); when the set
/// exceeds the height budget the tail is replaced by a `+ N more` line.
#[must_use]
pub fn compose(report: &AggregateReport, area: Area, refreshed_at: &str) -> MonitorFrame {
    let name_w = name_width(area);
    let rule_w = (area.width as usize).min(name_w + FIXED_COLS);
    let budget = area
        .height
        .saturating_sub(HEADER_LINES + FOOTER_LINES + SAFETY_MARGIN) as usize;

    let mut lines = vec![
        "portar monitor".to_string(),
        format!("Last update: {refreshed_at}   (q to quit)"),
        header_row(name_w),
        "─".repeat(rule_w),
    ];

    let grouped: Vec<&ExampleRow> = Status::all()
        .iter()
        .flat_map(|status| {
            report
                .rows
                .iter()
                .filter(move |row| row.classification.status == *status)
        })
        .collect();

    let shown = if grouped.len() > budget {
        budget.saturating_sub(1)
    } else {
        grouped.len()
    };
    for row in &grouped[..shown] {
        lines.push(format_row(row, name_w));
    }
    let hidden_rows = grouped.len() - shown;
    if hidden_rows > 0 {
        lines.push(format!("+ {hidden_rows} more"));
    }

    lines.push("─".repeat(rule_w));
    lines.push(format!(
        "Total: {} examples ({} done, {} in progress, {} not started)",
        report.total(),
        report.done,
        report.in_progress,
        report.not_started
    ));
    lines.push(progress_line(report));

    MonitorFrame { lines, hidden_rows }
}

/// Compose the full, unbounded list-mode table.
#[must_use]
pub fn render_list(report: &AggregateReport) -> String {
    let name_w = 30;
    let rule_w = name_w + FIXED_COLS;
    let mut out = String::new();
    out.push_str(&header_row(name_w));
    out.push('\n');
    out.push_str(&"─".repeat(rule_w));
    out.push('\n');
    for row in &report.rows {
        out.push_str(&format_row(row, name_w));
        out.push('\n');
    }
    out.push_str(&"─".repeat(rule_w));
    out.push('\n');
    if report.total() == 0 {
        out.push_str("no examples found\n");
        return out;
    }
    out.push_str(&format!(
        "Total: {} examples ({} done, {} in progress, {} not started)\n",
        report.total(),
        report.done,
        report.in_progress,
        report.not_started
    ));
    out.push_str(&progress_line(report));
    out.push('\n');
    out
}

fn progress_line(report: &AggregateReport) -> String {
    format!(
        "Progress: {:.1}% complete, {:.1}% in progress or complete",
        report.done_pct(),
        report.started_pct()
    )
}

fn header_row(name_w: usize) -> String {
    let status_w = STATUS_COL;
    format!(
        "{:<name_w$} {:<status_w$} {:^4} {:^5} {:^6}",
        "EXAMPLE", "STATUS", "TGT", "SCRN", "MATCH"
    )
}

fn format_row(row: &ExampleRow, name_w: usize) -> String {
    let signals = row.classification.signals;
    let implemented = if signals.implementation { "✓" } else { "✗" };
    let screenshot = if signals.screenshot { "✓" } else { "✗" };
    let status_w = STATUS_COL;
    format!(
        "{:<name_w$} {:<status_w$} {:^4} {:^5} {:^6}",
        fit(&row.name, name_w),
        row.classification.status.as_str(),
        implemented,
        screenshot,
        signals.text_verdict.mark()
    )
}

fn name_width(area: Area) -> usize {
    (area.width as usize).saturating_sub(FIXED_COLS).clamp(12, 40)
}

/// Truncate `s` to at most `max_w` display columns, with a `…` marker.
fn fit(s: &str, max_w: usize) -> String {
    if s.width() <= max_w {
        return s.to_string();
    }
    let mut out = String::new();
    let mut used = 0;
    for ch in s.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w > max_w.saturating_sub(1) {
            break;
        }
        used += w;
        out.push(ch);
    }
    out.push('…');
    out
}
