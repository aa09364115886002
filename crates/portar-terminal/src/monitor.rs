//! Continuous monitor mode.
//!
//! One single-threaded loop consumes both wake sources — the refresh
//! interval and terminal resize notifications — so at most one redraw ever
//! runs at a time. Every redraw re-derives the aggregate report from the
//! filesystem and emits one whole frame through a single buffered write;
//! there is no partially updated shared state a resize could observe.

use std::io::{self, Write};
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::style::Print;
use crossterm::terminal::{self, Clear, ClearType};
use crossterm::{cursor, execute, queue};

use portar_core::{summarize, Layout};

use crate::frame::{compose, Area};

/// Monitor settings.
#[derive(Debug, Clone, Copy)]
pub struct MonitorOptions {
    /// Time between refreshes.
    pub interval: Duration,
}

impl Default for MonitorOptions {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
        }
    }
}

/// Run the monitor until the user quits (`q`, `Esc` or `Ctrl+C`).
///
/// Uses the alternate screen, so quitting restores the previous terminal
/// content; a termination notice is printed afterwards.
pub fn run(layout: &Layout, options: MonitorOptions) -> io::Result<()> {
    terminal::enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen, cursor::Hide)?;

    let result = run_loop(&mut stdout, layout, options.interval);

    execute!(stdout, cursor::Show, terminal::LeaveAlternateScreen)?;
    terminal::disable_raw_mode()?;
    println!("monitoring stopped");
    result
}

fn run_loop(stdout: &mut io::Stdout, layout: &Layout, interval: Duration) -> io::Result<()> {
    let mut next_refresh = Instant::now();
    loop {
        if Instant::now() >= next_refresh {
            redraw(stdout, layout)?;
            next_refresh = Instant::now() + interval;
        }

        let timeout = next_refresh.saturating_duration_since(Instant::now());
        if !event::poll(timeout)? {
            continue; // interval elapsed; next iteration redraws
        }
        match event::read()? {
            // A resize racing the timer still goes through the same
            // synchronous redraw path; the scheduled refresh stays put.
            Event::Resize(_, _) => redraw(stdout, layout)?,
            Event::Key(key) if key.kind == KeyEventKind::Press && is_quit(key) => {
                return Ok(());
            }
            _ => {}
        }
    }
}

/// Recompute state and emit one full frame atomically.
fn redraw(stdout: &mut io::Stdout, layout: &Layout) -> io::Result<()> {
    let report = summarize(layout);
    let area = current_area();
    let refreshed_at = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
    let frame = compose(&report, area, &refreshed_at);

    // Batch the whole frame, then write once.
    let mut out = Vec::with_capacity(8192);
    queue!(out, cursor::MoveTo(0, 0), Clear(ClearType::All))?;
    for line in frame.lines() {
        queue!(out, Print(line), cursor::MoveToNextLine(1))?;
    }
    stdout.write_all(&out)?;
    stdout.flush()
}

fn current_area() -> Area {
    terminal::size().map_or(Area::DEFAULT, |(width, height)| Area { width, height })
}

fn is_quit(key: KeyEvent) -> bool {
    matches!(key.code, KeyCode::Char('q' | 'Q') | KeyCode::Esc)
        || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
}
