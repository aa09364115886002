//! Terminal frontend for Portar.
//!
//! [`frame`] composes status tables as pure functions of an aggregate report
//! and a terminal area; [`monitor`] drives the interval/resize-triggered
//! redraw loop over crossterm.

pub mod frame;
pub mod monitor;

pub use frame::{compose, render_list, Area, MonitorFrame};
pub use monitor::{run, MonitorOptions};
