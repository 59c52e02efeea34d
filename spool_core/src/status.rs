//! Per-iteration report and session snapshot returned by the monitor loop.

use crate::calc::Readout;
use crate::render::Lines;
use crate::session::{DisplayUnit, Status, Transition};

/// What happened during one `Monitor::step`.
#[derive(Debug, Clone, PartialEq)]
pub struct StepReport {
    pub status: Status,
    /// Filtered reading, grams net of spool tare.
    pub reading_g: f32,
    /// The raw sample was discarded by the tension filter.
    pub rejected: bool,
    pub transition: Option<Transition>,
    pub unit_toggled: bool,
    /// The display was written this iteration.
    pub redrawn: bool,
}

/// Point-in-time view of the session, for logging and CLI output.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub status: Status,
    pub unit: DisplayUnit,
    pub initial_g: f32,
    pub readout: Readout,
    pub lines: Lines,
    pub iterations: u64,
}
