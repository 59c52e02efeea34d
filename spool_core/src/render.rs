//! Two-line text layout per session state.
//!
//! This is the only place numbers are formatted and the only place values
//! are clamped: remaining and consumed quantities below zero show as 0.

use crate::calc::Readout;
use crate::session::{DisplayUnit, Status};

pub const DEFAULT_COLUMNS: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Lines {
    pub top: String,
    pub bottom: String,
}

/// `x` if positive, else 0 (also maps NaN and -0.0 to 0).
#[inline]
pub fn non_negative(x: f32) -> f32 {
    if x > 0.0 { x } else { 0.0 }
}

fn fit(s: String, columns: usize) -> String {
    if s.chars().count() <= columns {
        s
    } else {
        s.chars().take(columns).collect()
    }
}

fn percent(p: f32) -> String {
    format!("{:.0}%", non_negative(p))
}

pub fn render(
    summary: &str,
    status: Status,
    unit: DisplayUnit,
    readout: &Readout,
    columns: usize,
) -> Lines {
    let (top, bottom) = match status {
        Status::None | Status::Ready => (summary.to_string(), status.label().to_string()),
        Status::Load => (
            summary.to_string(),
            format!("{} {}", status.label(), percent(readout.remaining_percent)),
        ),
        Status::Printing => {
            let consumed = match unit {
                DisplayUnit::Grams => readout.consumed_g,
                DisplayUnit::Centimeters => readout.consumed_cm,
            };
            (
                format!(
                    "{:.1}m {}",
                    non_negative(readout.remaining_m),
                    percent(readout.remaining_percent)
                ),
                format!(
                    "{} {:.0} {}",
                    status.label(),
                    non_negative(consumed),
                    unit.suffix()
                ),
            )
        }
    };
    Lines {
        top: fit(top, columns),
        bottom: fit(bottom, columns),
    }
}
