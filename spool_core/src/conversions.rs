//! `From` implementations bridging `spool_config` types to `spool_core` types.

use std::time::Duration;

use crate::config::DisplayCfg;
use crate::debounce::DebounceCfg;
use crate::error::Result;
use crate::filter::MeasurementFilter;
use crate::profile::{RollTares, SelectorLevels};
use crate::runner::RunParams;

// ── Display ──────────────────────────────────────────────────────────────────

impl From<&spool_config::DisplayCfg> for DisplayCfg {
    fn from(c: &spool_config::DisplayCfg) -> Self {
        Self {
            columns: c.columns,
            resolution_g: c.resolution_g,
        }
    }
}

// ── Buttons ──────────────────────────────────────────────────────────────────

impl From<&spool_config::ButtonsCfg> for DebounceCfg {
    fn from(c: &spool_config::ButtonsCfg) -> Self {
        Self {
            press: Duration::from_millis(c.press_ms),
            release: Duration::from_millis(c.release_ms),
        }
    }
}

// ── Roll tares ───────────────────────────────────────────────────────────────

impl From<&spool_config::RollCfg> for RollTares {
    fn from(c: &spool_config::RollCfg) -> Self {
        Self {
            one_kg_g: c.tare_1kg_g,
            two_kg_g: c.tare_2kg_g,
        }
    }
}

// ── Filter ───────────────────────────────────────────────────────────────────

impl From<&spool_config::FilterCfg> for MeasurementFilter {
    fn from(c: &spool_config::FilterCfg) -> Self {
        MeasurementFilter::new(c.tension_threshold_g)
    }
}

// ── Runner ───────────────────────────────────────────────────────────────────

impl From<&spool_config::RunnerCfg> for RunParams {
    fn from(c: &spool_config::RunnerCfg) -> Self {
        Self {
            poll_ms: c.poll_ms,
            ..RunParams::default()
        }
    }
}

// ── Selectors ────────────────────────────────────────────────────────────────

impl TryFrom<&spool_config::Selectors> for SelectorLevels {
    type Error = eyre::Report;
    fn try_from(c: &spool_config::Selectors) -> Result<Self> {
        SelectorLevels::from_levels(c.material, c.diameter, c.roll_weight)
    }
}
