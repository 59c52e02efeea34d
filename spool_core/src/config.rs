//! Runtime configuration structs used by `Monitor`.
//!
//! Separate from the TOML-deserialized config in `spool_config`; see
//! `conversions` for the mapping.

use crate::render::DEFAULT_COLUMNS;

/// Display geometry and redraw policy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayCfg {
    /// Characters per row.
    pub columns: usize,
    /// Weight change (g) below which an unchanged state is not redrawn.
    pub resolution_g: f32,
}

impl Default for DisplayCfg {
    fn default() -> Self {
        Self {
            columns: DEFAULT_COLUMNS,
            resolution_g: 0.15,
        }
    }
}
