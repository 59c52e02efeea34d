#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Core spool monitoring logic (hardware-agnostic).
//!
//! All hardware interactions go through the `spool_traits::Scale`,
//! `spool_traits::Display` and `spool_traits::InputPin` traits.
//!
//! ## Architecture
//!
//! - **Profile**: selector pins → filament constants and roll class (`profile`)
//! - **Filter**: extruder-tension spike rejection while printing (`filter`)
//! - **Session**: None/Ready/Load/Printing state machine (`session`)
//! - **Calculator**: remaining %, consumed grams/length (`calc`)
//! - **Render**: two display lines per state, clamping policy (`render`)
//! - **Monitor**: one loop iteration tying the above together (`monitor`)
//!
//! ## Units
//!
//! Readings are grams net of the spool tare. Lengths are centimetres except
//! the remaining length shown while printing, which is in metres.

pub mod builder;
pub mod calc;
pub mod config;
pub mod conversions;
pub mod debounce;
pub mod error;
pub mod filter;
pub mod hw_error;
pub mod monitor;
pub mod profile;
pub mod render;
pub mod runner;
pub mod session;
pub mod status;

pub use builder::{MonitorBuilder, Parts, SpoolMonitor, build_monitor};
pub use calc::{Calculator, Readout, consumed_grams};
pub use config::DisplayCfg;
pub use debounce::{DebounceCfg, Debouncer};
pub use error::{BuildError, MonitorError};
pub use filter::{DEFAULT_TENSION_THRESHOLD_G, Filtered, MeasurementFilter};
pub use monitor::Monitor;
pub use profile::{
    Diameter, FilamentProfile, Material, ProfileResolver, Resolved, RollClass, RollTares,
    RollWeight, SelectorLevels, resolve,
};
pub use render::{Lines, render};
pub use runner::{RunParams, run};
pub use session::{DisplayUnit, SessionMachine, SessionState, Status, Transition};
pub use status::{SessionSnapshot, StepReport};
