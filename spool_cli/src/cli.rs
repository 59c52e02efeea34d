//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::OnceLock;

pub static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();
/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(name = "spool", version, about = "Filament spool monitor CLI")]
pub struct Cli {
    /// Path to config TOML (typed)
    #[arg(long, value_name = "FILE", default_value = "etc/spool_config.toml")]
    pub config: PathBuf,

    /// Print results and logs as JSON instead of text
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace); RUST_LOG takes precedence
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the monitor loop until Ctrl-C or the iteration cap
    Run {
        /// Stop after this many loop iterations
        #[arg(long, value_name = "N")]
        iterations: Option<u64>,
        /// Simulation: press the state button at these iteration indices
        #[arg(
            long,
            value_name = "I,..",
            value_delimiter = ',',
            long_help = "Simulation only. Hold the state-advance button high starting at each listed iteration index, long enough for the debouncer to accept it. The debouncer needs the button released for buttons.release_ms before each press, so a press listed too early or too close to the previous one starts at the first iteration where it can be accepted (a warning is logged)."
        )]
        press_at: Vec<u64>,
        /// Simulation: press the unit button at these iteration indices
        #[arg(long, value_name = "I,..", value_delimiter = ',')]
        toggle_at: Vec<u64>,
        /// Simulation: gross grams on the scale at startup (spool included)
        #[arg(long, value_name = "GRAMS", default_value_t = 1240.0)]
        initial_g: f32,
        /// Simulation: grams drawn off the spool per scale read
        #[arg(long, value_name = "GRAMS", default_value_t = 0.0)]
        draw_g: f32,
        /// Simulation: every N reads, add a tension spike of --spike-g
        #[arg(long, value_name = "N")]
        spike_every: Option<u32>,
        /// Simulation: spike size in grams
        #[arg(long, value_name = "GRAMS", default_value_t = 80.0)]
        spike_g: f32,
    },
    /// Print the filament profile and roll class for the given selector levels
    Profile {
        /// Material selector level (0 = PLA, 1 = ABS)
        #[arg(long, value_name = "0|1")]
        material: Option<u8>,
        /// Diameter selector level (0 = 1.75 mm, 1 = 3.00 mm)
        #[arg(long, value_name = "0|1")]
        diameter: Option<u8>,
        /// Roll weight selector level (0 = 1 kg, 1 = 2 kg)
        #[arg(long, value_name = "0|1")]
        roll_weight: Option<u8>,
    },
    /// Quick health check (hardware presence / sim ok)
    SelfCheck,
}
