//! Human-readable error descriptions and structured JSON error formatting.

use spool_core::error::{BuildError, MonitorError};
use spool_hardware::error::HwError;

/// Exit code for configuration problems (bad TOML, out-of-range values).
pub const EXIT_CONFIG: i32 = 2;
/// Exit code for sensor, GPIO or display failures.
pub const EXIT_HARDWARE: i32 = 3;

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    // Typed matches first
    if let Some(be) = err.downcast_ref::<BuildError>() {
        return match be {
            BuildError::MissingScale => {
                "What happened: No scale was provided to the monitor.\nLikely causes: The load cell failed to initialize or was not wired into the builder.\nHow to fix: Ensure the HX711 scale is created successfully and passed via with_scale(...).".to_string()
            }
            BuildError::MissingDisplay => {
                "What happened: No display was provided to the monitor.\nLikely causes: The display backend failed to initialize.\nHow to fix: Pass a display via with_display(...).".to_string()
            }
            BuildError::MissingSelectors => {
                "What happened: The filament selector levels are unknown.\nLikely causes: Selector pins were not read and no [selectors] section is configured.\nHow to fix: Add a [selectors] section (material, diameter, roll_weight as 0/1) or enable the hardware backend.".to_string()
            }
            BuildError::InvalidConfig(msg) => format!(
                "What happened: Invalid configuration ({msg}).\nLikely causes: Out-of-range values in the TOML.\nHow to fix: Edit the config file, then rerun."
            ),
        };
    }

    if let Some(me) = err.downcast_ref::<MonitorError>() {
        return match me {
            MonitorError::Timeout => "What happened: Scale read timed out.\nLikely causes: HX711 not wired correctly, no power/ground, or timeout too low.\nHow to fix: Verify DT/SCK pins and power, and consider increasing scale.read_timeout_ms in the config.".to_string(),
            MonitorError::Config(msg) => format!(
                "What happened: Configuration is invalid ({msg}).\nLikely causes: Missing [pins], duplicate GPIO numbers, or out-of-range values.\nHow to fix: Edit the TOML config and try again."
            ),
            MonitorError::Display(msg) => format!(
                "What happened: Display write failed ({msg}).\nLikely causes: Display not connected or bus error.\nHow to fix: Check the display wiring and power."
            ),
            other => format!(
                "What happened: {other}.\nLikely causes: See logs.\nHow to fix: Re-run with --log-level=debug or set RUST_LOG for more detail."
            ),
        };
    }

    if let Some(hw) = err.downcast_ref::<HwError>() {
        return format!(
            "What happened: Hardware initialization failed ({hw}).\nLikely causes: Incorrect pin numbers or insufficient GPIO permissions.\nHow to fix: Fix the [pins] values in the config; ensure the process has permission to access GPIO."
        );
    }

    // Generic fallback
    let msg = err.to_string();
    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// Stable exit codes: configuration 2, hardware 3, anything else 1.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    if let Some(me) = err.downcast_ref::<MonitorError>() {
        return match me {
            MonitorError::Config(_) => EXIT_CONFIG,
            MonitorError::Hardware(_)
            | MonitorError::HardwareFault(_)
            | MonitorError::Timeout
            | MonitorError::Display(_) => EXIT_HARDWARE,
        };
    }
    if let Some(be) = err.downcast_ref::<BuildError>() {
        return match be {
            BuildError::InvalidConfig(_) | BuildError::MissingSelectors => EXIT_CONFIG,
            BuildError::MissingScale | BuildError::MissingDisplay => EXIT_HARDWARE,
        };
    }
    if err.downcast_ref::<HwError>().is_some() {
        return EXIT_HARDWARE;
    }
    1
}

fn reason_name(err: &eyre::Report) -> &'static str {
    if let Some(me) = err.downcast_ref::<MonitorError>() {
        return match me {
            MonitorError::Config(_) => "Config",
            MonitorError::Timeout => "Timeout",
            MonitorError::Display(_) => "Display",
            MonitorError::Hardware(_) | MonitorError::HardwareFault(_) => "Hardware",
        };
    }
    if err.downcast_ref::<BuildError>().is_some() {
        return "Build";
    }
    if err.downcast_ref::<HwError>().is_some() {
        return "Hardware";
    }
    "Error"
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    serde_json::json!({
        "reason": reason_name(err),
        "exit_code": exit_code_for_error(err),
        "message": humanize(err),
    })
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use eyre::WrapErr;
    use rstest::rstest;

    fn wrapped(e: impl std::error::Error + Send + Sync + 'static) -> eyre::Report {
        Err::<(), _>(eyre::Report::new(e))
            .wrap_err("outer context")
            .unwrap_err()
    }

    #[rstest]
    #[case(wrapped(MonitorError::Config("bad".into())), 2, "Config")]
    #[case(wrapped(MonitorError::Timeout), 3, "Timeout")]
    #[case(wrapped(MonitorError::HardwareFault("x".into())), 3, "Hardware")]
    #[case(wrapped(BuildError::InvalidConfig("columns")), 2, "Build")]
    #[case(wrapped(HwError::Gpio("busy".into())), 3, "Hardware")]
    #[case(eyre::eyre!("boom"), 1, "Error")]
    fn errors_map_to_stable_codes(
        #[case] err: eyre::Report,
        #[case] code: i32,
        #[case] reason: &str,
    ) {
        assert_eq!(exit_code_for_error(&err), code);
        let v: serde_json::Value = serde_json::from_str(&format_error_json(&err)).unwrap();
        assert_eq!(v["reason"], reason);
        assert_eq!(v["exit_code"], code);
        assert!(v["message"].as_str().unwrap().contains("How to fix"));
    }

    #[test]
    fn timeout_text_names_the_config_knob() {
        let msg = humanize(&wrapped(MonitorError::Timeout));
        assert!(msg.contains("scale.read_timeout_ms"));
    }
}
