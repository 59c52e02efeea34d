//! Maps `Box<dyn Error>` from trait boundaries to typed `MonitorError`.
//!
//! The traits in `spool_traits` use `Box<dyn Error + Send + Sync>` so any
//! backend can plug in; this module converts those to our typed error enum,
//! with an optional feature-gated path for `spool_hardware::HwError`.

use crate::error::MonitorError;

/// Map a scale-side error to a typed `MonitorError`.
///
/// Attempts to downcast known hardware error types first, then falls back
/// to string-based heuristics.
pub fn map_hw_error(e: &(dyn std::error::Error + 'static)) -> MonitorError {
    #[cfg(feature = "hardware-errors")]
    {
        use spool_hardware::error::HwError;
        if let Some(hw) = e.downcast_ref::<HwError>() {
            return match hw {
                HwError::DataReadyTimeout => MonitorError::Timeout,
                HwError::Display(msg) => MonitorError::Display(msg.clone()),
                other => MonitorError::HardwareFault(other.to_string()),
            };
        }
    }

    let s = e.to_string();
    if s.to_lowercase().contains("timeout") {
        MonitorError::Timeout
    } else {
        MonitorError::Hardware(s)
    }
}

/// Map a display-side error; everything that is not a known hardware error
/// becomes `MonitorError::Display`.
pub fn map_display_error(e: &(dyn std::error::Error + 'static)) -> MonitorError {
    match map_hw_error(e) {
        MonitorError::Hardware(msg) => MonitorError::Display(msg),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_text_maps_to_timeout() {
        let e = std::io::Error::other("sensor Timeout on read");
        assert_eq!(map_hw_error(&e), MonitorError::Timeout);
    }

    #[test]
    fn unknown_text_maps_to_hardware() {
        let e = std::io::Error::other("bus glitch");
        assert_eq!(map_hw_error(&e), MonitorError::Hardware("bus glitch".into()));
        assert_eq!(
            map_display_error(&e),
            MonitorError::Display("bus glitch".into())
        );
    }

    #[cfg(feature = "hardware-errors")]
    #[test]
    fn typed_hw_errors_are_downcast() {
        use spool_hardware::error::HwError;
        assert_eq!(
            map_hw_error(&HwError::DataReadyTimeout),
            MonitorError::Timeout
        );
        assert_eq!(
            map_hw_error(&HwError::NoSamples),
            MonitorError::HardwareFault("scale returned no samples".into())
        );
    }

    #[cfg(feature = "hardware-errors")]
    #[test]
    fn every_hw_error_has_a_typed_mapping() {
        use spool_hardware::error::HwError;
        let all = [
            HwError::Gpio("pin busy".into()),
            HwError::DataReadyTimeout,
            HwError::NoSamples,
            HwError::Display("i2c nack".into()),
        ];
        for e in &all {
            let expected = match e {
                HwError::DataReadyTimeout => MonitorError::Timeout,
                HwError::Display(msg) => MonitorError::Display(msg.clone()),
                HwError::Gpio(_) | HwError::NoSamples => MonitorError::HardwareFault(e.to_string()),
            };
            assert_eq!(map_hw_error(e), expected);
        }
    }
}
