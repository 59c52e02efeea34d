//! Collaborator interfaces for the spool monitor.
//!
//! The monitoring core never talks to GPIO, the load cell or the LCD directly;
//! it goes through these traits so the same loop runs against simulated or
//! real hardware.
pub mod clock;

pub use clock::{Clock, MonotonicClock};

/// Weight sensor. Returns grams, already averaged over several conversions,
/// hardware-tared and calibration-scaled.
pub trait Scale {
    fn read_weight(&mut self) -> Result<f32, Box<dyn std::error::Error + Send + Sync>>;
}

/// Two-line character display.
pub trait Display {
    /// Overwrite both rows.
    fn show(
        &mut self,
        top: &str,
        bottom: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    /// Blank the screen and drop any buffered content.
    fn clear(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        Ok(())
    }
}

/// A single digital input (selector pin or momentary button), already
/// normalized so that `true` means "selected" / "pressed".
pub trait InputPin {
    fn is_high(&mut self) -> bool;
}

/// A single digital output, e.g. the LED lit while the scale is sampling.
pub trait OutputPin {
    fn set_high(&mut self);
    fn set_low(&mut self);
}

impl<P: InputPin + ?Sized> InputPin for Box<P> {
    fn is_high(&mut self) -> bool {
        (**self).is_high()
    }
}

impl<P: OutputPin + ?Sized> OutputPin for Box<P> {
    fn set_high(&mut self) {
        (**self).set_high()
    }

    fn set_low(&mut self) {
        (**self).set_low()
    }
}

impl<S: Scale + ?Sized> Scale for Box<S> {
    fn read_weight(&mut self) -> Result<f32, Box<dyn std::error::Error + Send + Sync>> {
        (**self).read_weight()
    }
}

impl<D: Display + ?Sized> Display for Box<D> {
    fn show(
        &mut self,
        top: &str,
        bottom: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        (**self).show(top, bottom)
    }

    fn clear(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        (**self).clear()
    }
}
