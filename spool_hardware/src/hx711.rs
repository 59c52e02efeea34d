use std::time::Duration;
use tracing::trace;

use crate::error::{HwError, Result};
use crate::util::{average_counts, wait_until_low_with_timeout};

/// Bit-banged HX711 load-cell ADC on two GPIO lines.
pub struct Hx711 {
    dt: rppal::gpio::InputPin,
    sck: rppal::gpio::OutputPin,
    gain_pulses: u8, // 25, 26, 27 based on gain/channel
}

impl Hx711 {
    pub fn new(
        dt_pin: rppal::gpio::InputPin,
        mut sck_pin: rppal::gpio::OutputPin,
        gain_pulses: u8,
    ) -> Result<Self> {
        sck_pin.set_low(); // clock idle low
        Ok(Self {
            dt: dt_pin,
            sck: sck_pin,
            gain_pulses,
        })
    }

    pub fn read_with_timeout(&mut self, timeout: Duration) -> Result<i32> {
        // Data ready when DT goes low
        let dt = &self.dt;
        wait_until_low_with_timeout(|| dt.is_high(), timeout, Duration::from_micros(200))?;

        let mut value: i32 = 0;
        for _ in 0..24 {
            self.sck.set_high();
            spin_delay_100ns();
            value = (value << 1) | i32::from(self.dt.is_high());
            self.sck.set_low();
            spin_delay_100ns();
        }

        // Remaining pulses select gain/channel for the next conversion
        for _ in 24..self.gain_pulses {
            self.sck.set_high();
            spin_delay_100ns();
            self.sck.set_low();
            spin_delay_100ns();
        }

        // Sign extend 24-bit
        if (value & 0x80_0000) != 0 {
            value |= !0xFF_FFFF;
        }
        trace!(raw = value, "hx711 raw read");
        Ok(value)
    }

    /// Average of `samples` consecutive conversions.
    pub fn read_average(&mut self, samples: usize, timeout: Duration) -> Result<f64> {
        let mut buf = Vec::with_capacity(samples);
        for _ in 0..samples {
            buf.push(self.read_with_timeout(timeout)?);
        }
        average_counts(&buf).ok_or(HwError::NoSamples)
    }
}

#[inline(always)]
fn spin_delay_100ns() {
    std::hint::spin_loop();
}
