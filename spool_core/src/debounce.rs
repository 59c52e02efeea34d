//! Timestamp-based button debouncing.
//!
//! A press is reported once the input has been stable-low for the release
//! interval and then stable-high for the press interval. The caller polls
//! with the current level and time; nothing here sleeps.

use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebounceCfg {
    pub press: Duration,
    pub release: Duration,
}

impl Default for DebounceCfg {
    fn default() -> Self {
        Self {
            press: Duration::from_millis(50),
            release: Duration::from_millis(50),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Debouncer {
    cfg: DebounceCfg,
    level: bool,
    level_since: Instant,
    // true once a long-enough release has been seen; cleared when a press fires
    armed: bool,
}

impl Debouncer {
    pub fn new(cfg: DebounceCfg, now: Instant) -> Self {
        Self {
            cfg,
            level: false,
            level_since: now,
            armed: false,
        }
    }

    /// Feed the current raw level; returns true exactly once per accepted press.
    pub fn poll(&mut self, high: bool, now: Instant) -> bool {
        if high != self.level {
            self.level = high;
            self.level_since = now;
        }
        let held = now.saturating_duration_since(self.level_since);
        if self.level {
            if self.armed && held >= self.cfg.press {
                self.armed = false;
                return true;
            }
        } else if !self.armed && held >= self.cfg.release {
            self.armed = true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    struct Rig {
        t0: Instant,
        d: Debouncer,
    }

    impl Rig {
        fn new(press: u64, release: u64) -> Self {
            let t0 = Instant::now();
            let cfg = DebounceCfg {
                press: ms(press),
                release: ms(release),
            };
            Self {
                t0,
                d: Debouncer::new(cfg, t0),
            }
        }
        fn at(&mut self, t: u64, high: bool) -> bool {
            self.d.poll(high, self.t0 + ms(t))
        }
    }

    #[test]
    fn clean_press_fires_once() {
        let mut r = Rig::new(50, 50);
        assert!(!r.at(60, false)); // armed after release interval
        assert!(!r.at(70, true));
        assert!(!r.at(100, true));
        assert!(r.at(120, true));
        assert!(!r.at(200, true)); // still held: no repeat
        assert!(!r.at(300, true));
    }

    #[test]
    fn bounce_shorter_than_press_is_ignored() {
        let mut r = Rig::new(50, 50);
        r.at(60, false);
        assert!(!r.at(70, true));
        assert!(!r.at(80, false));
        assert!(!r.at(90, true));
        assert!(!r.at(110, false));
        assert!(!r.at(130, true));
        assert!(r.at(180, true));
    }

    #[test]
    fn second_press_needs_release_interval() {
        let mut r = Rig::new(20, 50);
        r.at(60, false);
        r.at(70, true);
        assert!(r.at(90, true));
        // Short release then press again: rejected
        r.at(100, false);
        r.at(120, true);
        assert!(!r.at(150, true));
        // Proper release re-arms
        r.at(200, false);
        assert!(!r.at(260, false));
        r.at(270, true);
        assert!(r.at(290, true));
    }

    #[test]
    fn button_held_at_startup_does_not_fire() {
        let mut r = Rig::new(10, 10);
        for t in (0..500).step_by(25) {
            assert!(!r.at(t, true));
        }
    }
}
