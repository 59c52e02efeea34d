use std::thread;
use std::time::{Duration, Instant};

/// Monotonic time source for the polling loop and button debouncing.
///
/// - now(): returns a monotonic Instant
/// - sleep(): pauses the loop (implementations may simulate)
/// - since(): elapsed time from an earlier Instant, zero if it lies in the future
pub trait Clock {
    fn now(&self) -> Instant;
    fn sleep(&self, d: Duration);

    #[inline]
    fn since(&self, earlier: Instant) -> Duration {
        self.now().saturating_duration_since(earlier)
    }

    /// Milliseconds elapsed since `epoch`, saturating at 0 on underflow.
    fn ms_since(&self, epoch: Instant) -> u64 {
        let ms = self.since(epoch).as_millis();
        ms.min(u128::from(u64::MAX)) as u64
    }
}

/// Real-time clock backed by std::time::Instant.
#[derive(Debug, Default, Clone, Copy)]
pub struct MonotonicClock;

impl MonotonicClock {
    #[inline]
    pub fn new() -> Self {
        Self
    }
}

impl Clock for MonotonicClock {
    #[inline]
    fn now(&self) -> Instant {
        Instant::now()
    }

    #[inline]
    fn sleep(&self, d: Duration) {
        if d.is_zero() {
            return;
        }
        thread::sleep(d);
    }
}

impl<C: Clock + ?Sized> Clock for std::sync::Arc<C> {
    fn now(&self) -> Instant {
        (**self).now()
    }

    fn sleep(&self, d: Duration) {
        (**self).sleep(d);
    }
}
