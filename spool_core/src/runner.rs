use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use spool_traits::{Clock, Display, Scale};

use crate::error::{MonitorError, Result};
use crate::monitor::Monitor;
use crate::status::SessionSnapshot;

/// Loop pacing and limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunParams {
    /// Loop period in milliseconds.
    pub poll_ms: u64,
    /// Stop after this many iterations; `None` runs until shutdown.
    pub max_iterations: Option<u64>,
    /// Consecutive scale timeouts tolerated before the loop gives up.
    pub max_consecutive_timeouts: u32,
}

impl Default for RunParams {
    fn default() -> Self {
        Self {
            poll_ms: 100,
            max_iterations: None,
            max_consecutive_timeouts: 5,
        }
    }
}

fn is_timeout(e: &eyre::Report) -> bool {
    matches!(e.downcast_ref::<MonitorError>(), Some(MonitorError::Timeout))
}

/// Drive `monitor.step()` at a fixed period until `shutdown` is set or the
/// iteration cap is reached. Returns the final session snapshot.
pub fn run<S: Scale, D: Display>(
    monitor: &mut Monitor<S, D>,
    params: RunParams,
    shutdown: &AtomicBool,
) -> Result<SessionSnapshot> {
    let clock = monitor.clock().clone();
    let period = Duration::from_millis(params.poll_ms.max(1));
    let mut timeouts = 0u32;
    let mut done = 0u64;
    tracing::info!(poll_ms = params.poll_ms, profile = %monitor.resolved().summary(), "monitor loop start");

    loop {
        if shutdown.load(Ordering::Relaxed) {
            tracing::info!("shutdown requested");
            break;
        }
        if params.max_iterations.is_some_and(|max| done >= max) {
            break;
        }

        let t0 = clock.now();
        match monitor.step() {
            Ok(report) => {
                timeouts = 0;
                if let Some(t) = report.transition {
                    tracing::info!(from = ?t.from, to = ?t.to, reading_g = report.reading_g, "state advanced");
                }
            }
            Err(e) if is_timeout(&e) && timeouts < params.max_consecutive_timeouts => {
                timeouts += 1;
                tracing::warn!(consecutive = timeouts, "scale read timed out; retrying next cycle");
            }
            Err(e) => {
                tracing::error!(error = %e, "monitor loop aborted");
                return Err(e);
            }
        }
        done = done.saturating_add(1);

        let spent = clock.since(t0);
        if let Some(rest) = period.checked_sub(spent) {
            clock.sleep(rest);
        }
    }

    let snap = monitor.snapshot();
    tracing::info!(
        status = ?snap.status,
        iterations = snap.iterations,
        consumed_g = snap.readout.consumed_g,
        "monitor loop stopped"
    );
    Ok(snap)
}
