//! Bounded polling for a freshly spawned window.

use std::time::Duration;

use tracing::debug;

use crate::error::AdapterError;
use crate::ports::WindowManager;
use crate::sleeper::Sleeper;
use crate::window::WindowId;

pub const DEFAULT_WAIT_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSchedule {
    pub interval: Duration,
    pub timeout: Duration,
}

impl Default for PollSchedule {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            timeout: DEFAULT_WAIT_TIMEOUT,
        }
    }
}

impl PollSchedule {
    pub fn new(interval: Duration, timeout: Duration) -> Self {
        Self { interval, timeout }
    }

    /// Number of queries made before giving up. Always at least one.
    pub fn attempts(&self) -> u32 {
        if self.interval.is_zero() {
            return 1;
        }
        let attempts = self.timeout.as_micros().div_ceil(self.interval.as_micros());
        u32::try_from(attempts).unwrap_or(u32::MAX).max(1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    Found(WindowId),
    TimedOut,
}

impl WaitOutcome {
    pub fn window_id(&self) -> Option<WindowId> {
        match self {
            WaitOutcome::Found(id) => Some(*id),
            WaitOutcome::TimedOut => None,
        }
    }
}

/// Polls the window list until a window owned by `pid` shows up.
pub fn wait_for_window<W, S>(
    wm: &W,
    sleeper: &S,
    pid: u32,
    schedule: PollSchedule,
) -> Result<WaitOutcome, AdapterError>
where
    W: WindowManager + ?Sized,
    S: Sleeper + ?Sized,
{
    let attempts = schedule.attempts();
    for attempt in 0..attempts {
        if let Some(window) = wm.list_windows()?.into_iter().find(|w| w.pid == Some(pid)) {
            debug!(pid, window_id = window.id, attempt, "window appeared");
            return Ok(WaitOutcome::Found(window.id));
        }
        if attempt + 1 < attempts {
            sleeper.sleep(schedule.interval);
        }
    }
    Ok(WaitOutcome::TimedOut)
}
