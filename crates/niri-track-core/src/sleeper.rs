//! Sleeper trait for deterministic timing in tests.
//!
//! Production polling uses `RealSleeper`; tests swap in `MockSleeper`, which
//! records the requested durations without waiting.

use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;
use std::time::Duration;

pub trait Sleeper: Send + Sync {
    fn sleep(&self, duration: Duration);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RealSleeper;

impl Sleeper for RealSleeper {
    fn sleep(&self, duration: Duration) {
        thread::sleep(duration);
    }
}

/// Records sleep calls without sleeping.
#[derive(Debug, Default)]
pub struct MockSleeper {
    call_count: AtomicU64,
    durations: Mutex<Vec<Duration>>,
}

impl MockSleeper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn call_count(&self) -> u64 {
        self.call_count.load(Ordering::SeqCst)
    }

    pub fn total_duration(&self) -> Duration {
        self.durations().iter().sum()
    }

    pub fn durations(&self) -> Vec<Duration> {
        self.durations
            .lock()
            .map(|d| d.clone())
            .unwrap_or_default()
    }
}

impl Sleeper for MockSleeper {
    fn sleep(&self, duration: Duration) {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut durations) = self.durations.lock() {
            durations.push(duration);
        }
    }
}
