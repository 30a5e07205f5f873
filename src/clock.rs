//! Wall-clock access for the monitor
//!
//! The monitor never reads the system time directly, so tests can drive the
//! loop without real sleeps.

use chrono::Local;
use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Timestamp layout used on every status line, e.g. `10/14/2026 03:07:55 PM`
pub const TIMESTAMP_FORMAT: &str = "%m/%d/%Y %I:%M:%S %p";

pub trait Clock {
    /// Human-readable local time
    fn stamp(&self) -> String;

    /// Monotonic time since the clock was created
    fn monotonic(&self) -> Duration;

    /// Block the calling thread
    fn sleep(&mut self, duration: Duration);
}

pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn stamp(&self) -> String {
        Local::now().format(TIMESTAMP_FORMAT).to_string()
    }

    fn monotonic(&self) -> Duration {
        self.origin.elapsed()
    }

    fn sleep(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Clock whose time only moves when told to, or when it sleeps.
///
/// Clones share the same time, so a test can keep a handle while the
/// monitor owns another.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    inner: Rc<RefCell<ManualTime>>,
}

#[derive(Debug, Default)]
struct ManualTime {
    now: Duration,
    sleeps: Vec<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, duration: Duration) {
        self.inner.borrow_mut().now += duration;
    }

    /// Every sleep requested so far
    pub fn sleeps(&self) -> Vec<Duration> {
        self.inner.borrow().sleeps.clone()
    }
}

impl Clock for ManualClock {
    fn stamp(&self) -> String {
        format!("+{}s", self.inner.borrow().now.as_secs())
    }

    fn monotonic(&self) -> Duration {
        self.inner.borrow().now
    }

    fn sleep(&mut self, duration: Duration) {
        let mut time = self.inner.borrow_mut();
        time.sleeps.push(duration);
        time.now += duration;
    }
}
