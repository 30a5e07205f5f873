//! Loop bookkeeping for the connection monitor
//!
//! `LoopState` holds the per-run counters that drive the tick schedule.
//! `MonitoringResult` is what a finished run reports back.

use serde::{Serialize, Serializer};
use std::fmt;
use std::time::Duration;

/// A probe goes out on the tick with this index
pub const PROBE_TICK: u8 = 2;

/// Mutable state of one monitoring run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoopState {
    tick: u8,
    abort: bool,
    /// Loop bodies entered so far
    pub iterations: u64,
    pub probes_sent: u64,
    pub bytes_sent: u64,
}

impl LoopState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Position in the 0,1,2 probe cycle
    pub fn tick(&self) -> u8 {
        self.tick
    }

    /// True on the tick that sends a probe
    pub fn probe_due(&self) -> bool {
        self.tick == PROBE_TICK
    }

    /// Move to the next tick. The tick after a probe is 0 again.
    // Wrapping keeps the cycle at 0,1,2 so a probe goes out every third loop
    // body, not every second one after the first reset.
    pub fn advance(&mut self) {
        self.tick = (self.tick + 1) % (PROBE_TICK + 1);
    }

    /// Once set, the abort flag stays set
    pub fn set_abort(&mut self) {
        self.abort = true;
    }

    pub fn aborted(&self) -> bool {
        self.abort
    }

    /// Count one successful send of `bytes` bytes
    pub fn record_probe(&mut self, bytes: usize) {
        self.probes_sent += 1;
        self.bytes_sent += bytes as u64;
    }
}

/// Why a monitoring run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitReason {
    /// Status check right after connecting already failed
    InitialCheckFailed,
    SocketError,
    HangUp,
    SendFailed,
    Interrupted,
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ExitReason::InitialCheckFailed => "initial status check failed",
            ExitReason::SocketError => "socket error",
            ExitReason::HangUp => "connection closed by peer",
            ExitReason::SendFailed => "probe send failed",
            ExitReason::Interrupted => "interrupted",
        };
        f.write_str(text)
    }
}

/// Result of a monitoring run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonitoringResult {
    pub reason: ExitReason,
    pub iterations: u64,
    pub probes_sent: u64,
    pub bytes_sent: u64,
    /// Time since the connection was established
    #[serde(rename = "elapsed_secs", serialize_with = "as_secs_f64")]
    pub elapsed: Duration,
}

impl MonitoringResult {
    pub fn from_state(state: &LoopState, reason: ExitReason, elapsed: Duration) -> Self {
        Self {
            reason,
            iterations: state.iterations,
            probes_sent: state.probes_sent,
            bytes_sent: state.bytes_sent,
            elapsed,
        }
    }
}

fn as_secs_f64<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(duration.as_secs_f64())
}
