//! connpoll: a long-running TCP connection liveness probe
//!
//! Opens one connection, polls it for readiness and error conditions on a
//! fixed cadence, and every third tick sends a minimal HTTP request to
//! exercise it end-to-end.

pub mod clock;
pub mod config;
pub mod core;
pub mod error;
pub mod logging;
pub mod report;

// Re-export the monitor and related types for use in tests and binaries
pub use crate::clock::{Clock, ManualClock, SystemClock};
pub use crate::config::{Config, ConfigWarning, OutputFormat};
pub use crate::core::{
    ConnectionMonitor, ExitReason, MonitoringResult, PollEvents, StatusOutcome, TcpTransport,
    Transport,
};
pub use crate::error::{ConnpollError, Result};
pub use crate::report::{ConsoleSink, EventSink, MemorySink, MonitorEvent};
