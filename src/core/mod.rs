//! Core connection monitoring functionality
//!
//! This module contains the ConnectionMonitor and the socket primitives it drives.

pub mod events;
pub mod monitor;
pub mod monitoring_utils;
pub mod transport;

#[cfg(test)]
pub(crate) mod testing;

// Re-export main types
pub use events::{PollEvents, PollInterest};
pub use monitor::{http_probe_request, ConnectionMonitor, StatusOutcome};
pub use monitoring_utils::{ExitReason, LoopState, MonitoringResult};
pub use transport::{establish, PollReport, TcpTransport, Transport};
