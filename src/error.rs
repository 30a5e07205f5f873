//! Error types for connpoll
//!
//! Startup failures (initialization, establishment) end the process with a
//! non-zero exit code. Runtime failures are reported and turned into a
//! graceful shutdown by the monitor.

use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConnpollError {
    /// Process-level setup failed before any connection was attempted
    #[error("initialization failed: {0}")]
    Initialization(String),

    /// Resolving, allocating or connecting the socket failed
    #[error("failed to connect to {target}: {source}")]
    Establishment {
        target: String,
        #[source]
        source: io::Error,
    },

    /// The poll call itself returned an error status
    #[error("poll failed: {0}")]
    Poll(#[source] io::Error),

    /// Sending the probe request failed
    #[error("failed to send data: {0}")]
    Send(#[source] io::Error),

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}

impl ConnpollError {
    /// Raw OS error code behind the failure, when there is one
    pub fn os_code(&self) -> Option<i32> {
        match self {
            ConnpollError::Establishment { source, .. } => source.raw_os_error(),
            ConnpollError::Poll(err) | ConnpollError::Send(err) => err.raw_os_error(),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ConnpollError>;
