//! Monitor configuration
//!
//! The configuration is resolved once at startup from the positional
//! command-line values and never changes afterwards.

use crate::error::{ConnpollError, Result};
use std::time::Duration;

pub const DEFAULT_ADDRESS: &str = "192.168.2.1";
pub const DEFAULT_PORT: u16 = 80;
pub const DEFAULT_INTERVAL_SECS: u64 = 5;

/// How monitor events are rendered on the console
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Target address, an IP literal or a host name
    pub address: String,
    pub port: u16,
    /// Poll timeout and sleep between ticks
    pub interval: Duration,
    pub output: OutputFormat,
    /// Debug-level diagnostic logging
    pub verbose: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            address: DEFAULT_ADDRESS.to_string(),
            port: DEFAULT_PORT,
            interval: Duration::from_secs(DEFAULT_INTERVAL_SECS),
            output: OutputFormat::Text,
            verbose: false,
        }
    }
}

/// Problems found while resolving command-line values that did not stop startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigWarning {
    /// Interval was not a positive whole number of seconds
    InvalidInterval,
}

impl std::fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigWarning::InvalidInterval => {
                write!(f, "Invalid time span provided, using default.")
            }
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve the positional address and interval arguments.
    ///
    /// A missing value keeps its default. An interval that is not a positive
    /// whole number of seconds also keeps the default and yields a warning.
    pub fn from_args(address: Option<&str>, interval: Option<&str>) -> (Self, Vec<ConfigWarning>) {
        let mut config = Self::default();
        let mut warnings = Vec::new();

        if let Some(address) = address {
            config.address = address.to_string();
        }

        if let Some(raw) = interval {
            match parse_interval(raw) {
                Some(secs) => config.interval = Duration::from_secs(secs),
                None => warnings.push(ConfigWarning::InvalidInterval),
            }
        }

        (config, warnings)
    }

    /// Set the target address
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = address.into();
        self
    }

    /// Set the target port
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the poll timeout and sleep between ticks
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Set how events are rendered
    pub fn with_output(mut self, output: OutputFormat) -> Self {
        self.output = output;
        self
    }

    /// Enable debug diagnostics
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Check that the target and interval are usable
    pub fn validate(&self) -> Result<()> {
        if self.address.trim().is_empty() {
            return Err(ConnpollError::InvalidConfiguration(
                "address cannot be empty".to_string(),
            ));
        }
        if self.port == 0 {
            return Err(ConnpollError::InvalidConfiguration(
                "port must be positive".to_string(),
            ));
        }
        if self.interval.is_zero() {
            return Err(ConnpollError::InvalidConfiguration(
                "interval must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// `address:port` as shown in messages
    pub fn target(&self) -> String {
        format!("{}:{}", self.address, self.port)
    }
}

fn parse_interval(raw: &str) -> Option<u64> {
    match raw.trim().parse::<i64>() {
        Ok(secs) if secs > 0 => Some(secs as u64),
        _ => None,
    }
}
