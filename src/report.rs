//! Status events and where they go
//!
//! Everything the monitor has to say is a `MonitorEvent`. Sinks decide how it
//! is rendered: human-readable lines, JSON lines, or an in-memory log.

use crate::config::OutputFormat;
use crate::core::monitoring_utils::MonitoringResult;
use colored::*;
use log::warn;
use serde::Serialize;
use tabled::{Table, Tabled};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MonitorEvent {
    /// Resolved target and interval, before connecting
    Started {
        address: String,
        interval_secs: u64,
    },
    Connected {
        address: String,
        port: u16,
    },
    ConnectFailed {
        target: String,
        error: String,
        code: Option<i32>,
    },
    Elapsed {
        seconds: u64,
    },
    /// Raw poll return value, -1 when the call failed
    PollResult {
        ready: i32,
    },
    Interest {
        lines: Vec<String>,
    },
    Readable,
    Writable,
    PriorityData,
    OutOfBand,
    SocketError,
    ConnectionClosed,
    PollFailed {
        error: String,
        code: Option<i32>,
    },
    InitialCheckFailed,
    ProbeSent {
        bytes: usize,
    },
    ProbeFailed {
        error: String,
        code: Option<i32>,
    },
    Interrupted,
    Separator,
    Closing,
}

impl MonitorEvent {
    /// Error conditions go to stderr
    pub fn is_alert(&self) -> bool {
        matches!(
            self,
            MonitorEvent::ConnectFailed { .. }
                | MonitorEvent::SocketError
                | MonitorEvent::ConnectionClosed
                | MonitorEvent::PollFailed { .. }
                | MonitorEvent::InitialCheckFailed
                | MonitorEvent::ProbeFailed { .. }
        )
    }

    fn is_stamped(&self) -> bool {
        !matches!(
            self,
            MonitorEvent::Started { .. }
                | MonitorEvent::Elapsed { .. }
                | MonitorEvent::Interest { .. }
                | MonitorEvent::Separator
        )
    }

    pub fn message(&self) -> String {
        match self {
            MonitorEvent::Started {
                address,
                interval_secs,
            } => format!(
                "Using IP address: {}\nUsing time span: {} seconds",
                address, interval_secs
            ),
            MonitorEvent::Connected { address, port } => {
                format!("Successfully connected to {} on port {}", address, port)
            }
            MonitorEvent::ConnectFailed {
                target,
                error,
                ..
            } => format!("Failed to connect to {}: {}", target, error),
            MonitorEvent::Elapsed { seconds } => {
                format!("Elapsed time since connection: {} seconds", seconds)
            }
            MonitorEvent::PollResult { ready } => format!("poll result={}", ready),
            MonitorEvent::Interest { lines } => lines.join("\n"),
            MonitorEvent::Readable => "Socket is readable (normal data).".to_string(),
            MonitorEvent::Writable => "Socket is writable (normal data).".to_string(),
            MonitorEvent::PriorityData => {
                "Socket has high-priority data available to read.".to_string()
            }
            MonitorEvent::OutOfBand => "Socket can read out-of-band data.".to_string(),
            MonitorEvent::SocketError => "Socket error.".to_string(),
            MonitorEvent::ConnectionClosed => "Socket has been closed.".to_string(),
            MonitorEvent::PollFailed { error, .. } => format!("Poll failed: {}", error),
            MonitorEvent::InitialCheckFailed => "Socket status check failed.".to_string(),
            MonitorEvent::ProbeSent { bytes } => format!("Successfully sent {} bytes.", bytes),
            MonitorEvent::ProbeFailed { error, .. } => format!("Failed to send data: {}", error),
            MonitorEvent::Interrupted => "Received Ctrl-C, finishing...".to_string(),
            MonitorEvent::Separator => String::new(),
            MonitorEvent::Closing => "Closing socket and cleaning up.".to_string(),
        }
    }

    /// The line as printed in text mode
    pub fn render(&self, stamp: &str) -> String {
        if self.is_stamped() {
            format!("{}: {}", stamp, self.message())
        } else {
            self.message()
        }
    }
}

pub trait EventSink {
    fn emit(&mut self, stamp: &str, event: &MonitorEvent);
}

#[derive(Serialize)]
struct StampedEvent<'a> {
    time: &'a str,
    event: &'a MonitorEvent,
}

/// Prints events to stdout, alerts to stderr
pub struct ConsoleSink {
    format: OutputFormat,
}

impl ConsoleSink {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// The complete line for `event`, or `None` when this format prints nothing
    pub fn format_line(&self, stamp: &str, event: &MonitorEvent) -> Option<String> {
        match self.format {
            OutputFormat::Json => {
                if *event == MonitorEvent::Separator {
                    return None;
                }
                match serde_json::to_string(&StampedEvent { time: stamp, event }) {
                    Ok(json) => Some(json),
                    Err(err) => {
                        warn!("failed to serialize event {:?}: {}", event, err);
                        None
                    }
                }
            }
            OutputFormat::Text => {
                let line = event.render(stamp);
                let line = match event {
                    MonitorEvent::Separator => line,
                    // blank line before the first status output
                    MonitorEvent::Started { .. } => format!("{}\n", line),
                    e if e.is_alert() => line.red().to_string(),
                    MonitorEvent::Connected { .. } | MonitorEvent::ProbeSent { .. } => {
                        line.green().to_string()
                    }
                    MonitorEvent::Elapsed { .. } => line.cyan().to_string(),
                    MonitorEvent::Interest { .. } => line.bright_black().to_string(),
                    _ => line,
                };
                Some(line)
            }
        }
    }
}

impl EventSink for ConsoleSink {
    fn emit(&mut self, stamp: &str, event: &MonitorEvent) {
        match self.format_line(stamp, event) {
            Some(line) if event.is_alert() => eprintln!("{}", line),
            Some(line) => println!("{}", line),
            None => {}
        }
    }
}

/// Keeps every event, in order
#[derive(Debug, Default)]
pub struct MemorySink {
    pub events: Vec<(String, MonitorEvent)>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of recorded events matching `predicate`
    pub fn count(&self, predicate: impl Fn(&MonitorEvent) -> bool) -> usize {
        self.events.iter().filter(|(_, e)| predicate(e)).count()
    }

    /// Recorded events without their stamps
    pub fn kinds(&self) -> Vec<&MonitorEvent> {
        self.events.iter().map(|(_, e)| e).collect()
    }
}

impl EventSink for MemorySink {
    fn emit(&mut self, stamp: &str, event: &MonitorEvent) {
        self.events.push((stamp.to_string(), event.clone()));
    }
}

impl<S: EventSink + ?Sized> EventSink for &mut S {
    fn emit(&mut self, stamp: &str, event: &MonitorEvent) {
        (**self).emit(stamp, event)
    }
}

#[derive(Tabled)]
struct SummaryRow {
    #[tabled(rename = "Metric")]
    metric: &'static str,
    #[tabled(rename = "Value")]
    value: String,
}

/// End-of-run summary as a table, or a single JSON object
pub fn render_summary(result: &MonitoringResult, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => serde_json::to_string(result).unwrap_or_else(|err| {
            warn!("failed to serialize summary: {}", err);
            String::new()
        }),
        OutputFormat::Text => {
            let rows = vec![
                SummaryRow {
                    metric: "Exit reason",
                    value: result.reason.to_string(),
                },
                SummaryRow {
                    metric: "Iterations",
                    value: result.iterations.to_string(),
                },
                SummaryRow {
                    metric: "Probes sent",
                    value: result.probes_sent.to_string(),
                },
                SummaryRow {
                    metric: "Bytes sent",
                    value: result.bytes_sent.to_string(),
                },
                SummaryRow {
                    metric: "Elapsed",
                    value: format!("{:.1}s", result.elapsed.as_secs_f64()),
                },
            ];
            Table::new(rows).to_string()
        }
    }
}
