//! The connection monitor
//!
//! Owns the single connection for its whole lifetime and runs the tick loop:
//! report elapsed time, check socket status, probe every third tick, sleep.

use crate::clock::Clock;
use crate::config::Config;
use crate::core::events::PollInterest;
use crate::core::monitoring_utils::{ExitReason, LoopState, MonitoringResult};
use crate::core::transport::{establish, PollReport, TcpTransport, Transport};
use crate::error::{ConnpollError, Result};
use crate::report::{EventSink, MonitorEvent};
use log::{debug, warn};
use std::error::Error as _;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Minimal GET that asks the server to close the connection afterwards
pub fn http_probe_request(host: &str) -> String {
    format!(
        "GET / HTTP/1.1\r\nHost: {}\r\nConnection: close\r\n\r\n",
        host
    )
}

fn not_connected() -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::NotConnected, "connection already closed")
}

/// Result of one status check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusOutcome {
    /// Poll completed without error or hang-up, including a timeout with nothing ready
    Success,
    /// The poll call itself failed; the connection state is unknown
    PollError,
    /// Error or hang-up reported on the socket. The abort flag is set.
    Failure(ExitReason),
}

impl StatusOutcome {
    /// True when the loop must stop
    pub fn is_failure(&self) -> bool {
        matches!(self, StatusOutcome::Failure(_))
    }
}

pub struct ConnectionMonitor<T: Transport, C: Clock, S: EventSink> {
    config: Config,
    transport: Option<T>,
    clock: C,
    sink: S,
    state: LoopState,
    connected_at: Duration,
    exit_reason: Option<ExitReason>,
    interrupt_signal: Option<Arc<AtomicBool>>,
}

impl<C: Clock, S: EventSink> ConnectionMonitor<TcpTransport, C, S> {
    /// Connect to the configured target and wrap the connection in a monitor
    pub fn connect(config: Config, clock: C, mut sink: S) -> Result<Self> {
        config.validate()?;
        let transport = establish(&config, &clock, &mut sink)?;
        Ok(Self::new(config, transport, clock, sink))
    }
}

impl<T: Transport, C: Clock, S: EventSink> ConnectionMonitor<T, C, S> {
    /// Take ownership of an established connection
    pub fn new(config: Config, transport: T, clock: C, sink: S) -> Self {
        let connected_at = clock.monotonic();
        Self {
            config,
            transport: Some(transport),
            clock,
            sink,
            state: LoopState::new(),
            connected_at,
            exit_reason: None,
            interrupt_signal: None,
        }
    }

    /// Stop at the next loop head once `signal` reads false
    pub fn with_interrupt_signal(mut self, signal: Arc<AtomicBool>) -> Self {
        self.interrupt_signal = Some(signal);
        self
    }

    /// Get the monitor configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get the loop counters and abort flag
    pub fn state(&self) -> &LoopState {
        &self.state
    }

    /// Get the clock driving timestamps and sleeps
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Check if the connection has not been closed yet
    pub fn is_open(&self) -> bool {
        self.transport.is_some()
    }

    /// Time since monitoring of the connection started
    pub fn elapsed(&self) -> Duration {
        self.clock.monotonic().saturating_sub(self.connected_at)
    }

    fn emit(&mut self, event: MonitorEvent) {
        let stamp = self.clock.stamp();
        self.sink.emit(&stamp, &event);
    }

    fn abort(&mut self, reason: ExitReason) {
        if !self.state.aborted() {
            debug!("aborting monitor loop: {}", reason);
            self.state.set_abort();
            self.exit_reason = Some(reason);
        }
    }

    fn interrupted(&self) -> bool {
        self.interrupt_signal
            .as_ref()
            .is_some_and(|signal| !signal.load(Ordering::SeqCst))
    }

    fn poll_once(&mut self, interest: PollInterest, timeout: Duration) -> Result<PollReport> {
        match self.transport.as_mut() {
            Some(transport) => transport.poll(interest, timeout).map_err(ConnpollError::Poll),
            None => Err(ConnpollError::Poll(not_connected())),
        }
    }

    /// Poll the connection once, waiting at most `timeout`.
    ///
    /// Every condition that holds is reported. An error or hang-up sets the
    /// abort flag and fails the check; nothing ready is a success.
    pub fn check_status(&mut self, timeout: Duration) -> StatusOutcome {
        let interest = PollInterest::STATUS;
        let polled = self.poll_once(interest, timeout);

        let ready = polled.as_ref().map(|report| report.ready).unwrap_or(-1);
        self.emit(MonitorEvent::PollResult { ready });
        self.emit(MonitorEvent::Interest {
            lines: interest.describe().into_iter().map(String::from).collect(),
        });

        let report = match polled {
            Ok(report) => report,
            Err(err) => {
                let error = err
                    .source()
                    .map(|source| source.to_string())
                    .unwrap_or_else(|| err.to_string());
                self.emit(MonitorEvent::PollFailed {
                    error,
                    code: err.os_code(),
                });
                return StatusOutcome::PollError;
            }
        };

        let events = report.events;
        if events.readable {
            self.emit(MonitorEvent::Readable);
        }
        if events.writable {
            self.emit(MonitorEvent::Writable);
        }
        if events.priority {
            self.emit(MonitorEvent::PriorityData);
        }
        if events.out_of_band {
            self.emit(MonitorEvent::OutOfBand);
        }
        if events.is_error() {
            self.emit(MonitorEvent::SocketError);
            self.abort(ExitReason::SocketError);
            return StatusOutcome::Failure(ExitReason::SocketError);
        }
        if events.hung_up {
            self.emit(MonitorEvent::ConnectionClosed);
            self.abort(ExitReason::HangUp);
            return StatusOutcome::Failure(ExitReason::HangUp);
        }

        StatusOutcome::Success
    }

    /// Send `request` with a single send call
    pub fn probe(&mut self, request: &str) -> Result<usize> {
        let sent = match self.transport.as_mut() {
            Some(transport) => transport.send(request.as_bytes()),
            None => Err(not_connected()),
        };

        match sent {
            Ok(bytes) => {
                self.state.record_probe(bytes);
                self.emit(MonitorEvent::ProbeSent { bytes });
                Ok(bytes)
            }
            Err(err) => {
                self.emit(MonitorEvent::ProbeFailed {
                    error: err.to_string(),
                    code: err.raw_os_error(),
                });
                Err(ConnpollError::Send(err))
            }
        }
    }

    /// Run until the connection fails or the run is interrupted, then close it.
    pub fn run(&mut self) -> MonitoringResult {
        let interval = self.config.interval;

        if self.check_status(interval).is_failure() {
            self.emit(MonitorEvent::InitialCheckFailed);
            self.exit_reason = Some(ExitReason::InitialCheckFailed);
        }
        self.connected_at = self.clock.monotonic();

        while !self.state.aborted() {
            if self.interrupted() {
                self.emit(MonitorEvent::Interrupted);
                self.abort(ExitReason::Interrupted);
                break;
            }

            self.state.iterations += 1;
            let seconds = self.elapsed().as_secs();
            self.emit(MonitorEvent::Elapsed { seconds });

            if self.check_status(interval).is_failure() {
                break;
            }

            if self.state.probe_due() {
                let request = http_probe_request(&self.config.address);
                if self.probe(&request).is_err() {
                    self.abort(ExitReason::SendFailed);
                    break;
                }
            }

            self.clock.sleep(interval);
            self.state.advance();
            self.emit(MonitorEvent::Separator);
        }

        self.close();

        let reason = self.exit_reason.unwrap_or(ExitReason::Interrupted);
        MonitoringResult::from_state(&self.state, reason, self.elapsed())
    }

    /// Release the connection. Later calls do nothing.
    pub fn close(&mut self) {
        if let Some(transport) = self.transport.take() {
            self.emit(MonitorEvent::Closing);
            if let Err(err) = transport.close() {
                warn!("error while closing connection: {}", err);
            }
        }
    }
}

impl<T: Transport, C: Clock, S: EventSink> Drop for ConnectionMonitor<T, C, S> {
    fn drop(&mut self) {
        self.close();
    }
}
