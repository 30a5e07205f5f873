//! Connection handle and the socket primitives the monitor drives

use crate::clock::Clock;
use crate::config::Config;
use crate::core::events::{PollEvents, PollInterest};
use crate::error::{ConnpollError, Result};
use crate::report::{EventSink, MonitorEvent};
use log::debug;
use std::io::{self, Write};
use std::net::{Shutdown, SocketAddr, TcpStream};
use std::time::Duration;

/// Outcome of one successful poll call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollReport {
    /// Number of descriptors with events, 0 on timeout
    pub ready: i32,
    pub events: PollEvents,
}

impl PollReport {
    /// Nothing became ready before the timeout
    pub fn timeout() -> Self {
        Self {
            ready: 0,
            events: PollEvents::default(),
        }
    }

    pub fn ready(events: PollEvents) -> Self {
        Self { ready: 1, events }
    }
}

/// The operations the monitor needs from its single connection
pub trait Transport {
    /// Wait up to `timeout` for any of `interest`, or for an error or hang-up
    fn poll(&mut self, interest: PollInterest, timeout: Duration) -> io::Result<PollReport>;

    /// One send call; returns how many bytes the kernel accepted
    fn send(&mut self, bytes: &[u8]) -> io::Result<usize>;

    /// Release the connection. Consumes the handle so it can only happen once.
    fn close(self) -> io::Result<()>
    where
        Self: Sized;
}

pub struct TcpTransport {
    stream: TcpStream,
    peer: SocketAddr,
}

impl TcpTransport {
    /// Wrap a connected stream, recording its peer address
    pub fn from_stream(stream: TcpStream) -> io::Result<Self> {
        let peer = stream.peer_addr()?;
        Ok(Self { stream, peer })
    }

    /// Address of the connected peer
    pub fn peer(&self) -> SocketAddr {
        self.peer
    }

    /// A readable socket whose next read yields nothing has seen the peer's FIN
    #[cfg(unix)]
    fn peer_closed(&self) -> bool {
        let mut buf = [0u8; 1];
        matches!(self.stream.peek(&mut buf), Ok(0))
    }
}

impl Transport for TcpTransport {
    #[cfg(unix)]
    fn poll(&mut self, interest: PollInterest, timeout: Duration) -> io::Result<PollReport> {
        use std::os::unix::io::AsRawFd;

        let timeout_ms = timeout.as_millis().min(i32::MAX as u128) as libc::c_int;
        let mut poll_fd = libc::pollfd {
            fd: self.stream.as_raw_fd(),
            events: interest.to_events(),
            revents: 0,
        };

        let ready = loop {
            // SAFETY: poll_fd lives on the stack for the whole call and the
            // count of 1 matches the single entry passed in.
            let rc = unsafe { libc::poll(&mut poll_fd, 1, timeout_ms) };
            if rc < 0 {
                let err = io::Error::last_os_error();
                if err.kind() == io::ErrorKind::Interrupted {
                    continue;
                }
                return Err(err);
            }
            break rc;
        };

        debug!(
            "poll on {} returned {} with revents {:#06x}",
            self.peer, ready, poll_fd.revents
        );

        let mut events = PollEvents::from_revents(poll_fd.revents);
        if events.readable && !events.hung_up && self.peer_closed() {
            debug!("zero-length peek on {}, peer has closed", self.peer);
            events.hung_up = true;
        }

        Ok(PollReport { ready, events })
    }

    #[cfg(not(unix))]
    fn poll(&mut self, _interest: PollInterest, _timeout: Duration) -> io::Result<PollReport> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "socket polling is only supported on unix platforms",
        ))
    }

    fn send(&mut self, bytes: &[u8]) -> io::Result<usize> {
        self.stream.write(bytes)
    }

    fn close(self) -> io::Result<()> {
        match self.stream.shutdown(Shutdown::Both) {
            Err(err) if err.kind() != io::ErrorKind::NotConnected => Err(err),
            _ => Ok(()),
        }
    }
}

/// Connect to the configured target with a blocking connect.
///
/// Emits a confirmation on success and a `ConnectFailed` alert on failure.
/// There is no retry.
pub fn establish<C, S>(config: &Config, clock: &C, sink: &mut S) -> Result<TcpTransport>
where
    C: Clock,
    S: EventSink,
{
    let target = config.target();
    debug!("connecting to {}", target);

    let connected = TcpStream::connect((config.address.as_str(), config.port))
        .and_then(TcpTransport::from_stream);

    match connected {
        Ok(transport) => {
            sink.emit(
                &clock.stamp(),
                &MonitorEvent::Connected {
                    address: config.address.clone(),
                    port: config.port,
                },
            );
            Ok(transport)
        }
        Err(source) => {
            sink.emit(
                &clock.stamp(),
                &MonitorEvent::ConnectFailed {
                    target: target.clone(),
                    error: source.to_string(),
                    code: source.raw_os_error(),
                },
            );
            Err(ConnpollError::Establishment { target, source })
        }
    }
}
