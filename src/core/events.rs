//! Poll interest and result flags

use serde::Serialize;

/// Conditions a status check asks the kernel about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PollInterest {
    pub read_normal: bool,
    pub write_normal: bool,
    pub priority: bool,
    pub read_band: bool,
}

impl PollInterest {
    /// The fixed interest set of every status check
    pub const STATUS: PollInterest = PollInterest {
        read_normal: true,
        write_normal: true,
        priority: true,
        read_band: true,
    };

    /// `events` bits for `pollfd`
    #[cfg(unix)]
    pub fn to_events(self) -> libc::c_short {
        let mut events = 0;
        if self.read_normal {
            events |= libc::POLLRDNORM;
        }
        if self.write_normal {
            events |= libc::POLLWRNORM;
        }
        if self.priority {
            events |= libc::POLLPRI;
        }
        if self.read_band {
            events |= libc::POLLRDBAND;
        }
        // Peer shutdown of its write side, reported as a hang-up
        #[cfg(any(target_os = "linux", target_os = "android"))]
        {
            events |= libc::POLLRDHUP;
        }
        events
    }

    /// One line per requested condition
    pub fn describe(self) -> Vec<&'static str> {
        let mut lines = Vec::new();
        if self.priority {
            lines.push("POLLPRI: Priority data may be read without blocking.");
        }
        if self.read_band {
            lines.push("POLLRDBAND: Priority band (out-of-band) data can be read without blocking.");
        }
        if self.read_normal {
            lines.push("POLLRDNORM: Normal data can be read without blocking.");
        }
        if self.write_normal {
            lines.push("POLLWRNORM: Normal data can be written without blocking.");
        }
        if lines.is_empty() {
            lines.push("UNKNOWN: No recognized events.");
        }
        lines
    }
}

/// Conditions reported by one poll call. Never carried over between calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct PollEvents {
    pub readable: bool,
    pub writable: bool,
    pub priority: bool,
    pub out_of_band: bool,
    pub error: bool,
    pub hung_up: bool,
    pub invalid: bool,
}

impl PollEvents {
    /// Decode the `revents` bits of a `pollfd`
    #[cfg(unix)]
    pub fn from_revents(revents: libc::c_short) -> Self {
        #[cfg(any(target_os = "linux", target_os = "android"))]
        let hung_up = revents & (libc::POLLHUP | libc::POLLRDHUP) != 0;
        #[cfg(not(any(target_os = "linux", target_os = "android")))]
        let hung_up = revents & libc::POLLHUP != 0;

        Self {
            readable: revents & libc::POLLRDNORM != 0,
            writable: revents & libc::POLLWRNORM != 0,
            priority: revents & libc::POLLPRI != 0,
            out_of_band: revents & libc::POLLRDBAND != 0,
            error: revents & libc::POLLERR != 0,
            hung_up,
            invalid: revents & libc::POLLNVAL != 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Socket error, including a descriptor the kernel rejected
    pub fn is_error(&self) -> bool {
        self.error || self.invalid
    }
}
