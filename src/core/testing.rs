//! Scripted transport for driving the monitor loop in tests

use crate::clock::ManualClock;
use crate::core::events::{PollEvents, PollInterest};
use crate::core::transport::{PollReport, Transport};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::io;
use std::rc::Rc;
use std::time::Duration;

pub fn writable() -> PollReport {
    PollReport::ready(PollEvents {
        writable: true,
        ..Default::default()
    })
}

pub fn hang_up() -> PollReport {
    PollReport::ready(PollEvents {
        writable: true,
        hung_up: true,
        ..Default::default()
    })
}

/// What the monitor did with the transport
#[derive(Debug, Default)]
pub struct ScriptLog {
    pub polls: usize,
    pub poll_timeouts: Vec<Duration>,
    pub sent: Vec<String>,
    /// Poll count at the time of each send
    pub sent_at_poll: Vec<usize>,
    /// Consumed in order by `send`; an empty queue accepts the whole payload
    pub send_results: VecDeque<io::Result<usize>>,
    pub closes: usize,
}

pub struct ScriptedTransport {
    polls: VecDeque<io::Result<PollReport>>,
    log: Rc<RefCell<ScriptLog>>,
    poll_delay: Option<(ManualClock, Duration)>,
}

impl ScriptedTransport {
    /// Poll results are handed out in order; once exhausted every poll reports a hang-up
    pub fn new(polls: Vec<io::Result<PollReport>>) -> (Self, Rc<RefCell<ScriptLog>>) {
        let log = Rc::new(RefCell::new(ScriptLog::default()));
        let transport = Self {
            polls: polls.into(),
            log: Rc::clone(&log),
            poll_delay: None,
        };
        (transport, log)
    }

    /// Every poll moves `clock` forward by `delay`, as a blocking wait would
    pub fn with_poll_delay(mut self, clock: ManualClock, delay: Duration) -> Self {
        self.poll_delay = Some((clock, delay));
        self
    }
}

impl Transport for ScriptedTransport {
    fn poll(&mut self, _interest: PollInterest, timeout: Duration) -> io::Result<PollReport> {
        let mut log = self.log.borrow_mut();
        log.polls += 1;
        log.poll_timeouts.push(timeout);
        if let Some((clock, delay)) = &self.poll_delay {
            clock.advance(*delay);
        }
        self.polls.pop_front().unwrap_or_else(|| Ok(hang_up()))
    }

    fn send(&mut self, bytes: &[u8]) -> io::Result<usize> {
        let mut log = self.log.borrow_mut();
        let at = log.polls;
        let result = log.send_results.pop_front().unwrap_or(Ok(bytes.len()));
        if result.is_ok() {
            log.sent.push(String::from_utf8_lossy(bytes).into_owned());
            log.sent_at_poll.push(at);
        }
        result
    }

    fn close(self) -> io::Result<()> {
        self.log.borrow_mut().closes += 1;
        Ok(())
    }
}
