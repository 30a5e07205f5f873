//! Full monitor runs against a loopback peer

use crate::loopback;
use connpoll::core::http_probe_request;
use connpoll::{ConnectionMonitor, ExitReason, MemorySink, MonitorEvent, SystemClock};
use std::io::Read;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

fn elapsed_lines(sink: &MemorySink) -> usize {
    sink.count(|e| matches!(e, MonitorEvent::Elapsed { .. }))
}

#[test]
fn test_idle_peer_closing_before_probe() {
    // ticks start at 0ms, 400ms and 800ms; the peer leaves at 600ms
    let (listener, config) = loopback(Duration::from_millis(400));
    let (tx, rx) = mpsc::channel();
    let peer = thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        thread::sleep(Duration::from_millis(600));
        stream
            .set_read_timeout(Some(Duration::from_millis(10)))
            .unwrap();
        let mut buf = [0u8; 64];
        let received = stream.read(&mut buf).unwrap_or(0);
        tx.send(received).unwrap();
    });

    let mut sink = MemorySink::new();
    let result = ConnectionMonitor::connect(config, SystemClock::new(), &mut sink)
        .unwrap()
        .run();
    peer.join().unwrap();

    assert_eq!(result.reason, ExitReason::HangUp);
    assert_eq!(result.probes_sent, 0);
    assert_eq!(rx.recv().unwrap(), 0, "peer should not have seen a probe");
    assert_eq!(elapsed_lines(&sink), 3);
    assert_eq!(sink.count(|e| *e == MonitorEvent::ConnectionClosed), 1);
    assert_eq!(sink.count(|e| *e == MonitorEvent::Closing), 1);
}

#[test]
fn test_probe_reaches_peer_on_third_tick() {
    let (listener, config) = loopback(Duration::from_millis(100));
    let (tx, rx) = mpsc::channel();
    let peer = thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 256];
        while !request.ends_with(b"\r\n\r\n") {
            match stream.read(&mut buf) {
                Ok(0) | Err(_) => break,
                Ok(n) => request.extend_from_slice(&buf[..n]),
            }
        }
        tx.send(String::from_utf8_lossy(&request).into_owned())
            .unwrap();
    });

    let mut sink = MemorySink::new();
    let result = ConnectionMonitor::connect(config, SystemClock::new(), &mut sink)
        .unwrap()
        .run();
    peer.join().unwrap();

    assert_eq!(rx.recv().unwrap(), http_probe_request("127.0.0.1"));
    assert_eq!(result.probes_sent, 1);
    assert_eq!(result.bytes_sent, http_probe_request("127.0.0.1").len() as u64);
    assert_eq!(result.reason, ExitReason::HangUp);

    // the probe went out on the third loop body
    let kinds = sink.kinds();
    let probe_at = kinds
        .iter()
        .position(|e| matches!(e, MonitorEvent::ProbeSent { .. }))
        .unwrap();
    let elapsed_before = kinds[..probe_at]
        .iter()
        .filter(|e| matches!(e, MonitorEvent::Elapsed { .. }))
        .count();
    assert_eq!(elapsed_before, 3);
}
