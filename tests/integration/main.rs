//! Integration tests against real loopback TCP connections

mod cli_tests;
mod monitor_loop_tests;

use connpoll::Config;
use std::net::TcpListener;
use std::time::Duration;

/// A listener on an ephemeral loopback port and a config pointing at it
pub fn loopback(interval: Duration) -> (TcpListener, Config) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind loopback listener");
    let port = listener.local_addr().unwrap().port();
    let config = Config::new()
        .with_address("127.0.0.1")
        .with_port(port)
        .with_interval(interval);
    (listener, config)
}
