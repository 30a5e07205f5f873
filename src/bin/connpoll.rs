use clap::Parser;
use colored::*;
use connpoll::clock::{Clock, SystemClock};
use connpoll::config::Config;
use connpoll::logging::init_logger;
use connpoll::report::{render_summary, ConsoleSink, EventSink, MonitorEvent};
use connpoll::{ConnectionMonitor, ConnpollError, MonitoringResult, OutputFormat, Result};
use log::debug;
use std::process::exit;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// TCP connection liveness probe
///
/// Connects to ADDRESS on port 80, polls the socket every INTERVAL seconds
/// and sends an HTTP GET on every third tick.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Target IP address or host name (default: 192.168.2.1)
    address: Option<String>,

    /// Poll interval in whole seconds (default: 5)
    #[arg(allow_hyphen_values = true)]
    interval: Option<String>,

    /// Output events as JSON lines
    #[arg(short, long)]
    json: bool,

    /// Show debug diagnostics
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let args = Args::parse();

    let (config, warnings) = Config::from_args(args.address.as_deref(), args.interval.as_deref());
    for warning in &warnings {
        eprintln!("{}", warning.to_string().yellow());
    }

    let output = if args.json {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    };
    let config = config.with_output(output).with_verbose(args.verbose);
    init_logger(config.verbose);

    match run(config) {
        Ok(result) => {
            if output == OutputFormat::Text {
                println!();
            }
            println!("{}", render_summary(&result, output));
        }
        // Connection failures were already reported by the monitor
        Err(ConnpollError::Establishment { .. }) => exit(1),
        Err(err) => {
            eprintln!("{}: {}", SystemClock::new().stamp(), err.to_string().red());
            exit(1);
        }
    }
}

fn run(config: Config) -> Result<MonitoringResult> {
    // Setup signal handling for clean shutdown
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })
    .map_err(|err| ConnpollError::Initialization(format!("Ctrl-C handler: {}", err)))?;

    let clock = SystemClock::new();
    let mut sink = ConsoleSink::new(config.output);
    sink.emit(
        &clock.stamp(),
        &MonitorEvent::Started {
            address: config.address.clone(),
            interval_secs: config.interval.as_secs(),
        },
    );

    let mut monitor = ConnectionMonitor::connect(config, clock, sink)?
        .with_interrupt_signal(running);

    debug!("monitoring {}", monitor.config().target());
    Ok(monitor.run())
}
