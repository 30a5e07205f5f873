use colored::*;
use env_logger::Builder;
use log::{Level, LevelFilter};
use std::io::Write;

/// Initialize the diagnostic logger from the verbose flag.
///
/// Filters come from the flag alone; the environment is not consulted.
pub fn init_logger(verbose: bool) {
    Builder::new()
        .format(|buf, record| {
            let level = match record.level() {
                Level::Error => "ERROR".red().bold(),
                Level::Warn => "WARN ".yellow().bold(),
                Level::Info => "INFO ".green(),
                Level::Debug => "DEBUG".cyan(),
                Level::Trace => "TRACE".dimmed(),
            };
            writeln!(buf, "{} {}", level, record.args())
        })
        .filter_level(level_filter(verbose))
        .init();
}

fn level_filter(verbose: bool) -> LevelFilter {
    if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    }
}
