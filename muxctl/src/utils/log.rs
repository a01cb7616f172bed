// SPDX-License-Identifier: MIT

//! Console logger behind the `log` facade.
//!
//! Every record is printed as `[muxctl] message`; warnings and errors go to
//! stderr. Records from the libraries (mux traces, mount debug lines) show up
//! at `--verbose`.

use std::sync::atomic::{AtomicU8, Ordering};

use colored::Colorize;
use log::{Level, LevelFilter, Log, Metadata, Record};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogLevel {
    Quiet,
    Normal,
    Verbose,
}

impl LogLevel {
    pub fn from_flags(quiet: bool, verbose: bool) -> Self {
        match (quiet, verbose) {
            (true, _) => LogLevel::Quiet,
            (false, true) => LogLevel::Verbose,
            (false, false) => LogLevel::Normal,
        }
    }

    fn filter(self) -> LevelFilter {
        match self {
            LogLevel::Quiet => LevelFilter::Warn,
            LogLevel::Normal => LevelFilter::Info,
            LogLevel::Verbose => LevelFilter::Trace,
        }
    }
}

static LOG_LEVEL: AtomicU8 = AtomicU8::new(LogLevel::Normal as u8);
static LOGGER: CliLogger = CliLogger;

pub fn set_log_level(level: LogLevel) {
    LOG_LEVEL.store(level as u8, Ordering::Relaxed);
    log::set_max_level(level.filter());
}

pub fn log_level() -> LogLevel {
    match LOG_LEVEL.load(Ordering::Relaxed) {
        0 => LogLevel::Quiet,
        2 => LogLevel::Verbose,
        _ => LogLevel::Normal,
    }
}

/// Installs the logger. A second call only changes the level.
pub fn init(level: LogLevel) {
    let _ = log::set_logger(&LOGGER);
    set_log_level(level);
}

struct CliLogger;

impl Log for CliLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= log_level().filter()
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let prefix = "[muxctl]".cyan();
        match record.level() {
            Level::Error => eprintln!("{prefix} {} {}", "error:".red().bold(), record.args()),
            Level::Warn => eprintln!("{prefix} {} {}", "warning:".yellow(), record.args()),
            Level::Info => println!("{prefix} {}", record.args()),
            Level::Debug | Level::Trace => {
                println!("{prefix} {}", format!("{}", record.args()).dimmed())
            }
        }
    }

    fn flush(&self) {}
}
