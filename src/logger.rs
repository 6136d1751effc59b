//! Logging backend that writes to the console UART.

use crate::platform::CONSOLE_BASE;
use crate::serial::MMIO;
use am33xx_uart::mmio::Registers;
use am33xx_uart::transfer::EarlyConsole;
use core::fmt::Write;
use core::sync::atomic::{AtomicBool, Ordering};
use log::Level;
use spin::Mutex;

static CONSOLE: Mutex<EarlyConsole<'static>> =
    Mutex::new(EarlyConsole::new(Registers::new(&MMIO, CONSOLE_BASE)));
static LOGGER: Logger = Logger;
static INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Initializes the logger.
///
/// Trace records are filtered out: the interrupt path logs at that level and must never contend
/// for the console lock.
///
/// # Panics
///
/// Panics if called more than once.
pub fn init() {
    assert!(
        !INITIALIZED.swap(true, Ordering::Relaxed),
        "logger already initialized"
    );
    log::set_logger(&LOGGER).unwrap();
    log::set_max_level(log::LevelFilter::Debug);
}

// ————————————————————————————————— Logger ————————————————————————————————— //

pub struct Logger;

impl log::Log for Logger {
    fn enabled(&self, _metadata: &log::Metadata) -> bool {
        true
    }

    fn log(&self, record: &log::Record) {
        if self.enabled(record.metadata()) {
            let mut console = CONSOLE.lock();
            let _ = write!(
                console,
                "[{}] {}\r\n",
                level_display(record.level()),
                record.args()
            );
        }
    }

    fn flush(&self) {}
}

fn level_display(level: Level) -> &'static str {
    // We log with colors, using ANSI escape sequences
    match level {
        Level::Error => "\x1b[31;1mError\x1b[0m",
        Level::Warn => "\x1b[33;1mWarn\x1b[0m ",
        Level::Info => "\x1b[32;1mInfo\x1b[0m ",
        Level::Debug => "\x1b[34;1mDebug\x1b[0m",
        Level::Trace => "\x1b[35;1mTrace\x1b[0m",
    }
}
