//! A `log` backend that prints records to the console with color coding.
//!
//! Each record becomes one line `[SBI][LEVEL] message`, colored by severity.
//! Records emitted by the lock implementation itself are dropped here: the
//! console is guarded by a ticket lock, and printing from inside that lock's
//! slow path would queue the hart behind its own ticket.

use log::{self, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};

use crate::color_println;
use crate::config::{LOG_LEVEL, SPIN_TARGET};

use super::console::Color;

/// Installs the console logger with the build-time level from `LOG`.
///
/// Should be called once, early during boot, after a console is registered.
pub fn init() -> Result<(), SetLoggerError> {
    init_with_level(LOG_LEVEL)
}

/// Installs the console logger with an explicit maximum level.
pub fn init_with_level(level: LevelFilter) -> Result<(), SetLoggerError> {
    static LOGGER: ConsoleLogger = ConsoleLogger;
    log::set_logger(&LOGGER)?;
    log::set_max_level(level);
    Ok(())
}

struct ConsoleLogger;

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level() && !metadata.target().starts_with(SPIN_TARGET)
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        color_println!(
            level_to_color(record.level()),
            "[SBI][{:>5}] {}",
            record.level(),
            record.args()
        );
    }

    fn flush(&self) {}
}

/// Maps a log level to its console color:
/// - `Level::Error` -> Red (31)
/// - `Level::Warn` -> Bright Yellow (93)
/// - `Level::Info` -> Blue (34)
/// - `Level::Debug` -> Green (32)
/// - `Level::Trace` -> Bright Black (90)
fn level_to_color(level: Level) -> Color {
    match level {
        Level::Error => Color::Red,
        Level::Warn => Color::BrightYellow,
        Level::Info => Color::Blue,
        Level::Debug => Color::Green,
        Level::Trace => Color::BrightBlack,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn colors_by_level() {
        assert_eq!(level_to_color(Level::Error) as u8, 31);
        assert_eq!(level_to_color(Level::Warn) as u8, 93);
        assert_eq!(level_to_color(Level::Info) as u8, 34);
        assert_eq!(level_to_color(Level::Debug) as u8, 32);
        assert_eq!(level_to_color(Level::Trace) as u8, 90);
    }

    #[test]
    fn lock_records_are_not_printed() {
        let logger = ConsoleLogger;
        let spin = Metadata::builder()
            .level(Level::Error)
            .target(SPIN_TARGET)
            .build();
        let other = Metadata::builder()
            .level(Level::Error)
            .target("ticket_spinlock::io")
            .build();
        log::set_max_level(LevelFilter::Trace);
        assert!(!logger.enabled(&spin));
        assert!(logger.enabled(&other));
    }
}
