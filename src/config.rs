//! Compile-time configuration.
//!
//! Firmware has no environment at runtime, so everything here is fixed when
//! the image is built.

use log::LevelFilter;

/// Bit position of the `next` (issued) counter inside the lock word.
pub const TICKET_SHIFT: u32 = 16;
/// Mask selecting the `owner` (served) counter, the low half of the word.
pub const OWNER_MASK: u32 = 0xffff;
/// Amount added to the lock word to issue one ticket.
pub const TICKET_INC: u32 = 1 << TICKET_SHIFT;
/// Holder plus waiters must stay strictly below this bound.
pub const MAX_OUTSTANDING: u32 = 1 << 16;

/// Bytes of a message formatted before it is handed to the console in one
/// piece. Longer messages are written in several pieces.
pub const CONSOLE_LINE: usize = 256;

/// Log target prefix of the lock implementation.
///
/// The console is itself guarded by a ticket lock, so records under this
/// prefix are never routed back to the console.
pub const SPIN_TARGET: &str = "ticket_spinlock::spin";

/// Maximum log level, taken from the `LOG` variable at build time:
/// - "ERROR" -> `LevelFilter::Error`
/// - "WARN" -> `LevelFilter::Warn`
/// - "INFO" -> `LevelFilter::Info`
/// - "DEBUG" -> `LevelFilter::Debug`
/// - "TRACE" -> `LevelFilter::Trace`
/// - anything else -> `LevelFilter::Off`
pub const LOG_LEVEL: LevelFilter = parse_level(option_env!("LOG"));

const fn parse_level(value: Option<&str>) -> LevelFilter {
    let Some(s) = value else {
        return LevelFilter::Off;
    };
    if bytes_eq(s, "ERROR") {
        LevelFilter::Error
    } else if bytes_eq(s, "WARN") {
        LevelFilter::Warn
    } else if bytes_eq(s, "INFO") {
        LevelFilter::Info
    } else if bytes_eq(s, "DEBUG") {
        LevelFilter::Debug
    } else if bytes_eq(s, "TRACE") {
        LevelFilter::Trace
    } else {
        LevelFilter::Off
    }
}

// `str` equality is not usable in const context.
const fn bytes_eq(a: &str, b: &str) -> bool {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    if a.len() != b.len() {
        return false;
    }
    let mut i = 0;
    while i < a.len() {
        if a[i] != b[i] {
            return false;
        }
        i += 1;
    }
    true
}
