//! Shared console output.
//!
//! The platform registers a [`Console`] once during boot; afterwards every
//! hart can print through [`print`] and [`color_print`].
//!
//! A message is formatted into a stack buffer first and only then written
//! under the console's ticket lock, so lines from different harts do not
//! interleave. The lock is never held while formatting: a `Display` impl
//! may itself print or log without queueing behind its own ticket. Messages
//! longer than [`CONSOLE_LINE`] bytes go out in several pieces and may
//! interleave with other harts at piece boundaries.

use core::fmt::{self, Write};

use ::spin::Once;

use crate::config::CONSOLE_LINE;
use crate::spin::{TicketLock, TicketMutex};

/// Character sink provided by the platform (UART, SBI debug console, ...).
pub trait Console: Sync {
    fn putstr(&self, s: &str);
}

static CONSOLE: Once<&'static dyn Console> = Once::new();

static CONSOLE_LOCK: TicketMutex<()> = TicketMutex::const_new(TicketLock::new(), ());

/// Installs the console sink.
///
/// Only the first registration takes effect; returns `false` if a sink was
/// already installed.
pub fn register(console: &'static dyn Console) -> bool {
    let mut installed = false;
    CONSOLE.call_once(|| {
        installed = true;
        console
    });
    installed
}

/// Buffers formatted output and hands it to the sink in pieces of at most
/// `CONSOLE_LINE` bytes, each written under the console lock.
struct Stdout<'a> {
    console: &'a dyn Console,
    buf: [u8; CONSOLE_LINE],
    len: usize,
}

impl<'a> Stdout<'a> {
    fn new(console: &'a dyn Console) -> Self {
        Self {
            console,
            buf: [0; CONSOLE_LINE],
            len: 0,
        }
    }

    fn flush(&mut self) {
        if self.len == 0 {
            return;
        }
        // Pieces are only cut at char boundaries.
        if let Ok(s) = core::str::from_utf8(&self.buf[..self.len]) {
            let _guard = CONSOLE_LOCK.lock();
            self.console.putstr(s);
        }
        self.len = 0;
    }

    fn push(&mut self, s: &str) {
        self.buf[self.len..self.len + s.len()].copy_from_slice(s.as_bytes());
        self.len += s.len();
    }
}

impl Write for Stdout<'_> {
    fn write_str(&mut self, mut s: &str) -> fmt::Result {
        while !s.is_empty() {
            let room = CONSOLE_LINE - self.len;
            if s.len() <= room {
                self.push(s);
                break;
            }
            let mut cut = room;
            while !s.is_char_boundary(cut) {
                cut -= 1;
            }
            let (head, tail) = s.split_at(cut);
            self.push(head);
            self.flush();
            s = tail;
        }
        Ok(())
    }
}

fn with_stdout(f: impl FnOnce(&mut Stdout)) {
    // Output before registration is dropped.
    let Some(console) = CONSOLE.get() else {
        return;
    };
    let mut out = Stdout::new(*console);
    f(&mut out);
    out.flush();
}

/// Prints formatted output to the console.
///
/// # Parameters
/// - `args`: The formatted arguments to print, created using `format_args!`.
pub fn print(args: fmt::Arguments) {
    // `Stdout` never fails, formatting errors come from user `Display` impls.
    with_stdout(|out| {
        let _ = out.write_fmt(args);
    });
}

/// Prints `args` wrapped in the ANSI escape sequences for `color`.
pub fn color_print(color: Color, args: fmt::Arguments) {
    with_stdout(|out| {
        let _ = out.write_fmt(format_args!("\x1B[{}m{}\x1B[0m", color as u8, args));
    });
}

/// Prints formatted text without a newline, similar to `print!` in the standard library.
///
/// # Usage
/// ```
/// ticket_spinlock::print!("Hello, {}!", "world");
/// ```
#[macro_export]
macro_rules! print {
    ($fmt: literal $(, $($arg: tt)+)?) => {
        $crate::io::console::print(format_args!($fmt $(, $($arg)+)?))
    };
}

/// Prints formatted text followed by a newline, similar to `println!` in the standard library.
#[macro_export]
macro_rules! println {
    ($fmt: literal $(, $($arg: tt)+)?) => {
        $crate::io::console::print(format_args!(concat!($fmt, "\n") $(, $($arg)+)?))
    };
}

#[macro_export]
macro_rules! color_print {
    ($color:expr, $fmt:literal $(, $($arg:tt)+)?) => {
        $crate::io::console::color_print(
            $color,
            format_args!($fmt $(, $($arg)+)?)
        )
    };
}

#[macro_export]
macro_rules! color_println {
    ($color:expr, $fmt:literal $(, $($arg:tt)+)?) => {
        $crate::io::console::color_print(
            $color,
            format_args!(concat!($fmt, "\n") $(, $($arg)+)?)
        )
    };
}

/// ANSI color codes for terminal output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(unused)]
pub enum Color {
    Black = 30,
    Red = 31,
    Green = 32,
    Yellow = 33,
    Blue = 34,
    Magenta = 35,
    Cyan = 36,
    White = 37,
    BrightBlack = 90,
    BrightRed = 91,
    BrightGreen = 92,
    BrightYellow = 93,
    BrightBlue = 94,
    BrightMagenta = 95,
    BrightCyan = 96,
    BrightWhite = 97,
}
