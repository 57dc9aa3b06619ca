//! Levelled stderr logging with macros.
//!
//! The VM reports every decoded instruction at [`Level::Trace`]; the default
//! threshold is [`Level::Info`], so the trace costs one atomic load per
//! instruction unless it is switched on with [`set_level`].

use std::fmt::Display;
use std::io::Write;
use std::str::FromStr;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::time::Instant;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// Log level for filtering messages.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Trace = 0,
    Info = 1,
    Warn = 2,
    Error = 3,
}

impl Level {
    const fn from_u8(value: u8) -> Self {
        match value {
            0 => Level::Trace,
            1 => Level::Info,
            2 => Level::Warn,
            _ => Level::Error,
        }
    }
}

impl Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Level::Trace => write!(f, "TRACE"),
            Level::Info => write!(f, "INFO"),
            Level::Warn => write!(f, "WARN"),
            Level::Error => write!(f, "ERROR"),
        }
    }
}

impl FromStr for Level {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "trace" => Ok(Level::Trace),
            "info" => Ok(Level::Info),
            "warn" | "warning" => Ok(Level::Warn),
            "error" => Ok(Level::Error),
            other => Err(format!("unknown log level '{other}'")),
        }
    }
}

static MIN_LEVEL: AtomicU8 = AtomicU8::new(Level::Info as u8);
pub static SHOW_TIMESTAMP: AtomicBool = AtomicBool::new(true);
pub static SHOW_TYPE: AtomicBool = AtomicBool::new(true);

/// Reference point for the elapsed-time prefix.
static START: OnceLock<Instant> = OnceLock::new();

/// Sets the lowest level that is written.
pub fn set_level(level: Level) {
    MIN_LEVEL.store(level as u8, Ordering::Relaxed);
}

/// Returns the lowest level that is written.
pub fn level() -> Level {
    Level::from_u8(MIN_LEVEL.load(Ordering::Relaxed))
}

/// Whether a message at `level` would be written.
#[inline]
pub fn enabled(level: Level) -> bool {
    level as u8 >= MIN_LEVEL.load(Ordering::Relaxed)
}

/// Formats elapsed milliseconds as `seconds.millis`, padded for alignment.
fn format_elapsed(millis: u128) -> String {
    format!("{:>6}.{:03}", millis / 1000, millis % 1000)
}

/// Internal logging function. Use the `trace!`, `info!`, `warn!`, or `error!` macros instead.
#[doc(hidden)]
pub fn log(level: Level, message: &str) {
    let start = *START.get_or_init(Instant::now);

    let mut stderr = StandardStream::stderr(ColorChoice::Auto);
    let mut spec = ColorSpec::new();
    match level {
        Level::Trace => {
            spec.set_fg(Some(Color::Cyan)).set_dimmed(true);
        }
        Level::Warn => {
            spec.set_fg(Some(Color::Yellow)).set_bold(true);
        }
        Level::Error => {
            spec.set_fg(Some(Color::Red)).set_bold(true);
        }
        Level::Info => {
            spec.clear();
        }
    }
    let _ = stderr.set_color(&spec);

    if SHOW_TIMESTAMP.load(Ordering::Relaxed) {
        let _ = write!(stderr, "{} ", format_elapsed(start.elapsed().as_millis()));
    }
    if SHOW_TYPE.load(Ordering::Relaxed) {
        let _ = write!(stderr, "[{:5}] ", level);
    }
    let _ = writeln!(stderr, "{}", message);
    let _ = stderr.reset();
}

/// Logs a trace-level message. The arguments are not formatted unless tracing is enabled.
#[macro_export]
macro_rules! trace {
    ($($arg:tt)*) => {{
        if cfg!(not(test)) && $crate::utils::log::enabled($crate::utils::log::Level::Trace) {
            $crate::utils::log::log($crate::utils::log::Level::Trace, &format!($($arg)*));
        }
    }};
}

/// Logs an info-level message.
#[macro_export]
macro_rules! info {
    ($($arg:tt)*) => {{
        if cfg!(not(test)) && $crate::utils::log::enabled($crate::utils::log::Level::Info) {
            $crate::utils::log::log($crate::utils::log::Level::Info, &format!($($arg)*));
        }
    }};
}

/// Logs a warning-level message.
#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {{
        if cfg!(not(test)) && $crate::utils::log::enabled($crate::utils::log::Level::Warn) {
            $crate::utils::log::log($crate::utils::log::Level::Warn, &format!($($arg)*))
        }
    }};
}

/// Logs an error-level message.
#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => {{
        if cfg!(not(test)) && $crate::utils::log::enabled($crate::utils::log::Level::Error) {
            $crate::utils::log::log($crate::utils::log::Level::Error, &format!($($arg)*))
        }
    }};
}
