//! FILENAME: core/resultset-pivot/src/logging.rs
// PURPOSE: Categorised logging for the pivot engine.
// CONTEXT: Records go through the `log` facade with the category as target.
//          The embedding application decides where they end up.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use log::Level;

// ============================================================================
// SEQUENCED LOG RECORDS
// ============================================================================

/// Global sequence counter so interleaved records can be re-ordered.
static LOG_SEQ: AtomicU64 = AtomicU64::new(0);

/// Get next sequence number
pub fn next_seq() -> u64 {
    LOG_SEQ.fetch_add(1, Ordering::Relaxed) + 1
}

/// Write a log line in `seq|message` form under the category target.
pub fn write_log(level: Level, category: &str, args: fmt::Arguments<'_>) {
    if !log::log_enabled!(target: category, level) {
        return;
    }
    let seq = next_seq();
    log::log!(target: category, level, "{}|{}", seq, args);
}

/// Write a function ENTER line.
pub fn write_log_enter(level: Level, category: &str, func: &str, args: fmt::Arguments<'_>) {
    write_log(level, category, format_args!("ENTER {} {}", func, args));
}

/// Write a function EXIT line.
pub fn write_log_exit(level: Level, category: &str, func: &str, args: fmt::Arguments<'_>) {
    write_log(level, category, format_args!("EXIT {} {}", func, args));
}

// ============================================================================
// MACRO DEFINITIONS & EXPORTS
// ============================================================================

#[macro_export]
macro_rules! log_debug {
    ($cat:expr, $($arg:tt)*) => {
        $crate::logging::write_log(::log::Level::Debug, $cat, format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_info {
    ($cat:expr, $($arg:tt)*) => {
        $crate::logging::write_log(::log::Level::Info, $cat, format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_warn {
    ($cat:expr, $($arg:tt)*) => {
        $crate::logging::write_log(::log::Level::Warn, $cat, format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_error {
    ($cat:expr, $($arg:tt)*) => {
        $crate::logging::write_log(::log::Level::Error, $cat, format_args!($($arg)*))
    };
}

// ENTER/EXIT macros for function tracing

#[macro_export]
macro_rules! log_enter {
    ($cat:expr, $func:expr) => {
        $crate::logging::write_log_enter(::log::Level::Debug, $cat, $func, format_args!(""))
    };
    ($cat:expr, $func:expr, $($arg:tt)*) => {
        $crate::logging::write_log_enter(::log::Level::Debug, $cat, $func, format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_exit {
    ($cat:expr, $func:expr) => {
        $crate::logging::write_log_exit(::log::Level::Debug, $cat, $func, format_args!(""))
    };
    ($cat:expr, $func:expr, $($arg:tt)*) => {
        $crate::logging::write_log_exit(::log::Level::Debug, $cat, $func, format_args!($($arg)*))
    };
}
