//! Stderr tracing for the CPM passes.
//!
//! Each stage reports progress when `EngineConfig::verbosity` reaches the
//! line's level. Nothing is formatted at verbosity 0. Every line carries a
//! `[cpm]` prefix so host applications can tell engine output apart.
//!
//! | verbosity | written |
//! |---|---|
//! | 0 | nothing |
//! | 1 | one line per stage: graph size, pass totals, advisor outcome |
//! | 2 | per-task float rows, ignored summary edges, chosen strategies |
//! | 3 | per-edge candidates, advisor iterations |

pub const VERBOSITY_SILENT: u8 = 0;
pub const VERBOSITY_SUMMARY: u8 = 1;
pub const VERBOSITY_DETAIL: u8 = 2;
pub const VERBOSITY_DEBUG: u8 = 3;

/// Whether a line at `level` is written under `verbosity`.
///
/// Silent is never a writable level, so `level` 0 is always suppressed.
#[inline]
pub fn enabled(verbosity: u8, level: u8) -> bool {
    level > VERBOSITY_SILENT && verbosity >= level
}

#[doc(hidden)]
#[macro_export]
macro_rules! __cpm_log {
    ($verbosity:expr, $level:expr, $($arg:tt)*) => {
        if $crate::logging::enabled($verbosity, $level) {
            eprintln!("[cpm] {}", format_args!($($arg)*));
        }
    };
}

/// Stage totals.
#[macro_export]
macro_rules! log_summary {
    ($verbosity:expr, $($arg:tt)*) => {
        $crate::__cpm_log!($verbosity, $crate::logging::VERBOSITY_SUMMARY, $($arg)*)
    };
}

/// Per-task results.
#[macro_export]
macro_rules! log_detail {
    ($verbosity:expr, $($arg:tt)*) => {
        $crate::__cpm_log!($verbosity, $crate::logging::VERBOSITY_DETAIL, $($arg)*)
    };
}

#[macro_export]
macro_rules! log_debug {
    ($verbosity:expr, $($arg:tt)*) => {
        $crate::__cpm_log!($verbosity, $crate::logging::VERBOSITY_DEBUG, $($arg)*)
    };
}
