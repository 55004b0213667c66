//! Structured logging for the notification core
//!
//! Provides a small, ergonomic logging API with:
//! - Standard log levels (Error/Warning/Info/Debug/Verbose)
//! - Per-module debug control via --debug-<module> flags
//! - Colored console output
//!
//! ## Usage
//!
//! ```rust
//! use ocsnotify::logger::{self, LogTag};
//!
//! logger::error(LogTag::Channel, "Connection failed");
//! logger::info(LogTag::Notify, "Notification added");
//! logger::debug(LogTag::Events, "Raw frame: ..."); // Only with --debug-events
//! ```

mod core;
mod format;
mod levels;
mod tags;

pub use levels::LogLevel;
pub use tags::LogTag;

/// Log at ERROR level (always shown, critical issues)
pub fn error(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Error, message);
}

/// Log at WARNING level (important issues)
pub fn warning(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Warning, message);
}

/// Log at INFO level (standard operations)
pub fn info(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Info, message);
}

/// Log at DEBUG level (detailed diagnostics)
///
/// Debug logs are ONLY shown when the --debug-<module> flag matching the
/// tag is provided.
pub fn debug(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Debug, message);
}

/// Log at VERBOSE level (very detailed tracing, gated by --verbose)
pub fn verbose(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Verbose, message);
}

/// Log a lifecycle action at INFO level with an explicit action column
///
/// Used for connection lifecycle steps (CONNECT/CLOSE/SUBSCRIBE/...) where
/// the action name carries more signal than a level string.
pub fn log(tag: LogTag, action: &str, message: &str) {
    if core::should_log(&tag, LogLevel::Info) {
        format::format_and_log(tag, action, message);
    }
}
