/// Core logging implementation with automatic filtering
///
/// Filtering rules:
/// 1. Errors are always shown
/// 2. Warning/Info are shown by default
/// 3. Debug level requires the --debug-<module> flag for that tag
/// 4. Verbose level requires the --verbose flag
use super::format;
use super::levels::LogLevel;
use super::tags::LogTag;
use crate::global;

/// Check if a log message should be displayed
pub fn should_log(tag: &LogTag, level: LogLevel) -> bool {
    match level {
        LogLevel::Error | LogLevel::Warning | LogLevel::Info => true,
        LogLevel::Debug => {
            global::is_debug_enabled_for(tag.to_debug_key()) || global::is_verbose_enabled()
        }
        LogLevel::Verbose => global::is_verbose_enabled(),
    }
}

/// Internal logging function with automatic filtering
pub fn log_internal(tag: LogTag, level: LogLevel, message: &str) {
    if !should_log(&tag, level) {
        return;
    }

    format::format_and_log(tag, level.as_str(), message);
}
