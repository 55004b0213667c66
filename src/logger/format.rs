//! Log formatting and output with ANSI colors
//!
//! Handles colorized console output with aligned tag and level columns,
//! plus broken pipe handling for piped commands.

use super::tags::LogTag;
use chrono::Local;
use colored::*;
use std::io::{stdout, ErrorKind, Write};

/// Log format widths for alignment
const TAG_WIDTH: usize = 10;
const TYPE_WIDTH: usize = 10;

/// Format and output a log message
pub fn format_and_log(tag: LogTag, log_type: &str, message: &str) {
    let time = Local::now().format("%H:%M:%S").to_string();

    let tag_str = format_tag(&tag);
    let type_str = format_log_type(log_type);

    let line = format!("{} [{}] [{}] {}", time.dimmed(), tag_str, type_str, message);
    print_stdout_safe(&line);
}

/// Format a tag with its module color
fn format_tag(tag: &LogTag) -> ColoredString {
    let padded = format!("{:<width$}", tag.to_plain_string(), width = TAG_WIDTH);
    match tag {
        LogTag::Channel => padded.bright_cyan().bold(),
        LogTag::Events => padded.bright_blue().bold(),
        LogTag::Notify => padded.bright_green().bold(),
        LogTag::Callbacks => padded.bright_magenta().bold(),
        LogTag::Session => padded.bright_yellow().bold(),
        LogTag::System => padded.white().bold(),
    }
}

/// Format the level/action column with severity colors
fn format_log_type(log_type: &str) -> ColoredString {
    let padded = format!("{:<width$}", log_type, width = TYPE_WIDTH);
    match log_type {
        "ERROR" => padded.bright_red().bold(),
        "WARNING" => padded.yellow().bold(),
        "DEBUG" | "VERBOSE" => padded.dimmed(),
        _ => padded.normal(),
    }
}

/// Print to stdout, silently ignoring broken pipes (e.g., `| head`)
fn print_stdout_safe(line: &str) {
    let mut out = stdout();
    if let Err(e) = writeln!(out, "{}", line) {
        if e.kind() != ErrorKind::BrokenPipe {
            // Nothing else we can do from inside the logger
        }
    }
}
