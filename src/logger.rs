// Structured logging for the classification core
//
// Colored, timestamped, tag-prefixed lines on stdout. Debug-level decode
// tracing is gated behind a process-wide toggle so production callers pay
// nothing for it.

use chrono::Utc;
use colored::*;
use std::sync::atomic::{AtomicBool, Ordering};

static DEBUG_ENABLED: AtomicBool = AtomicBool::new(false);

/// Subsystem tag attached to every log line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTag {
    Accounts,
    Transactions,
    Rpc,
    Batch,
    Metadata,
    Cache,
}

impl LogTag {
    fn label(&self) -> &'static str {
        match self {
            LogTag::Accounts => "ACCOUNTS",
            LogTag::Transactions => "TRANSACTIONS",
            LogTag::Rpc => "RPC",
            LogTag::Batch => "BATCH",
            LogTag::Metadata => "METADATA",
            LogTag::Cache => "CACHE",
        }
    }
}

/// Enable or disable debug-level tracing for the whole process
pub fn set_debug_enabled(enabled: bool) {
    DEBUG_ENABLED.store(enabled, Ordering::Relaxed);
}

/// Check whether debug tracing is currently enabled
pub fn is_debug_enabled() -> bool {
    DEBUG_ENABLED.load(Ordering::Relaxed)
}

/// Log an operational event: `[12:34:56] TAG ACTION message`
pub fn log(tag: LogTag, action: &str, message: &str) {
    let timestamp = Utc::now().format("%H:%M:%S").to_string();
    println!(
        "{} {} {} {}",
        format!("[{}]", timestamp).dimmed(),
        tag.label().cyan().bold(),
        action.bright_white().bold(),
        message
    );
}

/// Log a warning-level event
pub fn warn(tag: LogTag, action: &str, message: &str) {
    let timestamp = Utc::now().format("%H:%M:%S").to_string();
    println!(
        "{} {} {} {}",
        format!("[{}]", timestamp).dimmed(),
        tag.label().yellow().bold(),
        action.yellow().bold(),
        message.yellow()
    );
}

/// Log a debug-level event; dropped unless [`set_debug_enabled`] was called
pub fn debug(tag: LogTag, action: &str, message: &str) {
    if !is_debug_enabled() {
        return;
    }
    let timestamp = Utc::now().format("%H:%M:%S").to_string();
    println!(
        "{} {} {} {}",
        format!("[{}]", timestamp).dimmed(),
        tag.label().purple().bold(),
        action.dimmed(),
        message.dimmed()
    );
}
