//! Dry-run mode utilities

use colored::Colorize;
use std::sync::atomic::{AtomicBool, Ordering};

static DRY_RUN: AtomicBool = AtomicBool::new(false);

/// Enable or disable dry-run mode for this process
pub fn set_dry_run(enabled: bool) {
    DRY_RUN.store(enabled, Ordering::Relaxed);
}

/// Check if dry-run mode is enabled
pub fn is_dry_run() -> bool {
    DRY_RUN.load(Ordering::Relaxed)
}

/// Text printed in place of an action skipped by dry-run mode
pub fn describe_action(action: &str) -> String {
    format!("  {} {}", "[DRY RUN]".cyan().bold(), action)
}

/// Log a dry-run action
pub fn log_action(action: &str) {
    if is_dry_run() {
        println!("{}", describe_action(action));
    }
}
