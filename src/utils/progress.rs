//! Progress indicators for commands that touch many objects

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::time::Duration;

/// Create a spinner for indeterminate operations
pub fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .expect("Failed to create spinner template")
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

/// Create a progress bar for determinate operations
pub fn create_progress_bar(len: u64, message: &str) -> ProgressBar {
    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{msg} [{bar:40.cyan/blue}] {pos}/{len}")
            .expect("Failed to create progress bar template")
            .progress_chars("█▓▒░ "),
    );
    pb.set_message(message.to_string());
    pb
}

/// Hide a bar, e.g. when its output would interleave with dry-run lines
pub fn hidden(pb: ProgressBar) -> ProgressBar {
    pb.set_draw_target(ProgressDrawTarget::hidden());
    pb
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_spinner() {
        let pb = create_spinner("Listing pods");
        assert!(pb.message().contains("Listing pods"));
        pb.finish_and_clear();
    }

    #[test]
    fn test_create_progress_bar() {
        let pb = hidden(create_progress_bar(3, "Deleting pods"));
        pb.inc(2);
        assert_eq!(pb.length(), Some(3));
        assert_eq!(pb.position(), 2);
        pb.finish_and_clear();
    }
}
