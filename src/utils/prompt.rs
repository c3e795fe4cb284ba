//! Confirmation before destructive actions

use anyhow::{Context, Result, bail};
use dialoguer::Confirm;
use std::io::IsTerminal;

/// Ask before deleting `count` objects of kind `noun`; answers no by default
pub fn confirm_delete(count: usize, noun: &str) -> Result<bool> {
    if !std::io::stdin().is_terminal() {
        bail!(
            "Refusing to delete {} without a terminal to confirm on; pass --yes to skip the prompt",
            counted(count, noun)
        );
    }

    Confirm::new()
        .with_prompt(format!("Delete {}?", counted(count, noun)))
        .default(false)
        .interact()
        .context("Failed to read confirmation")
}

fn counted(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("1 {}", noun)
    } else {
        format!("{} {}s", count, noun)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counted() {
        assert_eq!(counted(1, "pod"), "1 pod");
        assert_eq!(counted(3, "pod"), "3 pods");
        assert_eq!(counted(0, "pod"), "0 pods");
    }
}
