//! Enhanced error types with actionable suggestions

use colored::Colorize;
use thiserror::Error;

use crate::edit::EditError;
use crate::k8s::{ReferenceError, StaleResource};

/// Enhanced error with suggestions
#[derive(Error, Debug)]
#[error("{message}")]
pub struct AdminError {
    pub message: String,
    pub suggestions: Vec<String>,
}

impl AdminError {
    /// Create a new error with suggestions
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            suggestions: Vec::new(),
        }
    }

    /// Add a suggestion to the error
    pub fn suggest(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    /// Render the error with suggestions
    pub fn render(&self) -> String {
        let mut out = format!("{} {}", "Error:".red().bold(), self.message);

        if !self.suggestions.is_empty() {
            out.push_str(&format!("\n\n{}", "Suggestions:".yellow().bold()));
            for suggestion in &self.suggestions {
                out.push_str(&format!("\n  {} {}", "→".blue(), suggestion));
            }
        }

        out
    }

    /// Display the error with suggestions on stderr
    pub fn display(&self) {
        eprintln!("{}", self.render());
    }

    // Common error patterns

    /// Object not found error
    pub fn not_found(message: String) -> Self {
        Self::new(message)
            .suggest("Check the namespace and name, e.g. `kadmin list -n <namespace>`")
            .suggest("Verify you are pointed at the right cluster (--context)")
    }

    /// Permission denied error
    pub fn permission_denied(message: String) -> Self {
        Self::new(message)
            .suggest("Verify you have sufficient permissions on the cluster")
            .suggest("Check that your kubeconfig credentials have not expired")
    }

    /// Cluster unreachable error
    pub fn unreachable(message: String) -> Self {
        Self::new(message)
            .suggest("Check that the cluster is running and reachable")
            .suggest("Verify the kubeconfig and context (--kubeconfig, --context)")
    }

    /// Concurrent modification error
    pub fn conflict(message: String) -> Self {
        Self::new(message)
            .suggest("Someone else changed the object after it was fetched")
            .suggest("Re-run the command to start from the current version")
    }
}

/// Helper to display error and exit
pub fn display_error_and_exit(error: AdminError) -> ! {
    error.display();
    std::process::exit(1);
}

/// Convert anyhow error to AdminError when possible
pub fn enhance_error(err: &anyhow::Error) -> AdminError {
    let message = format!("{:#}", err);

    if let Some(edit) = err.downcast_ref::<EditError>() {
        return enhance_edit_error(edit, message);
    }

    if err.downcast_ref::<StaleResource>().is_some() {
        return AdminError::conflict(message);
    }

    if err.downcast_ref::<ReferenceError>().is_some() {
        return AdminError::new(message).suggest("Run with --help to see the expected arguments");
    }

    enhance_from_text(message)
}

fn enhance_edit_error(err: &EditError, message: String) -> AdminError {
    match err {
        EditError::Fetch { .. } => enhance_from_text(message),
        EditError::Editor { .. } => AdminError::new(message)
            .suggest("Set KUBE_EDITOR or EDITOR to an installed editor, e.g. EDITOR=nano")
            .suggest("Exit the editor normally (e.g. `:wq` in vim) to submit changes"),
        EditError::Deserialize { .. } => AdminError::new(message)
            .suggest("Check the YAML indentation and field types")
            .suggest("Re-run the edit; the cluster object was not changed"),
        EditError::Conflict { .. } => AdminError::conflict(message),
        EditError::Submit { .. } => AdminError::new(message)
            .suggest("The API server rejected the edited object; see the cause above")
            .suggest("Re-run the edit; the cluster object was not changed"),
        EditError::Io { .. } => AdminError::new(message)
            .suggest("Check that the staging directory exists and is writable"),
        EditError::Serialize { .. } => AdminError::new(message),
    }
}

fn enhance_from_text(message: String) -> AdminError {
    let lower = message.to_lowercase();

    if lower.contains("not found") || lower.contains("notfound") {
        return AdminError::not_found(message);
    }

    if lower.contains("unauthorized") || lower.contains("forbidden") {
        return AdminError::permission_denied(message);
    }

    if lower.contains("connection refused")
        || lower.contains("timed out")
        || lower.contains("dns error")
    {
        return AdminError::unreachable(message);
    }

    AdminError::new(message).suggest("Run with -v or -vv for more details")
}
