//! Failures of an edit session, one variant per step

use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::k8s::ResourceRef;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// File operation that failed while staging or reading back the document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoStep {
    Stage,
    ReadBack,
}

impl fmt::Display for IoStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IoStep::Stage => f.write_str("stage"),
            IoStep::ReadBack => f.write_str("read back"),
        }
    }
}

/// Why the editor step did not succeed
#[derive(Error, Debug)]
pub enum EditorFailure {
    #[error("could not launch editor")]
    Launch(#[source] io::Error),

    #[error("editor exited with status {0}")]
    ExitCode(i32),

    #[error("editor was terminated by a signal")]
    Signal,
}

impl EditorFailure {
    /// Interpret the editor's exit code; `None` means it was killed by a signal
    pub fn from_exit(code: Option<i32>) -> Result<(), Self> {
        match code {
            Some(0) => Ok(()),
            Some(code) => Err(EditorFailure::ExitCode(code)),
            None => Err(EditorFailure::Signal),
        }
    }
}

#[derive(Error, Debug)]
pub enum EditError {
    #[error("Failed to fetch {reference}")]
    Fetch {
        reference: ResourceRef,
        #[source]
        source: BoxError,
    },

    #[error("Failed to serialize {reference} to YAML")]
    Serialize {
        reference: ResourceRef,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Failed to {step} edit file {}", .path.display())]
    Io {
        step: IoStep,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Editor failed while editing {reference}, no changes were submitted")]
    Editor {
        reference: ResourceRef,
        #[source]
        source: EditorFailure,
    },

    #[error("Edited document is not a valid {kind}, no changes were submitted", kind = .reference.kind)]
    Deserialize {
        reference: ResourceRef,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Failed to submit {reference}")]
    Submit {
        reference: ResourceRef,
        #[source]
        source: BoxError,
    },

    #[error("Update of {reference} conflicts with a concurrent change, re-run the edit")]
    Conflict {
        reference: ResourceRef,
        #[source]
        source: BoxError,
    },
}

impl EditError {
    /// Name of the step the session stopped at
    pub fn step(&self) -> &'static str {
        match self {
            EditError::Fetch { .. } => "fetch",
            EditError::Serialize { .. } => "serialize",
            EditError::Io {
                step: IoStep::Stage,
                ..
            } => "stage",
            EditError::Io {
                step: IoStep::ReadBack,
                ..
            } => "re-read",
            EditError::Editor { .. } => "edit",
            EditError::Deserialize { .. } => "deserialize",
            EditError::Submit { .. } | EditError::Conflict { .. } => "submit",
        }
    }
}
