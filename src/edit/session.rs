//! Scoped temporary file for one edit session

use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::TempPath;

use super::editor::Editor;
use super::error::{EditError, EditorFailure, IoStep};
use crate::k8s::ResourceRef;

/// Owns the staged document for exactly one edit
///
/// The file is removed when the session is dropped, whichever way the edit
/// ended.
pub struct EditSession {
    reference: ResourceRef,
    path: TempPath,
}

impl EditSession {
    /// Write `document` into a fresh `<kind>-XXXXXX.yaml` file under `dir`
    pub fn stage(reference: &ResourceRef, document: &str, dir: &Path) -> Result<Self, EditError> {
        let io_err = |source| EditError::Io {
            step: IoStep::Stage,
            path: dir.to_path_buf(),
            source,
        };

        let mut file = tempfile::Builder::new()
            .prefix(&format!("{}-", reference.kind))
            .suffix(".yaml")
            .tempfile_in(dir)
            .map_err(io_err)?;

        file.write_all(document.as_bytes()).map_err(io_err)?;
        file.as_file().sync_all().map_err(io_err)?;

        // Close our handle so the editor is free to replace the file
        let path = file.into_temp_path();
        tracing::debug!(path = %path.display(), %reference, "staged edit file");

        Ok(Self {
            reference: reference.clone(),
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Run the editor on the staged file; blocks until it exits
    pub fn open_in<E: Editor + ?Sized>(&self, editor: &E) -> Result<(), EditError> {
        let outcome = editor
            .edit(self.path())
            .map_err(EditorFailure::Launch)
            .and_then(EditorFailure::from_exit);

        outcome.map_err(|source| EditError::Editor {
            reference: self.reference.clone(),
            source,
        })
    }

    /// Read the document back after editing
    pub fn read_back(&self) -> Result<String, EditError> {
        fs::read_to_string(self.path()).map_err(|source| EditError::Io {
            step: IoStep::ReadBack,
            path: self.path().to_path_buf(),
            source,
        })
    }
}
