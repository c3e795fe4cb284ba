//! External editor invocation

use anyhow::{Context, Result, anyhow};
use std::env;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Used when neither the environment nor the config names an editor
pub const DEFAULT_EDITOR: &str = "vim";

/// Opens a file for interactive editing and blocks until the user is done
///
/// Returns the editor's exit code, or `None` if it was killed by a signal.
/// Closures with the matching signature implement this trait, which is how
/// tests script an edit without launching a real program.
pub trait Editor {
    fn edit(&self, path: &Path) -> io::Result<Option<i32>>;
}

impl<F> Editor for F
where
    F: Fn(&Path) -> io::Result<Option<i32>>,
{
    fn edit(&self, path: &Path) -> io::Result<Option<i32>> {
        self(path)
    }
}

/// Pick the editor command line: `KUBE_EDITOR`, then `EDITOR`, then the config
pub fn pick_command(
    kube_editor: Option<String>,
    editor: Option<String>,
    configured: Option<&str>,
) -> String {
    [kube_editor, editor, configured.map(str::to_string)]
        .into_iter()
        .flatten()
        .find(|cmd| !cmd.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_EDITOR.to_string())
}

/// A real editor process attached to the invoking terminal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemEditor {
    program: PathBuf,
    args: Vec<String>,
}

impl SystemEditor {
    /// Parse a command line such as `code --wait` and locate its program on PATH
    pub fn from_command_line(command: &str) -> Result<Self> {
        let mut words = shell_words::split(command)
            .with_context(|| format!("Failed to parse editor command: {}", command))?;

        if words.is_empty() {
            return Err(anyhow!("Editor command is empty"));
        }

        let name = words.remove(0);
        let program = which::which(&name)
            .with_context(|| format!("Editor '{}' not found in PATH", name))?;

        tracing::debug!(editor = %program.display(), args = ?words, "resolved editor");

        Ok(Self {
            program,
            args: words,
        })
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }
}

impl Editor for SystemEditor {
    fn edit(&self, path: &Path) -> io::Result<Option<i32>> {
        let status = Command::new(&self.program)
            .args(&self.args)
            .arg(path)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()?;

        Ok(status.code())
    }
}

/// An editor command line that is located on PATH only when the edit starts
///
/// A program that cannot be found surfaces from [`Editor::edit`] as a launch
/// failure, after the object was fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorCommand {
    command: String,
}

impl EditorCommand {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }

    /// `KUBE_EDITOR`, then `EDITOR`, then `configured`, then [`DEFAULT_EDITOR`]
    pub fn from_env(configured: Option<&str>) -> Self {
        Self::new(pick_command(
            env::var("KUBE_EDITOR").ok(),
            env::var("EDITOR").ok(),
            configured,
        ))
    }

    pub fn command(&self) -> &str {
        &self.command
    }
}

impl Editor for EditorCommand {
    fn edit(&self, path: &Path) -> io::Result<Option<i32>> {
        let editor = SystemEditor::from_command_line(&self.command)
            .map_err(|e| io::Error::new(io::ErrorKind::NotFound, format!("{:#}", e)))?;
        editor.edit(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pick_command_order() {
        assert_eq!(
            pick_command(Some("nano".into()), Some("emacs".into()), Some("code")),
            "nano"
        );
        assert_eq!(
            pick_command(None, Some("emacs".into()), Some("code")),
            "emacs"
        );
        assert_eq!(pick_command(None, None, Some("code --wait")), "code --wait");
        assert_eq!(pick_command(None, None, None), DEFAULT_EDITOR);
    }

    #[test]
    fn test_pick_command_skips_blank() {
        assert_eq!(
            pick_command(Some("  ".into()), Some("".into()), None),
            DEFAULT_EDITOR
        );
    }

    #[test]
    fn test_from_command_line_splits_args() {
        let editor = SystemEditor::from_command_line("sh -c 'exit 0' --").unwrap();
        assert!(editor.program().ends_with("sh"));
        assert_eq!(editor.args(), ["-c", "exit 0", "--"]);
    }

    #[test]
    fn test_from_command_line_errors() {
        assert!(SystemEditor::from_command_line("").is_err());
        assert!(SystemEditor::from_command_line("'unterminated").is_err());
        assert!(SystemEditor::from_command_line("no-such-editor-xyz").is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_system_editor_reports_exit_code() {
        let file = tempfile::NamedTempFile::new().unwrap();

        let ok = SystemEditor::from_command_line("true").unwrap();
        assert_eq!(ok.edit(file.path()).unwrap(), Some(0));

        let failing = SystemEditor::from_command_line("false").unwrap();
        assert_eq!(failing.edit(file.path()).unwrap(), Some(1));
    }

    #[test]
    fn test_missing_editor_fails_at_launch() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let editor = EditorCommand::new("no-such-editor-xyz --wait");

        let err = editor.edit(file.path()).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
        assert!(err.to_string().contains("no-such-editor-xyz"));
    }

    #[cfg(unix)]
    #[test]
    fn test_editor_command_runs_program() {
        let file = tempfile::NamedTempFile::new().unwrap();
        assert_eq!(EditorCommand::new("true").edit(file.path()).unwrap(), Some(0));
    }
}
