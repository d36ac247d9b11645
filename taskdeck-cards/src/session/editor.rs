//! Editing text in the user's external editor.

use crate::error::{DeckError, Result};
use std::io::Write;
use std::process::Command;
use tracing::debug;

/// Something that can turn a piece of text into an edited piece of text
pub trait TextEditor {
    /// Edit `initial` and return the new text. An `Err` means nothing was
    /// read back.
    fn edit(&self, initial: &str) -> Result<String>;
}

/// Runs `$VISUAL`, then `$EDITOR`, then `vi` on a temporary file.
///
/// The temporary file lives only for the duration of [`TextEditor::edit`] and
/// is removed on every exit path, including a failed editor. Ctrl-C while the
/// editor runs reaches the editor only; taskdeck waits for it to exit and
/// then cleans up.
#[derive(Debug, Clone, Default)]
pub struct ExternalEditor {
    command: Option<String>,
}

impl ExternalEditor {
    /// Use the editor named by the environment
    pub fn from_env() -> Self {
        Self::default()
    }

    /// Use an explicit editor command, which may carry arguments (`"code -w"`)
    pub fn with_command(command: impl Into<String>) -> Self {
        Self {
            command: Some(command.into()),
        }
    }

    /// The editor command line that will be run
    pub fn command(&self) -> String {
        self.command
            .clone()
            .or_else(|| std::env::var("VISUAL").ok().filter(|v| !v.trim().is_empty()))
            .or_else(|| std::env::var("EDITOR").ok().filter(|v| !v.trim().is_empty()))
            .unwrap_or_else(|| "vi".to_string())
    }
}

impl TextEditor for ExternalEditor {
    fn edit(&self, initial: &str) -> Result<String> {
        let command = self.command();
        let parts: Vec<&str> = command.split_whitespace().collect();
        let Some((program, args)) = parts.split_first() else {
            return Err(DeckError::editor("editor command is empty"));
        };

        let mut file = tempfile::Builder::new()
            .prefix("taskdeck-")
            .suffix(".md")
            .tempfile()?;
        file.write_all(initial.as_bytes())?;
        file.flush()?;

        debug!(editor = %program, path = %file.path().display(), "launching editor");
        let status = {
            let _interrupts = InterruptGuard::install()?;
            Command::new(program)
                .args(args)
                .arg(file.path())
                .status()
                .map_err(|e| DeckError::editor(format!("failed to launch '{program}': {e}")))?
        };

        if !status.success() {
            return Err(DeckError::editor(format!(
                "'{}' exited with status {}",
                program,
                status.code().unwrap_or(-1)
            )));
        }

        Ok(std::fs::read_to_string(file.path())?)
    }
}

/// Catches SIGINT with a handler that does nothing until dropped.
///
/// A caught signal is reset to its default in the child on exec, so the
/// editor still dies on Ctrl-C while this process keeps waiting.
#[cfg(unix)]
struct InterruptGuard {
    previous: nix::sys::signal::SigAction,
}

#[cfg(unix)]
extern "C" fn swallow_interrupt(_: nix::libc::c_int) {}

#[cfg(unix)]
impl InterruptGuard {
    fn install() -> Result<Self> {
        use nix::sys::signal::{sigaction, SaFlags, SigAction, SigHandler, SigSet, Signal};

        let action = SigAction::new(
            SigHandler::Handler(swallow_interrupt),
            SaFlags::SA_RESTART,
            SigSet::empty(),
        );
        // SAFETY: the handler is async-signal-safe; it touches nothing
        let previous =
            unsafe { sigaction(Signal::SIGINT, &action) }.map_err(std::io::Error::from)?;
        Ok(Self { previous })
    }
}

#[cfg(unix)]
impl Drop for InterruptGuard {
    fn drop(&mut self) {
        use nix::sys::signal::{sigaction, Signal};

        // SAFETY: restores whatever disposition was in place before install
        if let Err(e) = unsafe { sigaction(Signal::SIGINT, &self.previous) } {
            debug!(error = %e, "could not restore SIGINT handler");
        }
    }
}

#[cfg(not(unix))]
struct InterruptGuard;

#[cfg(not(unix))]
impl InterruptGuard {
    fn install() -> Result<Self> {
        Ok(Self)
    }
}

#[cfg(all(test, target_os = "linux"))]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_successful_edit_reads_back() {
        // `sed -i` rewrites the file in place, standing in for a user
        let editor = ExternalEditor::with_command("sed -i s/old/new/");
        assert_eq!(editor.edit("old text").unwrap(), "new text");
    }

    #[test]
    #[serial]
    fn test_failed_editor_is_reported() {
        let err = ExternalEditor::with_command("false").edit("anything").unwrap_err();
        assert!(matches!(err, DeckError::Editor { .. }));

        let err = ExternalEditor::with_command("definitely-not-an-editor-xyz")
            .edit("anything")
            .unwrap_err();
        assert!(err.to_string().contains("failed to launch"));
    }

    #[test]
    #[serial]
    fn test_temp_file_removed_on_every_path() {
        let dir = std::env::temp_dir();
        let count = || {
            std::fs::read_dir(&dir)
                .unwrap()
                .filter_map(|e| e.ok())
                .filter(|e| e.file_name().to_string_lossy().starts_with("taskdeck-"))
                .count()
        };
        let before = count();
        let _ = ExternalEditor::with_command("true").edit("x");
        let _ = ExternalEditor::with_command("false").edit("x");
        assert_eq!(count(), before);
    }

    #[test]
    #[serial]
    fn test_interrupt_during_edit_kills_editor_not_caller() {
        let dir = std::env::temp_dir();
        let count = || {
            std::fs::read_dir(&dir)
                .unwrap()
                .filter_map(|e| e.ok())
                .filter(|e| e.file_name().to_string_lossy().starts_with("taskdeck-"))
                .count()
        };
        let before = count();

        // The edited file is the script: interrupt the caller, then the editor
        let err = ExternalEditor::with_command("sh")
            .edit("kill -INT $PPID\nkill -INT $$\nsleep 5\n")
            .unwrap_err();

        assert!(matches!(err, DeckError::Editor { .. }));
        assert_eq!(count(), before);
    }

    #[test]
    #[serial]
    fn test_editor_resolution_order() {
        let visual = std::env::var("VISUAL").ok();
        let editor = std::env::var("EDITOR").ok();

        std::env::set_var("VISUAL", "code -w");
        std::env::set_var("EDITOR", "nano");
        assert_eq!(ExternalEditor::from_env().command(), "code -w");

        std::env::remove_var("VISUAL");
        assert_eq!(ExternalEditor::from_env().command(), "nano");

        std::env::remove_var("EDITOR");
        assert_eq!(ExternalEditor::from_env().command(), "vi");

        // Restore
        if let Some(v) = visual {
            std::env::set_var("VISUAL", v);
        }
        if let Some(v) = editor {
            std::env::set_var("EDITOR", v);
        }
    }
}
