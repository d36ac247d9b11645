//! Interactive sessions over a working set of cards.
//!
//! Both session kinds read input through the [`Interaction`] trait. Every
//! read returns a [`Reply`]; [`Reply::Cancelled`] is how end-of-input or an
//! interrupt reaches the session loop, which then stops without touching the
//! remaining cards. Mutations already sent stay applied.

pub mod batch;
pub mod display;
pub mod editor;
pub mod review;

pub use batch::{move_keys, BatchAction, BatchSession};
pub use editor::{ExternalEditor, TextEditor};
pub use review::{ReviewCommand, ReviewPrompts, ReviewSession};

use crate::error::Result;
use serde::Serialize;

/// Result of one read from the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply<T> {
    Answer(T),
    /// End of input or interrupt
    Cancelled,
}

/// The user-facing side of a session
pub trait Interaction {
    /// Read a line of text. `completions` are offered for tab completion.
    fn read_line(&mut self, prompt: &str, completions: &[String]) -> Reply<String>;

    /// Read a single keystroke. `None` means Enter or Escape.
    fn read_key(&mut self, prompt: &str) -> Reply<Option<char>>;

    /// Ask a yes/no question
    fn confirm(&mut self, prompt: &str, default: bool) -> Reply<bool>;

    /// Show a message
    fn print(&mut self, text: &str);

    /// Open a link in the user's browser
    fn open_url(&mut self, url: &str) -> Result<()>;
}

/// What a session did, reported when it ends
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SessionReport {
    /// Cards presented to the user
    pub visited: usize,
    /// Cards with at least one applied change and no failures
    pub applied: usize,
    /// Cards left untouched
    pub skipped: usize,
    /// Cards with at least one change rejected by the repository. Every
    /// visited card is counted in exactly one of applied, skipped and failed.
    pub failed: usize,
    /// The session ended before the working set was exhausted
    pub cancelled: bool,
}

impl std::fmt::Display for SessionReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} visited, {} changed, {} skipped, {} failed",
            self.visited, self.applied, self.skipped, self.failed
        )?;
        if self.cancelled {
            f.write_str(" (stopped early)")?;
        }
        Ok(())
    }
}
