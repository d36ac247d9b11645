//! Helpers for driving sessions in tests.
//!
//! [`ScriptedInteraction`] replays a fixed sequence of user inputs and keeps
//! everything the session printed. Running out of script reads as end of
//! input, which cancels the session. [`ScriptedEditor`] stands in for the
//! external editor. [`sample_repository`] builds a small board to work on.

use crate::error::{DeckError, Result};
use crate::repository::MemoryRepository;
use crate::session::{Interaction, Reply, TextEditor};
use crate::types::{Board, List, Tag};
use std::cell::RefCell;
use std::collections::VecDeque;

/// One scripted user input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Line(String),
    Key(Option<char>),
    Confirm(bool),
    /// End of input or Ctrl-C at whatever the next read is
    Cancel,
}

/// An [`Interaction`] that replays a script
#[derive(Debug, Default)]
pub struct ScriptedInteraction {
    script: VecDeque<Input>,
    printed: Vec<String>,
    prompts: Vec<String>,
    opened: Vec<String>,
}

impl ScriptedInteraction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn line(mut self, text: impl Into<String>) -> Self {
        self.script.push_back(Input::Line(text.into()));
        self
    }

    pub fn key(mut self, key: char) -> Self {
        self.script.push_back(Input::Key(Some(key)));
        self
    }

    /// Enter or Escape at a keystroke prompt
    pub fn no_key(mut self) -> Self {
        self.script.push_back(Input::Key(None));
        self
    }

    pub fn confirm(mut self, yes: bool) -> Self {
        self.script.push_back(Input::Confirm(yes));
        self
    }

    pub fn cancel(mut self) -> Self {
        self.script.push_back(Input::Cancel);
        self
    }

    /// Everything printed so far, one entry per call
    pub fn printed(&self) -> &[String] {
        &self.printed
    }

    /// Everything printed so far, joined
    pub fn output(&self) -> String {
        self.printed.join("\n")
    }

    /// Prompts in the order they were shown
    pub fn prompts(&self) -> &[String] {
        &self.prompts
    }

    /// Links handed to the browser
    pub fn opened(&self) -> &[String] {
        &self.opened
    }

    /// Script entries not yet consumed
    pub fn remaining(&self) -> usize {
        self.script.len()
    }

    fn next(&mut self, prompt: &str) -> Option<Input> {
        self.prompts.push(prompt.to_string());
        self.script.pop_front()
    }
}

impl Interaction for ScriptedInteraction {
    fn read_line(&mut self, prompt: &str, _completions: &[String]) -> Reply<String> {
        match self.next(prompt) {
            Some(Input::Line(text)) => Reply::Answer(text),
            None | Some(Input::Cancel) => Reply::Cancelled,
            Some(other) => panic!("prompt '{prompt}' wanted a line, script has {other:?}"),
        }
    }

    fn read_key(&mut self, prompt: &str) -> Reply<Option<char>> {
        match self.next(prompt) {
            Some(Input::Key(key)) => Reply::Answer(key),
            None | Some(Input::Cancel) => Reply::Cancelled,
            Some(other) => panic!("prompt '{prompt}' wanted a key, script has {other:?}"),
        }
    }

    fn confirm(&mut self, prompt: &str, _default: bool) -> Reply<bool> {
        match self.next(prompt) {
            Some(Input::Confirm(yes)) => Reply::Answer(yes),
            None | Some(Input::Cancel) => Reply::Cancelled,
            Some(other) => panic!("prompt '{prompt}' wanted a confirmation, script has {other:?}"),
        }
    }

    fn print(&mut self, text: &str) {
        self.printed.push(text.to_string());
    }

    fn open_url(&mut self, url: &str) -> Result<()> {
        self.opened.push(url.to_string());
        Ok(())
    }
}

/// A [`TextEditor`] that returns a canned result and records what it was given
#[derive(Debug)]
pub struct ScriptedEditor {
    result: Option<String>,
    seen: RefCell<Vec<String>>,
}

impl ScriptedEditor {
    /// Every edit produces `text`
    pub fn returning(text: impl Into<String>) -> Self {
        Self {
            result: Some(text.into()),
            seen: RefCell::new(Vec::new()),
        }
    }

    /// Every edit fails as if the editor exited nonzero
    pub fn failing() -> Self {
        Self {
            result: None,
            seen: RefCell::new(Vec::new()),
        }
    }

    /// The initial text of each edit
    pub fn seen(&self) -> Vec<String> {
        self.seen.borrow().clone()
    }
}

impl TextEditor for ScriptedEditor {
    fn edit(&self, initial: &str) -> Result<String> {
        self.seen.borrow_mut().push(initial.to_string());
        self.result
            .clone()
            .ok_or_else(|| DeckError::editor("'scripted' exited with status 1"))
    }
}

/// A board named "Home" with lists Inbox, Doing, Done and tags Food, Work,
/// Errand. No cards.
pub fn sample_repository() -> MemoryRepository {
    MemoryRepository::new()
        .with_board(Board::new("b1", "Home"))
        .with_list(List::new("inbox", "Inbox", "b1", 1.0))
        .with_list(List::new("doing", "Doing", "b1", 2.0))
        .with_list(List::new("done", "Done", "b1", 3.0))
        .with_tag(Tag::new("food", "Food", "b1").with_color("green"))
        .with_tag(Tag::new("work", "Work", "b1").with_color("blue"))
        .with_tag(Tag::new("errand", "Errand", "b1"))
}
