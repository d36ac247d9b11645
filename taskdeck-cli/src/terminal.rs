//! Terminal side of interactive sessions.
//!
//! On a TTY, lines are read with dialoguer (tab completes tag and command
//! names), single keystrokes with crossterm in raw mode, and yes/no questions
//! with a dialoguer confirm. When stdin is not a terminal every read falls
//! back to one plain line, so sessions can be scripted through a pipe.

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal;
use dialoguer::{Completion, Confirm, Input};
use std::io::{self, BufRead, IsTerminal, Write};
use taskdeck_cards::lookup::NameIndex;
use taskdeck_cards::{Interaction, Reply, Result};
use tracing::debug;

/// Restores cooked mode when a keystroke read ends, however it ends
struct RawModeGuard;

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

/// Completes against a fixed set of names
struct NameCompletion<'a> {
    names: &'a [String],
}

impl Completion for NameCompletion<'_> {
    fn get(&self, input: &str) -> Option<String> {
        complete_name(self.names, input)
    }
}

/// What tab should turn `input` into.
///
/// A single candidate completes fully; several complete to their shared
/// prefix when that adds anything.
pub fn complete_name(names: &[String], input: &str) -> Option<String> {
    if input.trim().is_empty() {
        return None;
    }
    let index = NameIndex::new(names.iter().map(|name| (name.clone(), ())));
    let candidates = index.complete(input);
    match candidates.as_slice() {
        [] => None,
        [only] => Some(only.to_string()),
        [first, rest @ ..] => {
            let shared = rest.iter().fold(first.chars().count(), |len, name| {
                first
                    .chars()
                    .zip(name.chars())
                    .take(len)
                    .take_while(|(a, b)| a.to_lowercase().eq(b.to_lowercase()))
                    .count()
            });
            (shared > input.chars().count()).then(|| first.chars().take(shared).collect())
        }
    }
}

/// Interaction over the process's stdin and stdout
pub struct TerminalInteraction {
    interactive: bool,
}

impl Default for TerminalInteraction {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminalInteraction {
    /// Interactive widgets only when both stdin and stdout are terminals
    pub fn new() -> Self {
        let interactive = io::stdin().is_terminal() && io::stdout().is_terminal();
        debug!(interactive, "terminal interaction");
        Self { interactive }
    }

    pub fn is_interactive(&self) -> bool {
        self.interactive
    }

    /// One line from stdin. End of input cancels.
    fn plain_line(&self, prompt: &str) -> Reply<String> {
        print!("{prompt}");
        let _ = io::stdout().flush();
        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line) {
            Ok(0) | Err(_) => Reply::Cancelled,
            Ok(_) => Reply::Answer(line.trim_end_matches(['\n', '\r']).to_string()),
        }
    }

    fn raw_key(&self, prompt: &str) -> io::Result<Reply<Option<char>>> {
        print!("{prompt}");
        io::stdout().flush()?;
        terminal::enable_raw_mode()?;
        let _guard = RawModeGuard;
        loop {
            let Event::Key(KeyEvent {
                code,
                modifiers,
                kind,
                ..
            }) = event::read()?
            else {
                continue;
            };
            if kind != KeyEventKind::Press {
                continue;
            }
            return Ok(match code {
                KeyCode::Char('c') | KeyCode::Char('d')
                    if modifiers.contains(KeyModifiers::CONTROL) =>
                {
                    Reply::Cancelled
                }
                KeyCode::Char(c) => Reply::Answer(Some(c)),
                KeyCode::Enter | KeyCode::Esc => Reply::Answer(None),
                _ => continue,
            });
        }
    }
}

/// dialoguer appends its own separator to prompts
fn widget_prompt(prompt: &str) -> &str {
    prompt.trim_end_matches([' ', '>'])
}

impl Interaction for TerminalInteraction {
    fn read_line(&mut self, prompt: &str, completions: &[String]) -> Reply<String> {
        if !self.interactive {
            return self.plain_line(prompt);
        }
        let completion = NameCompletion { names: completions };
        let result = Input::<String>::new()
            .with_prompt(widget_prompt(prompt))
            .allow_empty(true)
            .completion_with(&completion)
            .interact_text();
        match result {
            Ok(line) => Reply::Answer(line),
            Err(err) => {
                debug!(error = %err, "line input ended");
                Reply::Cancelled
            }
        }
    }

    fn read_key(&mut self, prompt: &str) -> Reply<Option<char>> {
        if !self.interactive {
            return match self.plain_line(prompt) {
                Reply::Answer(line) => Reply::Answer(line.trim().chars().next()),
                Reply::Cancelled => Reply::Cancelled,
            };
        }
        let reply = match self.raw_key(prompt) {
            Ok(reply) => reply,
            Err(err) => {
                debug!(error = %err, "keystroke input failed");
                Reply::Cancelled
            }
        };
        match &reply {
            Reply::Answer(Some(c)) => println!("{c}"),
            _ => println!(),
        }
        reply
    }

    fn confirm(&mut self, prompt: &str, default: bool) -> Reply<bool> {
        if !self.interactive {
            let hint = if default { "[Y/n]" } else { "[y/N]" };
            return match self.plain_line(&format!("{prompt} {hint} ")) {
                Reply::Answer(line) => Reply::Answer(parse_yes_no(&line).unwrap_or(default)),
                Reply::Cancelled => Reply::Cancelled,
            };
        }
        match Confirm::new()
            .with_prompt(prompt)
            .default(default)
            .interact_opt()
        {
            Ok(Some(answer)) => Reply::Answer(answer),
            Ok(None) => Reply::Cancelled,
            Err(err) => {
                debug!(error = %err, "confirm ended");
                Reply::Cancelled
            }
        }
    }

    fn print(&mut self, text: &str) {
        println!("{text}");
    }

    /// Without a terminal there is no one to look at a browser, so the link
    /// is printed instead
    fn open_url(&mut self, url: &str) -> Result<()> {
        if !self.interactive {
            println!("{url}");
            return Ok(());
        }
        open::that_detached(url)?;
        Ok(())
    }
}

/// `y`/`yes`/`n`/`no`, anything else is no answer
fn parse_yes_no(line: &str) -> Option<bool> {
    match line.trim().to_lowercase().as_str() {
        "y" | "yes" => Some(true),
        "n" | "no" => Some(false),
        _ => None,
    }
}
