//! Review sessions: any number of commands per card.
//!
//! The cursor only moves on `next`, `quit`, a confirmed `delete`, or a
//! cancelled read. Every other command runs to completion against the current
//! card and returns to the prompt. Changes are applied to the session's copy
//! of the card as well, so `print` shows them without fetching again.
//!
//! With [`ReviewPrompts`] enabled, a card is met with up to two questions
//! before the prompt: whether to attach links found in its title, and which
//! tags to add when it has none.

use super::batch::{attach_title_links, move_by_key, read_due_date, toggle_tag};
use super::display::render_card;
use super::editor::TextEditor;
use super::{Interaction, Reply, SessionReport};
use crate::context::BoardContext;
use crate::error::Result;
use crate::links;
use crate::lookup::normalize;
use crate::repository::CardRepository;
use crate::types::{Card, CardStatus, CardUpdate};
use chrono::Utc;
use colored::Colorize;
use tracing::{debug, info, warn};

/// A command understood at the review prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewCommand {
    Print,
    Description,
    DueDate,
    Next,
    Quit,
    Help,
    Tag,
    Move,
    Rename,
    Attach,
    Archive,
    Unarchive,
    Comment,
    Delete,
    Open,
}

/// What the prompt input turned out to be
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Parsed {
    Command(ReviewCommand),
    Empty,
    Unrecognized(String),
}

/// What the session does after a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Stay,
    /// Stay, and the card was changed
    Changed,
    /// The card is gone; count it as changed and move on
    Removed,
    Next,
    Quit,
}

type Handler = fn(&mut ReviewSession<'_>, &mut Card) -> Result<Flow>;

struct CommandSpec {
    command: ReviewCommand,
    name: &'static str,
    aliases: &'static [&'static str],
    summary: &'static str,
    run: Handler,
}

static COMMANDS: &[CommandSpec] = &[
    CommandSpec {
        command: ReviewCommand::Print,
        name: "print",
        aliases: &["p"],
        summary: "show the card again",
        run: print_card,
    },
    CommandSpec {
        command: ReviewCommand::Description,
        name: "description",
        aliases: &["desc"],
        summary: "edit the description in $EDITOR",
        run: edit_description,
    },
    CommandSpec {
        command: ReviewCommand::DueDate,
        name: "duedate",
        aliases: &["d"],
        summary: "set the due date",
        run: set_due_date,
    },
    CommandSpec {
        command: ReviewCommand::Next,
        name: "next",
        aliases: &["n"],
        summary: "go to the next card",
        run: next_card,
    },
    CommandSpec {
        command: ReviewCommand::Quit,
        name: "quit",
        aliases: &["q"],
        summary: "end the review",
        run: quit,
    },
    CommandSpec {
        command: ReviewCommand::Help,
        name: "help",
        aliases: &["h", "?"],
        summary: "list commands",
        run: show_help,
    },
    CommandSpec {
        command: ReviewCommand::Tag,
        name: "tag",
        aliases: &["t"],
        summary: "toggle tags by name",
        run: toggle_tags,
    },
    CommandSpec {
        command: ReviewCommand::Move,
        name: "move",
        aliases: &["m"],
        summary: "move to another list",
        run: move_card,
    },
    CommandSpec {
        command: ReviewCommand::Rename,
        name: "rename",
        aliases: &[],
        summary: "change the title",
        run: rename,
    },
    CommandSpec {
        command: ReviewCommand::Attach,
        name: "attach",
        aliases: &[],
        summary: "attach links found in the title",
        run: attach_links,
    },
    CommandSpec {
        command: ReviewCommand::Archive,
        name: "archive",
        aliases: &[],
        summary: "archive the card",
        run: archive,
    },
    CommandSpec {
        command: ReviewCommand::Unarchive,
        name: "unarchive",
        aliases: &[],
        summary: "restore an archived card",
        run: unarchive,
    },
    CommandSpec {
        command: ReviewCommand::Comment,
        name: "comment",
        aliases: &["c"],
        summary: "write a comment in $EDITOR and post it",
        run: comment,
    },
    CommandSpec {
        command: ReviewCommand::Delete,
        name: "delete",
        aliases: &[],
        summary: "delete the card permanently",
        run: delete,
    },
    CommandSpec {
        command: ReviewCommand::Open,
        name: "open",
        aliases: &["o"],
        summary: "open attachments in the browser",
        run: open_attachments,
    },
];

impl ReviewCommand {
    fn spec(self) -> &'static CommandSpec {
        // Every variant has exactly one row
        COMMANDS
            .iter()
            .find(|spec| spec.command == self)
            .unwrap_or(&COMMANDS[0])
    }

    pub fn name(self) -> &'static str {
        self.spec().name
    }

    /// Parse prompt input, ignoring case and surrounding whitespace
    pub fn parse(input: &str) -> Parsed {
        let key = normalize(input);
        if key.is_empty() {
            return Parsed::Empty;
        }
        COMMANDS
            .iter()
            .find(|spec| spec.name == key || spec.aliases.contains(&key.as_str()))
            .map(|spec| Parsed::Command(spec.command))
            .unwrap_or_else(|| Parsed::Unrecognized(input.trim().to_string()))
    }

    /// Command names starting with `prefix`
    pub fn complete(prefix: &str) -> Vec<&'static str> {
        let key = normalize(prefix);
        COMMANDS
            .iter()
            .map(|spec| spec.name)
            .filter(|name| name.starts_with(&key))
            .collect()
    }
}

/// Questions asked when a card is first shown. All off by default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReviewPrompts {
    /// Offer to attach links found in the title
    pub title_links: bool,
    /// Ask for tags when the card has none
    pub untagged: bool,
}

impl ReviewPrompts {
    pub fn all() -> Self {
        Self {
            title_links: true,
            untagged: true,
        }
    }
}

/// What happened to the current card so far
#[derive(Debug, Default)]
struct CardState {
    changed: bool,
    failed: bool,
}

/// Drives the review prompt over a working set
pub struct ReviewSession<'a> {
    repo: &'a mut dyn CardRepository,
    ctx: &'a BoardContext,
    io: &'a mut dyn Interaction,
    editor: &'a dyn TextEditor,
    prompts: ReviewPrompts,
}

impl<'a> ReviewSession<'a> {
    pub fn new(
        repo: &'a mut dyn CardRepository,
        ctx: &'a BoardContext,
        io: &'a mut dyn Interaction,
        editor: &'a dyn TextEditor,
    ) -> Self {
        Self {
            repo,
            ctx,
            io,
            editor,
            prompts: ReviewPrompts::default(),
        }
    }

    pub fn with_prompts(mut self, prompts: ReviewPrompts) -> Self {
        self.prompts = prompts;
        self
    }

    pub fn run(mut self, cards: Vec<Card>) -> Result<SessionReport> {
        let mut report = SessionReport::default();
        let names: Vec<String> = COMMANDS.iter().map(|c| c.name.to_string()).collect();
        debug!(cards = cards.len(), "starting review session");

        for mut card in cards {
            report.visited += 1;
            let mut state = CardState::default();
            print_card(&mut self, &mut card)?;

            let mut flow = self.ask_on_arrival(&mut card, &mut state)?;
            while flow.is_none() {
                let input = match self.io.read_line("review > ", &names) {
                    Reply::Answer(input) => input,
                    Reply::Cancelled => {
                        flow = Some(Flow::Quit);
                        break;
                    }
                };
                let command = match ReviewCommand::parse(&input) {
                    Parsed::Command(command) => command,
                    Parsed::Empty => continue,
                    Parsed::Unrecognized(input) => {
                        self.io.print(&format!(
                            "{} '{}'. Type 'help' for commands.",
                            "Unrecognized command".yellow(),
                            input
                        ));
                        continue;
                    }
                };
                debug!(card = %card.id, command = command.name(), "review command");
                flow = self.dispatch(command.spec().run, &mut card, &mut state)?;
            }

            if state.failed {
                report.failed += 1;
            } else if state.changed {
                report.applied += 1;
            } else {
                report.skipped += 1;
            }
            if flow == Some(Flow::Quit) {
                report.cancelled = true;
                debug!(%report, "review session ended early");
                return Ok(report);
            }
        }

        self.io.print(&"All cards reviewed".green().to_string());
        debug!(%report, "review session finished");
        Ok(report)
    }

    /// Run a handler. `Some` means the cursor leaves the card.
    fn dispatch(
        &mut self,
        run: Handler,
        card: &mut Card,
        state: &mut CardState,
    ) -> Result<Option<Flow>> {
        match run(self, card) {
            Ok(Flow::Stay) => Ok(None),
            Ok(Flow::Changed) => {
                state.changed = true;
                Ok(None)
            }
            Ok(Flow::Removed) => {
                state.changed = true;
                Ok(Some(Flow::Next))
            }
            Ok(flow) => Ok(Some(flow)),
            Err(err) if err.is_fatal_in_session() => Err(err),
            Err(err) => {
                warn!(card = %card.id, error = %err, "review command failed");
                self.io.print(&format!("{} {}", "Failed:".red().bold(), err));
                state.failed = true;
                Ok(None)
            }
        }
    }

    fn ask_on_arrival(&mut self, card: &mut Card, state: &mut CardState) -> Result<Option<Flow>> {
        if self.prompts.title_links && links::has_link(&card.title) {
            match self
                .io
                .confirm("Link in title detected, want to attach it?", true)
            {
                Reply::Answer(true) => {
                    if let Some(flow) = self.dispatch(attach_links, card, state)? {
                        return Ok(Some(flow));
                    }
                }
                Reply::Answer(false) => {}
                Reply::Cancelled => return Ok(Some(Flow::Quit)),
            }
        }
        if self.prompts.untagged && card.tag_ids.is_empty() && !self.ctx.tags().is_empty() {
            self.io
                .print(&"No tags on this card yet, want to add some?".yellow().to_string());
            return self.dispatch(toggle_tags, card, state);
        }
        Ok(None)
    }
}

fn print_card(session: &mut ReviewSession<'_>, card: &mut Card) -> Result<Flow> {
    let rendered = render_card(card, session.ctx, Utc::now());
    session.io.print(&rendered);
    Ok(Flow::Stay)
}

fn next_card(_session: &mut ReviewSession<'_>, _card: &mut Card) -> Result<Flow> {
    Ok(Flow::Next)
}

fn quit(_session: &mut ReviewSession<'_>, _card: &mut Card) -> Result<Flow> {
    Ok(Flow::Quit)
}

fn show_help(session: &mut ReviewSession<'_>, _card: &mut Card) -> Result<Flow> {
    let mut lines = vec!["Commands:".to_string()];
    for spec in COMMANDS {
        let aliases = if spec.aliases.is_empty() {
            String::new()
        } else {
            format!(" ({})", spec.aliases.join(", "))
        };
        lines.push(format!(
            "  {:<22}{}",
            format!("{}{}", spec.name, aliases),
            spec.summary
        ));
    }
    session.io.print(&lines.join("\n"));
    Ok(Flow::Stay)
}

fn edit_description(session: &mut ReviewSession<'_>, card: &mut Card) -> Result<Flow> {
    let edited = session.editor.edit(card.description_text())?;
    let edited = edited.trim_end();
    if edited == card.description_text() {
        session.io.print("Description unchanged");
        return Ok(Flow::Stay);
    }
    let update = CardUpdate::new().with_description(edited);
    session.repo.update_card(&card.id, &update)?;
    update.apply_to(card);
    info!(card = %card.id, "updated description");
    session.io.print("Description updated");
    Ok(Flow::Changed)
}

fn set_due_date(session: &mut ReviewSession<'_>, card: &mut Card) -> Result<Flow> {
    let due = match read_due_date(&mut *session.io, "due > ") {
        Reply::Answer(Some(due)) => due,
        Reply::Answer(None) => {
            session.io.print("Due date unchanged");
            return Ok(Flow::Stay);
        }
        Reply::Cancelled => return Ok(Flow::Stay),
    };
    let update = CardUpdate::new().with_due(Some(due));
    session.repo.update_card(&card.id, &update)?;
    update.apply_to(card);
    info!(card = %card.id, %due, "set due date");
    session
        .io
        .print(&format!("Due date set to {}", due.format("%Y-%m-%d")));
    Ok(Flow::Changed)
}

fn toggle_tags(session: &mut ReviewSession<'_>, card: &mut Card) -> Result<Flow> {
    let names: Vec<String> = session.ctx.tag_index().names().map(String::from).collect();
    let mut toggled = false;
    loop {
        let line = match session.io.read_line("tag (empty line when done) > ", &names) {
            Reply::Answer(line) if !line.trim().is_empty() => line,
            _ => break,
        };
        toggled |= toggle_tag(&mut *session.repo, session.ctx, &mut *session.io, card, &line)?;
    }
    Ok(if toggled { Flow::Changed } else { Flow::Stay })
}

fn move_card(session: &mut ReviewSession<'_>, card: &mut Card) -> Result<Flow> {
    Ok(
        match move_by_key(&mut *session.repo, session.ctx, &mut *session.io, card)? {
            Reply::Answer(true) => Flow::Changed,
            _ => Flow::Stay,
        },
    )
}

fn rename(session: &mut ReviewSession<'_>, card: &mut Card) -> Result<Flow> {
    session.io.print(&format!("Current title: {}", card.title));
    let title = match session.io.read_line("new title (empty keeps it) > ", &[]) {
        Reply::Answer(title) => title.trim().to_string(),
        Reply::Cancelled => return Ok(Flow::Stay),
    };
    if title.is_empty() || title == card.title {
        return Ok(Flow::Stay);
    }
    let update = CardUpdate::new().with_title(title);
    session.repo.update_card(&card.id, &update)?;
    update.apply_to(card);
    info!(card = %card.id, "renamed card");
    Ok(Flow::Changed)
}

fn attach_links(session: &mut ReviewSession<'_>, card: &mut Card) -> Result<Flow> {
    if !links::has_link(&card.title) {
        session.io.print("No links in the title");
        return Ok(Flow::Stay);
    }
    attach_title_links(&mut *session.repo, card)?;
    session
        .io
        .print(&format!("Attached; title is now {}", card.title.green()));
    Ok(Flow::Changed)
}

fn archive(session: &mut ReviewSession<'_>, card: &mut Card) -> Result<Flow> {
    if card.status == CardStatus::Archived {
        session.io.print("Already archived");
        return Ok(Flow::Stay);
    }
    session.repo.archive_card(&card.id)?;
    card.status = CardStatus::Archived;
    info!(card = %card.id, "archived card");
    session.io.print("Archived");
    Ok(Flow::Changed)
}

fn unarchive(session: &mut ReviewSession<'_>, card: &mut Card) -> Result<Flow> {
    if card.status == CardStatus::Open {
        session.io.print("Card is not archived");
        return Ok(Flow::Stay);
    }
    let update = CardUpdate::new().with_status(CardStatus::Open);
    session.repo.update_card(&card.id, &update)?;
    update.apply_to(card);
    info!(card = %card.id, "restored card");
    session.io.print("Restored");
    Ok(Flow::Changed)
}

fn comment(session: &mut ReviewSession<'_>, card: &mut Card) -> Result<Flow> {
    let text = session.editor.edit("")?;
    let text = text.trim();
    if text.is_empty() {
        session.io.print("Empty comment, nothing posted");
        return Ok(Flow::Stay);
    }
    session.repo.add_comment(&card.id, text)?;
    info!(card = %card.id, "posted comment");
    session.io.print("Comment posted");
    Ok(Flow::Changed)
}

fn delete(session: &mut ReviewSession<'_>, card: &mut Card) -> Result<Flow> {
    match session.io.confirm("Delete this card permanently?", false) {
        Reply::Answer(true) => {}
        _ => return Ok(Flow::Stay),
    }
    session.repo.delete_card(&card.id)?;
    card.status = CardStatus::Deleted;
    info!(card = %card.id, "deleted card");
    session.io.print("Card deleted");
    Ok(Flow::Removed)
}

fn open_attachments(session: &mut ReviewSession<'_>, card: &mut Card) -> Result<Flow> {
    if card.attachments.is_empty() {
        session.io.print("No attachments");
        return Ok(Flow::Stay);
    }
    for url in &card.attachments {
        debug!(card = %card.id, %url, "opening attachment");
        session.io.open_url(url)?;
    }
    Ok(Flow::Stay)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_names_and_aliases() {
        assert_eq!(ReviewCommand::parse("PRINT"), Parsed::Command(ReviewCommand::Print));
        assert_eq!(ReviewCommand::parse(" desc "), Parsed::Command(ReviewCommand::Description));
        assert_eq!(ReviewCommand::parse("d"), Parsed::Command(ReviewCommand::DueDate));
        assert_eq!(ReviewCommand::parse("q"), Parsed::Command(ReviewCommand::Quit));
        assert_eq!(ReviewCommand::parse(""), Parsed::Empty);
        assert_eq!(
            ReviewCommand::parse("frobnicate"),
            Parsed::Unrecognized("frobnicate".to_string())
        );
    }

    #[test]
    fn test_every_command_has_one_row() {
        for spec in COMMANDS {
            assert_eq!(spec.command.spec().name, spec.name);
        }
        assert_eq!(COMMANDS.len(), 15);
    }

    #[test]
    fn test_complete() {
        assert_eq!(
            ReviewCommand::complete("d"),
            vec!["description", "duedate", "delete"]
        );
        assert_eq!(ReviewCommand::complete("UN"), vec!["unarchive"]);
        assert_eq!(ReviewCommand::complete("").len(), COMMANDS.len());
        assert!(ReviewCommand::complete("x").is_empty());
    }
}
