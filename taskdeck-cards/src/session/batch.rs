//! Batch sessions: one action, applied card by card.
//!
//! Each card goes through present → await decision → apply or skip. A
//! cancelled read ends the whole session. A card whose mutation fails is
//! counted as failed and the session moves on, unless the failure means the
//! credentials are gone, which ends the session with that error.

use super::display::render_card;
use super::{Interaction, Reply, SessionReport};
use crate::context::BoardContext;
use crate::dates::{parse_due_date, DATE_HINT};
use crate::error::Result;
use crate::links::extract_links;
use crate::repository::CardRepository;
use crate::types::{Card, CardStatus, CardUpdate, List};
use chrono::{DateTime, Utc};
use colored::Colorize;
use tracing::{debug, info, warn};

/// Keys offered for list selection, home row first
const HOME_ROW: &str = "asdfghjkl;'";

/// The action a batch session applies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchAction {
    /// Toggle tags by name until an empty line
    Tag,
    /// Move to a list chosen with one keystroke
    Move,
    /// Set the due date
    Due,
    /// Turn links in the title into attachments
    Attach,
    /// Archive, or delete outright with `force`
    Delete { force: bool, noninteractive: bool },
}

/// Outcome of one card's decision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Applied,
    Skipped,
    /// Cancelled mid-card. Changes already sent for the card stay.
    Cancelled { after_changes: bool },
}

/// Assign selection keys to lists in board order
pub fn move_keys(lists: &[List]) -> Vec<(char, &List)> {
    let rest = ('a'..='z').filter(|c| !HOME_ROW.contains(*c));
    HOME_ROW.chars().chain(rest).zip(lists.iter()).collect()
}

/// Drives one [`BatchAction`] over a working set
pub struct BatchSession<'a> {
    repo: &'a mut dyn CardRepository,
    ctx: &'a BoardContext,
    io: &'a mut dyn Interaction,
    action: BatchAction,
}

impl<'a> BatchSession<'a> {
    pub fn new(
        repo: &'a mut dyn CardRepository,
        ctx: &'a BoardContext,
        io: &'a mut dyn Interaction,
        action: BatchAction,
    ) -> Self {
        Self {
            repo,
            ctx,
            io,
            action,
        }
    }

    /// Visit every card in order until the set is exhausted or cancelled
    pub fn run(mut self, cards: Vec<Card>) -> Result<SessionReport> {
        let mut report = SessionReport::default();
        debug!(action = ?self.action, cards = cards.len(), "starting batch session");

        for mut card in cards {
            report.visited += 1;
            let rendered = render_card(&card, self.ctx, Utc::now());
            self.io.print(&rendered);

            match self.decide(&mut card) {
                Ok(Step::Applied) => report.applied += 1,
                Ok(Step::Skipped) => report.skipped += 1,
                Ok(Step::Cancelled { after_changes }) => {
                    if after_changes {
                        report.applied += 1;
                    } else {
                        report.skipped += 1;
                    }
                    report.cancelled = true;
                    break;
                }
                Err(err) if err.is_fatal_in_session() => return Err(err),
                Err(err) => {
                    warn!(card = %card.id, error = %err, "card update failed");
                    self.io
                        .print(&format!("{} {}", "Failed:".red().bold(), err));
                    report.failed += 1;
                }
            }
        }

        debug!(%report, "batch session finished");
        Ok(report)
    }

    fn decide(&mut self, card: &mut Card) -> Result<Step> {
        match self.action {
            BatchAction::Tag => self.tag(card),
            BatchAction::Move => self.move_to_list(card),
            BatchAction::Due => self.set_due(card),
            BatchAction::Attach => self.attach(card),
            BatchAction::Delete {
                force,
                noninteractive,
            } => self.delete(card, force, noninteractive),
        }
    }

    fn tag(&mut self, card: &mut Card) -> Result<Step> {
        let names: Vec<String> = self.ctx.tag_index().names().map(String::from).collect();
        let mut toggled = false;
        loop {
            let line = match self.io.read_line("tag (empty line for next card) > ", &names) {
                Reply::Answer(line) => line,
                Reply::Cancelled => {
                    return Ok(Step::Cancelled {
                        after_changes: toggled,
                    })
                }
            };
            if line.trim().is_empty() {
                return Ok(if toggled { Step::Applied } else { Step::Skipped });
            }
            toggled |= toggle_tag(&mut *self.repo, self.ctx, &mut *self.io, card, &line)?;
        }
    }

    fn move_to_list(&mut self, card: &mut Card) -> Result<Step> {
        Ok(match move_by_key(&mut *self.repo, self.ctx, &mut *self.io, card)? {
            Reply::Answer(true) => Step::Applied,
            Reply::Answer(false) => Step::Skipped,
            Reply::Cancelled => Step::Cancelled { after_changes: false },
        })
    }

    fn set_due(&mut self, card: &mut Card) -> Result<Step> {
        let due = match read_due_date(&mut *self.io, "due (empty line to skip) > ") {
            Reply::Answer(Some(due)) => due,
            Reply::Answer(None) => return Ok(Step::Skipped),
            Reply::Cancelled => return Ok(Step::Cancelled { after_changes: false }),
        };
        let update = CardUpdate::new().with_due(Some(due));
        self.repo.update_card(&card.id, &update)?;
        update.apply_to(card);
        info!(card = %card.id, %due, "set due date");
        self.io
            .print(&format!("Due date set to {}", due.format("%Y-%m-%d")));
        Ok(Step::Applied)
    }

    fn attach(&mut self, card: &mut Card) -> Result<Step> {
        let links = extract_links(&card.title);
        if links.is_empty() {
            self.io.print("No links in the title");
            return Ok(Step::Skipped);
        }
        let prompt = format!(
            "Attach {} and remove from the title?",
            links.urls.join(", ")
        );
        match self.io.confirm(&prompt, true) {
            Reply::Answer(true) => {}
            Reply::Answer(false) => return Ok(Step::Skipped),
            Reply::Cancelled => return Ok(Step::Cancelled { after_changes: false }),
        }
        attach_title_links(&mut *self.repo, card)?;
        self.io.print(&format!("Attached; title is now {}", card.title.green()));
        Ok(Step::Applied)
    }

    fn delete(&mut self, card: &mut Card, force: bool, noninteractive: bool) -> Result<Step> {
        if !noninteractive {
            let prompt = if force {
                "Delete this card permanently?"
            } else {
                "Archive this card?"
            };
            match self.io.confirm(prompt, false) {
                Reply::Answer(true) => {}
                Reply::Answer(false) => return Ok(Step::Skipped),
                Reply::Cancelled => return Ok(Step::Cancelled { after_changes: false }),
            }
        }
        if force {
            self.repo.delete_card(&card.id)?;
            info!(card = %card.id, "deleted card");
            self.io.print("Deleted");
        } else {
            self.repo.archive_card(&card.id)?;
            card.status = CardStatus::Archived;
            info!(card = %card.id, "archived card");
            self.io.print("Archived");
        }
        Ok(Step::Applied)
    }
}

/// Prompt until the input parses as a date or is empty.
///
/// An empty line answers `None`; unparsable input is reported and asked again.
pub(crate) fn read_due_date(io: &mut dyn Interaction, prompt: &str) -> Reply<Option<DateTime<Utc>>> {
    io.print(DATE_HINT);
    loop {
        let line = match io.read_line(prompt, &[]) {
            Reply::Answer(line) => line,
            Reply::Cancelled => return Reply::Cancelled,
        };
        if line.trim().is_empty() {
            return Reply::Answer(None);
        }
        match parse_due_date(&line) {
            Ok(due) => return Reply::Answer(Some(due)),
            Err(err) => io.print(&format!("{} {}", "Invalid date:".red(), err)),
        }
    }
}

/// Offer the list menu, read one key and move the card.
///
/// Answers whether the card moved. An unmapped key, Enter, Escape, or the
/// card's own list leave it where it is.
pub(crate) fn move_by_key(
    repo: &mut dyn CardRepository,
    ctx: &BoardContext,
    io: &mut dyn Interaction,
    card: &mut Card,
) -> Result<Reply<bool>> {
    let keys = move_keys(ctx.lists());
    let menu: Vec<String> = keys
        .iter()
        .map(|(key, list)| format!("[{}] {}", key.to_string().bold(), list.name))
        .collect();
    io.print(&menu.join("  "));

    let key = match io.read_key("move to > ") {
        Reply::Answer(key) => key,
        Reply::Cancelled => return Ok(Reply::Cancelled),
    };
    let destination = key.and_then(|key| {
        let key = key.to_ascii_lowercase();
        keys.iter().find(|(k, _)| *k == key).map(|(_, list)| *list)
    });
    let Some(destination) = destination else {
        io.print("Skipping");
        return Ok(Reply::Answer(false));
    };
    if destination.id == card.list_id {
        io.print(&format!("Already in {}", destination.name));
        return Ok(Reply::Answer(false));
    }

    repo.move_card(&card.id, &destination.id)?;
    card.list_id = destination.id.clone();
    info!(card = %card.id, list = %destination.name, "moved card");
    io.print(&format!("Moved to {}", destination.name.green()));
    Ok(Reply::Answer(true))
}

/// Toggle one tag by name and send the new tag set.
///
/// Returns whether a change was made. Unknown names are reported with the
/// closest candidates and change nothing.
pub(crate) fn toggle_tag(
    repo: &mut dyn CardRepository,
    ctx: &BoardContext,
    io: &mut dyn Interaction,
    card: &mut Card,
    name: &str,
) -> Result<bool> {
    let tag = match ctx.resolve_tag(name) {
        Ok(tag) => tag,
        Err(_) => {
            let candidates = ctx.tag_index().complete(name);
            let hint = if candidates.is_empty() {
                ctx.tag_index().names().collect::<Vec<_>>().join(", ")
            } else {
                candidates.join(", ")
            };
            io.print(&format!(
                "{} '{}'. Tags: {}",
                "Unknown tag".yellow(),
                name.trim(),
                hint
            ));
            return Ok(false);
        }
    };

    let adding = !card.has_tag(&tag);
    let update = CardUpdate::new().with_tags(card.toggled_tags(&tag));
    repo.update_card(&card.id, &update)?;
    update.apply_to(card);

    let tag_name = ctx.tag_name(&tag);
    info!(card = %card.id, tag = tag_name, adding, "toggled tag");
    io.print(&if adding {
        format!("Added tag {}", tag_name.green())
    } else {
        format!("Removed tag {}", tag_name.red())
    });
    Ok(true)
}

/// Attach every title link not already attached and strip links from the title
pub(crate) fn attach_title_links(repo: &mut dyn CardRepository, card: &mut Card) -> Result<()> {
    let links = extract_links(&card.title);
    for url in &links.urls {
        if card.attachments.contains(url) {
            continue;
        }
        repo.attach_url(&card.id, url)?;
        card.attachments.insert(url.clone());
        info!(card = %card.id, url = %url, "attached link");
    }
    if links.remaining_title != card.title {
        let update = CardUpdate::new().with_title(links.remaining_title);
        repo.update_card(&card.id, &update)?;
        update.apply_to(card);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_move_keys_home_row_first() {
        let lists: Vec<List> = (0..14)
            .map(|i| List::new(format!("l{i}"), format!("List {i}"), "b1", i as f64))
            .collect();
        let keys: String = move_keys(&lists).iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, "asdfghjkl;'bce");
    }

    #[test]
    fn test_move_keys_fewer_lists_than_keys() {
        let lists = vec![List::new("l1", "Inbox", "b1", 1.0)];
        let keys = move_keys(&lists);
        assert_eq!(keys.len(), 1);
        assert_eq!(keys[0].0, 'a');
    }
}
