//! `batch`, `delete` and `review`: interactive walks over a working set.

use super::Workspace;
use crate::cli::{BatchKind, DeleteKind, FilterArgs};
use crate::config::Overrides;
use crate::terminal::TerminalInteraction;
use colored::Colorize;
use taskdeck_cards::session::{
    BatchAction, BatchSession, ExternalEditor, ReviewPrompts, ReviewSession,
};
use taskdeck_cards::{Card, CardFilter, CardRepository, DeckError, Interaction, Reply, Result};
use tracing::info;

pub(super) fn run_batch(kind: BatchKind, overrides: &Overrides) -> Result<()> {
    let (action, filter) = match kind {
        BatchKind::Tag { filter } => (BatchAction::Tag, filter.to_filter()),
        BatchKind::Move { filter } => (BatchAction::Move, filter.to_filter()),
        BatchKind::Due { filter } => (BatchAction::Due, filter.to_filter()),
        BatchKind::Attach { filter } => (BatchAction::Attach, filter.to_filter().with_title_link()),
    };
    run_batch_action(action, &filter, overrides)
}

pub(super) fn run_delete(what: DeleteKind, overrides: &Overrides) -> Result<()> {
    match what {
        DeleteKind::Cards {
            force,
            noninteractive,
            filter,
        } => run_batch_action(
            BatchAction::Delete {
                force,
                noninteractive,
            },
            &filter.to_filter(),
            overrides,
        ),
        DeleteKind::List {
            name,
            noninteractive,
        } => archive_list(&name, noninteractive, overrides),
    }
}

pub(super) fn run_review(filter: &FilterArgs, overrides: &Overrides) -> Result<()> {
    let compiled = filter.to_filter().compile()?;
    let mut ws = Workspace::connect(overrides)?;
    let cards = ws.select(&compiled, None)?;
    review(&mut ws, cards)
}

/// Open a review session on `cards`
pub(super) fn review(ws: &mut Workspace, cards: Vec<Card>) -> Result<()> {
    if cards.is_empty() {
        println!("No matching cards");
        return Ok(());
    }
    let mut io = TerminalInteraction::new();
    ws.banner(&io);
    let editor = ExternalEditor::from_env();
    let prompts = ReviewPrompts {
        title_links: ws.settings.prompt_title_links,
        untagged: ws.settings.prompt_untagged,
    };
    let report = ReviewSession::new(&mut ws.repo, &ws.ctx, &mut io, &editor)
        .with_prompts(prompts)
        .run(cards)?;
    info!(%report, "review finished");
    println!("{report}");
    Ok(())
}

fn run_batch_action(action: BatchAction, filter: &CardFilter, overrides: &Overrides) -> Result<()> {
    let compiled = filter.compile()?;
    let mut ws = Workspace::connect(overrides)?;
    let cards = ws.select(&compiled, None)?;
    if cards.is_empty() {
        println!("No matching cards");
        return Ok(());
    }

    let mut io = TerminalInteraction::new();
    ws.banner(&io);
    let report = BatchSession::new(&mut ws.repo, &ws.ctx, &mut io, action).run(cards)?;
    info!(?action, %report, "batch finished");
    println!("{report}");
    Ok(())
}

/// Archive a list by exact name, asking first unless `noninteractive`
fn archive_list(name: &str, noninteractive: bool, overrides: &Overrides) -> Result<()> {
    let mut ws = Workspace::connect(overrides)?;
    let list = ws
        .ctx
        .lists()
        .iter()
        .find(|list| list.name == name)
        .cloned()
        .ok_or_else(|| DeckError::not_found("list", name))?;

    if !noninteractive {
        let mut io = TerminalInteraction::new();
        let prompt = format!("Archive list \"{}\"?", list.name);
        if io.confirm(&prompt, false) != Reply::Answer(true) {
            println!("List left open");
            return Ok(());
        }
    }
    ws.repo.archive_list(&list.id)?;
    info!(list = %list.id, "archived list");
    println!("Archived list {}", list.name.green());
    Ok(())
}
