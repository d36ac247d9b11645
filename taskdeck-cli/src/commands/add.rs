//! `add card`

use super::session::review;
use super::Workspace;
use crate::cli::AddKind;
use crate::config::Overrides;
use colored::Colorize;
use taskdeck_cards::session::{ExternalEditor, TextEditor};
use taskdeck_cards::types::List;
use taskdeck_cards::{CardRepository, DeckError, Result};
use tracing::info;

/// Placeholder shown in the editor when no title was given
const EDITOR_TEMPLATE: &str = "\n# First line is the title, the rest becomes the description.\n# Lines starting with '#' are ignored.\n";

pub(super) fn run_add(what: AddKind, overrides: &Overrides) -> Result<()> {
    let AddKind::Card {
        title,
        message,
        list,
        edit,
    } = what;

    let mut ws = Workspace::connect(overrides)?;
    let target = target_list(&ws, list.as_deref())?;

    let (title, description) = match title.filter(|t| !t.trim().is_empty()) {
        Some(title) => (title.trim().to_string(), message),
        None => {
            let text = ExternalEditor::from_env().edit(EDITOR_TEMPLATE)?;
            let (title, body) = parse_new_card(&text)?;
            (title, message.or(body))
        }
    };

    let card = ws
        .repo
        .create_card(&target.id, &title, description.as_deref())?;
    info!(card = %card.id, list = %target.name, "created card");

    if edit {
        return review(&mut ws, vec![card]);
    }
    println!("Added \"{}\" to {}", card.title.green(), target.name);
    Ok(())
}

/// `--list`, else the configured inbox list, else the first list on the board
fn target_list(ws: &Workspace, requested: Option<&str>) -> Result<List> {
    match requested.or(ws.settings.inbox_list.as_deref()) {
        Some(name) => Ok(ws.ctx.resolve_list(name)?.clone()),
        None => ws
            .ctx
            .lists()
            .first()
            .cloned()
            .ok_or_else(|| DeckError::not_found("list", format!("any open list on {}", ws.ctx.board.name))),
    }
}

/// Split editor output into a title and an optional description
fn parse_new_card(text: &str) -> Result<(String, Option<String>)> {
    let mut lines = text.lines().filter(|line| !line.trim_start().starts_with('#'));
    let title = lines
        .by_ref()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .ok_or_else(|| DeckError::validation("title", "no title entered for the new card"))?
        .to_string();
    let body = lines.collect::<Vec<_>>().join("\n").trim().to_string();
    Ok((title, (!body.is_empty()).then_some(body)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_title_only() {
        let (title, body) = parse_new_card("  Buy milk  \n").unwrap();
        assert_eq!(title, "Buy milk");
        assert_eq!(body, None);
    }

    #[test]
    fn test_parse_title_and_description() {
        let text = format!("Fix the sink\nwasher is worn\n\ncall Bob{EDITOR_TEMPLATE}");
        let (title, body) = parse_new_card(&text).unwrap();
        assert_eq!(title, "Fix the sink");
        assert_eq!(body.as_deref(), Some("washer is worn\n\ncall Bob"));
    }

    #[test]
    fn test_parse_untouched_template_is_rejected() {
        let err = parse_new_card(EDITOR_TEMPLATE).unwrap_err();
        assert!(matches!(err, DeckError::Validation { .. }));
        assert_eq!(err.exit_code(), 2);
    }
}
