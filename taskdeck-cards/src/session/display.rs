//! Compact text rendering of a single card for interactive sessions

use crate::context::BoardContext;
use crate::types::{Card, Tag};
use chrono::{DateTime, Duration, Utc};
use colored::{Color, Colorize};
use std::fmt::Write;

const LABEL_WIDTH: usize = 14;

/// Map a board label color onto a terminal color
fn terminal_color(tag: &Tag) -> Color {
    match tag.color.as_deref() {
        Some("red") => Color::Red,
        Some("yellow") | Some("orange") => Color::Yellow,
        Some("blue") => Color::Blue,
        Some("purple") | Some("pink") => Color::Magenta,
        Some("sky") => Color::Cyan,
        Some("black") => Color::White,
        _ => Color::Green,
    }
}

fn label(out: &mut String, name: &str, value: &str) {
    let _ = writeln!(out, "  {:<width$}{}", name.bold(), value, width = LABEL_WIDTH);
}

/// Human-readable span like `3d 4h`
fn span(delta: Duration) -> String {
    let minutes = delta.num_minutes().abs();
    let (days, hours, mins) = (minutes / 1440, (minutes % 1440) / 60, minutes % 60);
    if days > 0 {
        format!("{days}d {hours}h")
    } else if hours > 0 {
        format!("{hours}h {mins}m")
    } else {
        format!("{mins}m")
    }
}

/// Render a card as a short block of labelled lines
pub fn render_card(card: &Card, ctx: &BoardContext, now: DateTime<Utc>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} {}", "Card".bold(), card.id);
    label(&mut out, "Name:", &card.title);
    label(&mut out, "List:", ctx.list_name(&card.list_id));

    if !card.tag_ids.is_empty() {
        let tags: Vec<String> = card
            .tag_ids
            .iter()
            .map(|id| match ctx.tags().iter().find(|t| &t.id == id) {
                Some(tag) => tag.name.color(terminal_color(tag)).to_string(),
                None => id.to_string(),
            })
            .collect();
        label(&mut out, "Tags:", &tags.join(" "));
    }

    if let Some(due) = card.due {
        label(&mut out, "Due:", &due.format("%Y-%m-%d").to_string());
        let remaining = due - now;
        let text = if remaining < Duration::zero() {
            format!("overdue by {}", span(remaining)).red()
        } else if remaining < Duration::weeks(2) {
            span(remaining).yellow()
        } else {
            span(remaining).green()
        };
        label(&mut out, "Remaining:", &text.to_string());
    }

    if !card.attachments.is_empty() {
        label(&mut out, "Attachments:", "");
        for url in &card.attachments {
            let _ = writeln!(out, "    {url}");
        }
    }

    if let Some(desc) = &card.description {
        label(&mut out, "Description:", "");
        for line in desc.lines() {
            let _ = writeln!(out, "    {line}");
        }
    }
    out
}
