//! `show` and `grep`: read-only listings.

use super::{load_settings, Workspace};
use crate::cli::{GrepArgs, OutputArgs, ShowKind};
use crate::config::Overrides;
use crate::render::{self, OutputFormat};
use taskdeck_cards::{
    query, CardFilter, CardRepository, CompiledFilter, DeckError, Field, Result, SortKey,
};
use tracing::debug;

/// Listings are most-recently-active first unless `--by` says otherwise
const DEFAULT_SORT: SortKey = SortKey::Activity;

pub(super) fn run_show(what: ShowKind, overrides: &Overrides) -> Result<()> {
    let width = render::terminal_width();
    match what {
        ShowKind::Cards { filter, output } => {
            let compiled = filter.to_filter().compile()?;
            print_cards(&compiled, &output, overrides)
        }
        ShowKind::Soon { json, tsv } => {
            let compiled = CardFilter::new().with_due().compile()?;
            let output = OutputArgs {
                by: Some(SortKey::Due),
                json,
                tsv,
                ..OutputArgs::default()
            };
            print_cards(&compiled, &output, overrides)
        }
        ShowKind::Lists { json } => {
            let ws = Workspace::connect(overrides)?;
            println!("{}", render::lists(ws.ctx.lists(), json, width)?);
            Ok(())
        }
        ShowKind::Tags { json } => {
            let ws = Workspace::connect(overrides)?;
            println!("{}", render::tags(ws.ctx.tags(), json, width)?);
            Ok(())
        }
        ShowKind::Boards { json } => {
            let settings = load_settings(overrides)?;
            let boards = settings.client()?.list_boards()?;
            println!("{}", render::boards(&boards, json, width)?);
            Ok(())
        }
    }
}

pub(super) fn run_grep(args: &GrepArgs, overrides: &Overrides) -> Result<()> {
    let patterns = args.patterns();
    if patterns.is_empty() {
        return Err(DeckError::validation(
            "pattern",
            "no pattern given; pass PATTERN or -e PATTERN",
        ));
    }
    let compiled = patterns
        .into_iter()
        .fold(
            CardFilter::new().case_insensitive(args.ignore_case),
            |filter, pattern| filter.with_title_pattern(pattern),
        )
        .compile()?;

    if args.count {
        let ws = Workspace::connect(overrides)?;
        let predicate = compiled.resolve(&ws.ctx)?;
        let cards = query::fetch(&ws.repo, &ws.ctx, predicate.list())?;
        println!("{}", query::count(&cards, &predicate));
        return Ok(());
    }
    print_cards(&compiled, &args.output, overrides)
}

fn print_cards(compiled: &CompiledFilter, output: &OutputArgs, overrides: &Overrides) -> Result<()> {
    let ws = Workspace::connect(overrides)?;
    let predicate = compiled.resolve(&ws.ctx)?;
    let cards = query::fetch(&ws.repo, &ws.ctx, predicate.list())?;

    let fields = dedup(&output.fields);
    let sort = output.by.unwrap_or(DEFAULT_SORT);
    let rows = query::query(&ws.ctx, &cards, &predicate, Some(sort), &fields);
    debug!(matched = rows.len(), fetched = cards.len(), "query done");

    let format = OutputFormat::from_flags(output.json, output.tsv);
    println!("{}", render::cards(&rows, &fields, format, render::terminal_width())?);
    Ok(())
}

fn dedup(fields: &[Field]) -> Vec<Field> {
    let mut unique = Vec::with_capacity(fields.len());
    for field in fields {
        if !unique.contains(field) {
            unique.push(*field);
        }
    }
    unique
}
