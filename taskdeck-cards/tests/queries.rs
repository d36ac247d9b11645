//! Query engine tests against the in-memory repository

use chrono::{TimeZone, Utc};
use taskdeck_cards::query::{self, Field, SortKey};
use taskdeck_cards::repository::CardRepository;
use taskdeck_cards::test_support::sample_repository;
use taskdeck_cards::types::ListId;
use taskdeck_cards::{BoardContext, Card, CardFilter, CardStatus, DeckError, StatusFilter};

fn predicate(
    ctx: &BoardContext,
    filter: CardFilter,
) -> taskdeck_cards::Result<taskdeck_cards::CardPredicate> {
    filter.compile()?.resolve(ctx)
}

#[test]
fn test_no_tags_returns_only_untagged() {
    let repo = sample_repository()
        .with_card(Card::new("a", "A", "inbox"))
        .with_card(Card::new("b", "B", "inbox").with_tag("food"));
    let ctx = BoardContext::load(&repo, "Home").unwrap();
    let cards = query::fetch(&repo, &ctx, None).unwrap();

    let p = predicate(&ctx, CardFilter::new().without_tags()).unwrap();
    let rows = query::query(&ctx, &cards, &p, None, &[Field::Name]);
    let names: Vec<&str> = rows.iter().map(|r| r.fields[0].1.as_str()).collect();
    assert_eq!(names, vec!["A"]);
}

#[test]
fn test_grep_count_case_insensitive() {
    let repo = sample_repository()
        .with_card(Card::new("c1", "Team Meeting", "inbox"))
        .with_card(Card::new("c2", "standup", "doing"));
    let ctx = BoardContext::load(&repo, "home").unwrap();
    let cards = query::fetch(&repo, &ctx, None).unwrap();

    let p = predicate(
        &ctx,
        CardFilter::new()
            .with_title_pattern("MEETING")
            .case_insensitive(true),
    )
    .unwrap();
    assert_eq!(query::count(&cards, &p), 1);
}

#[test]
fn test_grep_patterns_are_alternatives() {
    let repo = sample_repository()
        .with_card(Card::new("c1", "alpha", "inbox"))
        .with_card(Card::new("c2", "beta", "inbox"))
        .with_card(Card::new("c3", "gamma", "inbox"));
    let ctx = BoardContext::load(&repo, "Home").unwrap();
    let cards = query::fetch(&repo, &ctx, None).unwrap();

    let p = predicate(
        &ctx,
        CardFilter::new()
            .with_title_pattern("^al")
            .with_title_pattern("ta$"),
    )
    .unwrap();
    assert_eq!(query::count(&cards, &p), 2);
}

#[test]
fn test_archived_cards_need_explicit_status() {
    let repo = sample_repository()
        .with_card(Card::new("c1", "open", "inbox"))
        .with_card(Card::new("c2", "archived", "inbox").with_status(CardStatus::Archived));
    let ctx = BoardContext::load(&repo, "Home").unwrap();
    let cards = query::fetch(&repo, &ctx, None).unwrap();

    let default = predicate(&ctx, CardFilter::new()).unwrap();
    assert_eq!(query::count(&cards, &default), 1);

    let all = predicate(&ctx, CardFilter::new().with_status(StatusFilter::All)).unwrap();
    assert_eq!(query::count(&cards, &all), 2);

    let closed = predicate(&ctx, CardFilter::new().with_status(StatusFilter::Closed)).unwrap();
    let matched = query::select(&ctx, &cards, &closed, None);
    assert_eq!(matched.len(), 1);
    assert_eq!(matched[0].title, "archived");
}

#[test]
fn test_archived_list_leaves_default_working_set() {
    let mut repo = sample_repository()
        .with_card(Card::new("c1", "in done", "done"))
        .with_card(Card::new("c2", "in inbox", "inbox"));
    repo.archive_list(&ListId::from("done")).unwrap();
    let ctx = BoardContext::load(&repo, "Home").unwrap();
    let cards = query::fetch(&repo, &ctx, None).unwrap();

    let default = predicate(&ctx, CardFilter::new()).unwrap();
    let rows = query::query(&ctx, &cards, &default, None, &[Field::Name, Field::List]);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].fields[1].1, "Inbox");

    let all = predicate(&ctx, CardFilter::new().with_status(StatusFilter::All)).unwrap();
    assert_eq!(query::count(&cards, &all), 2);
}

#[test]
fn test_list_scoped_fetch_and_sort() {
    let day = |d| Utc.with_ymd_and_hms(2024, 3, d, 0, 0, 0).unwrap();
    let repo = sample_repository()
        .with_card(Card::new("c1", "later", "doing").with_due(day(20)))
        .with_card(Card::new("c2", "someday", "doing"))
        .with_card(Card::new("c3", "soon", "doing").with_due(day(5)))
        .with_card(Card::new("c4", "elsewhere", "inbox").with_due(day(1)));
    let ctx = BoardContext::load(&repo, "Home").unwrap();

    let p = predicate(&ctx, CardFilter::new().with_list("doing")).unwrap();
    let cards = query::fetch(&repo, &ctx, p.list()).unwrap();
    assert_eq!(cards.len(), 3);

    let sorted = query::select(&ctx, &cards, &p, Some(SortKey::Due));
    let titles: Vec<&str> = sorted.iter().map(|c| c.title.as_str()).collect();
    assert_eq!(titles, vec!["soon", "later", "someday"]);
}

#[test]
fn test_unknown_names_fail_after_board_load() {
    let repo = sample_repository();
    let ctx = BoardContext::load(&repo, "Home").unwrap();

    let err = predicate(&ctx, CardFilter::new().with_tag("Garden")).unwrap_err();
    assert!(matches!(err, DeckError::NotFound { .. }));
    assert_eq!(err.exit_code(), 5);

    // "o" appears in Inbox, Doing and Done
    let err = predicate(&ctx, CardFilter::new().with_list("o")).unwrap_err();
    assert!(matches!(err, DeckError::Validation { .. }));

    assert!(matches!(
        BoardContext::load(&repo, "Work"),
        Err(DeckError::NotFound { .. })
    ));
}

#[test]
fn test_invalid_regex_needs_no_board() {
    let err = CardFilter::new()
        .with_title_pattern("[unclosed")
        .compile()
        .unwrap_err();
    assert_eq!(err.exit_code(), 2);
}
