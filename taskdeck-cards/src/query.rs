//! Fetching, filtering, sorting and projecting cards.
//!
//! [`fetch`] is the only step that talks to the repository. Everything after
//! it works on the fetched snapshot and is deterministic for a given snapshot
//! and sort key.

use crate::context::BoardContext;
use crate::error::{DeckError, Result};
use crate::filter::CardPredicate;
use crate::repository::CardRepository;
use crate::types::{Card, CardStatus, ListId};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Sort order for query results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    /// Title, case-insensitive
    Name,
    /// Board order of the card's list
    List,
    /// Most recently active first
    Activity,
    /// Earliest due first; undated cards last
    Due,
}

impl FromStr for SortKey {
    type Err = DeckError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "name" => Ok(Self::Name),
            "list" => Ok(Self::List),
            "activity" => Ok(Self::Activity),
            "due" => Ok(Self::Due),
            other => Err(DeckError::validation(
                "sort key",
                format!("expected name, list, activity or due, got '{other}'"),
            )),
        }
    }
}

/// A displayable card field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Name,
    List,
    Tags,
    Desc,
    Due,
    Activity,
    Id,
    Url,
}

impl Field {
    /// Every field, in display order
    pub const ALL: [Field; 8] = [
        Field::Name,
        Field::List,
        Field::Tags,
        Field::Desc,
        Field::Due,
        Field::Activity,
        Field::Id,
        Field::Url,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::List => "list",
            Self::Tags => "tags",
            Self::Desc => "desc",
            Self::Due => "due",
            Self::Activity => "activity",
            Self::Id => "id",
            Self::Url => "url",
        }
    }

    fn value(self, card: &Card, ctx: &BoardContext) -> String {
        match self {
            Self::Name => card.title.clone(),
            Self::List => ctx.list_name(&card.list_id).to_string(),
            Self::Tags => ctx.tag_names_of(card).join(", "),
            Self::Desc => card.description_text().to_string(),
            Self::Due => card
                .due
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            Self::Activity => card.last_activity.format("%Y-%m-%d %H:%M").to_string(),
            Self::Id => card.id.to_string(),
            Self::Url => card.url.clone(),
        }
    }
}

impl FromStr for Field {
    type Err = DeckError;

    fn from_str(s: &str) -> Result<Self> {
        let key = s.trim().to_lowercase();
        Field::ALL
            .into_iter()
            .find(|f| f.as_str() == key)
            .ok_or_else(|| {
                DeckError::validation(
                    "field",
                    format!(
                        "unknown field '{key}', expected one of: {}",
                        Field::ALL.map(Field::as_str).join(", ")
                    ),
                )
            })
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A matched card and its projected display values
#[derive(Debug, Clone, PartialEq)]
pub struct QueryRow {
    pub card: Card,
    pub fields: Vec<(Field, String)>,
}

impl QueryRow {
    /// The projection as a JSON object, keys in field order
    pub fn to_json(&self) -> serde_json::Value {
        let map = self
            .fields
            .iter()
            .map(|(field, value)| (field.as_str().to_string(), serde_json::Value::from(value.as_str())))
            .collect::<serde_json::Map<_, _>>();
        serde_json::Value::Object(map)
    }
}

/// Fetch the working card set. Deleted cards never enter it.
pub fn fetch<R: CardRepository + ?Sized>(
    repo: &R,
    ctx: &BoardContext,
    list: Option<&ListId>,
) -> Result<Vec<Card>> {
    let cards: Vec<Card> = repo
        .fetch_cards(&ctx.board.id, list)?
        .into_iter()
        .filter(|c| c.status != CardStatus::Deleted)
        .collect();
    debug!(board = %ctx.board.name, count = cards.len(), "fetched cards");
    Ok(cards)
}

/// Filter and stably sort, keeping whole cards
pub fn select(
    ctx: &BoardContext,
    cards: &[Card],
    predicate: &CardPredicate,
    sort: Option<SortKey>,
) -> Vec<Card> {
    let mut matched: Vec<Card> = cards.iter().filter(|c| predicate.matches(c)).cloned().collect();
    if let Some(key) = sort {
        matched.sort_by(|a, b| compare(ctx, key, a, b));
    }
    matched
}

/// Filter, sort and project. An empty `fields` slice projects every field.
pub fn query(
    ctx: &BoardContext,
    cards: &[Card],
    predicate: &CardPredicate,
    sort: Option<SortKey>,
    fields: &[Field],
) -> Vec<QueryRow> {
    let fields = if fields.is_empty() {
        &Field::ALL[..]
    } else {
        fields
    };
    select(ctx, cards, predicate, sort)
        .into_iter()
        .map(|card| {
            let values = fields.iter().map(|f| (*f, f.value(&card, ctx))).collect();
            QueryRow {
                card,
                fields: values,
            }
        })
        .collect()
}

/// Number of matching cards
pub fn count(cards: &[Card], predicate: &CardPredicate) -> usize {
    cards.iter().filter(|c| predicate.matches(c)).count()
}

fn compare(ctx: &BoardContext, key: SortKey, a: &Card, b: &Card) -> Ordering {
    match key {
        SortKey::Name => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
        SortKey::List => list_position(ctx, a).total_cmp(&list_position(ctx, b)),
        SortKey::Activity => b.last_activity.cmp(&a.last_activity),
        SortKey::Due => match (a.due, b.due) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        },
    }
}

fn list_position(ctx: &BoardContext, card: &Card) -> f64 {
    ctx.lists()
        .iter()
        .find(|l| l.id == card.list_id)
        .map(|l| l.position)
        .unwrap_or(f64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::CardFilter;
    use crate::types::{Board, List, Tag};
    use chrono::{TimeZone, Utc};

    fn ctx() -> BoardContext {
        BoardContext::new(
            Board::new("b1", "Home"),
            vec![
                List::new("l1", "Inbox", "b1", 1.0),
                List::new("l2", "Doing", "b1", 2.0),
            ],
            vec![Tag::new("t1", "Food", "b1")],
        )
    }

    fn cards() -> Vec<Card> {
        let day = |d| Utc.with_ymd_and_hms(2024, 1, d, 0, 0, 0).unwrap();
        vec![
            Card::new("c1", "banana", "l2").with_last_activity(day(1)),
            Card::new("c2", "Apple", "l1")
                .with_due(day(20))
                .with_last_activity(day(3)),
            Card::new("c3", "cherry", "l2")
                .with_due(day(10))
                .with_tag("t1")
                .with_last_activity(day(2)),
            Card::new("c4", "date", "l1").with_last_activity(day(4)),
        ]
    }

    fn ids(cards: &[Card]) -> Vec<&str> {
        cards.iter().map(|c| c.id.as_str()).collect()
    }

    #[test]
    fn test_no_sort_keeps_fetch_order() {
        let all = select(&ctx(), &cards(), &CardPredicate::default(), None);
        assert_eq!(ids(&all), vec!["c1", "c2", "c3", "c4"]);
    }

    #[test]
    fn test_sort_keys() {
        let ctx = ctx();
        let cards = cards();
        let p = CardPredicate::default();
        assert_eq!(
            ids(&select(&ctx, &cards, &p, Some(SortKey::Name))),
            vec!["c2", "c1", "c3", "c4"]
        );
        // stable within a list
        assert_eq!(
            ids(&select(&ctx, &cards, &p, Some(SortKey::List))),
            vec!["c2", "c4", "c1", "c3"]
        );
        assert_eq!(
            ids(&select(&ctx, &cards, &p, Some(SortKey::Activity))),
            vec!["c4", "c2", "c3", "c1"]
        );
        assert_eq!(
            ids(&select(&ctx, &cards, &p, Some(SortKey::Due))),
            vec!["c3", "c2", "c1", "c4"]
        );
    }

    #[test]
    fn test_projection_in_requested_order() {
        let ctx = ctx();
        let p = CardFilter::new()
            .with_tag("food")
            .compile()
            .unwrap()
            .resolve(&ctx)
            .unwrap();
        let rows = query(&ctx, &cards(), &p, None, &[Field::Tags, Field::Name, Field::Due, Field::List]);
        assert_eq!(rows.len(), 1);
        assert_eq!(
            rows[0].fields,
            vec![
                (Field::Tags, "Food".to_string()),
                (Field::Name, "cherry".to_string()),
                (Field::Due, "2024-01-10".to_string()),
                (Field::List, "Doing".to_string()),
            ]
        );
        let json = rows[0].to_json();
        assert_eq!(json["name"], "cherry");
        assert_eq!(json["list"], "Doing");
    }

    #[test]
    fn test_default_projection_has_all_fields() {
        let rows = query(&ctx(), &cards(), &CardPredicate::default(), None, &[]);
        assert_eq!(rows[0].fields.len(), Field::ALL.len());
    }

    #[test]
    fn test_count_case_insensitive_grep() {
        let ctx = ctx();
        let cards = vec![
            Card::new("c1", "Team Meeting", "l1"),
            Card::new("c2", "standup", "l1"),
        ];
        let p = CardFilter::new()
            .with_title_pattern("MEETING")
            .case_insensitive(true)
            .compile()
            .unwrap()
            .resolve(&ctx)
            .unwrap();
        assert_eq!(count(&cards, &p), 1);
    }

    #[test]
    fn test_parse_fields_and_sort_keys() {
        assert_eq!(" Due".parse::<Field>().unwrap(), Field::Due);
        assert!("color".parse::<Field>().is_err());
        assert_eq!("Activity".parse::<SortKey>().unwrap(), SortKey::Activity);
        assert!("size".parse::<SortKey>().is_err());
    }
}
