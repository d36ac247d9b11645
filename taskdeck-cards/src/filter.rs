//! Card filters and the predicate they compile to.
//!
//! A [`CardFilter`] is what the user asked for, by name. Turning it into a
//! [`CardPredicate`] takes two steps:
//!
//! 1. [`CardFilter::compile`] checks the regexes and the mutually exclusive
//!    options. It needs nothing but the filter, so bad input fails before any
//!    network call.
//! 2. [`CompiledFilter::resolve`] maps list and tag names to ids using a
//!    loaded [`BoardContext`].
//!
//! The predicate is the conjunction of every clause that was set. Unset
//! clauses always pass.
//!
//! ```
//! use taskdeck_cards::{BoardContext, Card, CardFilter};
//! use taskdeck_cards::types::{Board, List};
//!
//! let ctx = BoardContext::new(Board::new("b1", "Home"), vec![List::new("l1", "Inbox", "b1", 1.0)], vec![]);
//! let predicate = CardFilter::new()
//!     .with_title_pattern("meeting")
//!     .case_insensitive(true)
//!     .compile()
//!     .and_then(|compiled| compiled.resolve(&ctx))
//!     .unwrap();
//!
//! assert!(predicate.matches(&Card::new("c1", "Team Meeting", "l1")));
//! assert!(!predicate.matches(&Card::new("c2", "standup", "l1")));
//! ```

use crate::context::BoardContext;
use crate::error::{DeckError, Result};
use crate::links;
use crate::types::{Card, CardStatus, ListId, TagId};
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Which lifecycle states a query admits
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    /// Open cards in open lists
    #[default]
    Open,
    /// Archived cards only
    Closed,
    /// Open and archived cards
    All,
}

impl StatusFilter {
    /// Deleted cards are never admitted
    pub fn admits(self, status: CardStatus) -> bool {
        match (self, status) {
            (_, CardStatus::Deleted) => false,
            (Self::All, _) => true,
            (Self::Open, CardStatus::Open) => true,
            (Self::Closed, CardStatus::Archived) => true,
            _ => false,
        }
    }
}

impl FromStr for StatusFilter {
    type Err = DeckError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "open" => Ok(Self::Open),
            "closed" | "archived" => Ok(Self::Closed),
            "all" => Ok(Self::All),
            other => Err(DeckError::validation(
                "status",
                format!("expected open, closed or all, got '{other}'"),
            )),
        }
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Open => "open",
            Self::Closed => "closed",
            Self::All => "all",
        })
    }
}

/// Tag clause: named tags (any of them) or no tags at all
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagFilter {
    pub names: Vec<String>,
    pub none: bool,
}

/// Due-date clause: `has` and `none` are mutually exclusive
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DueFilter {
    pub has: bool,
    pub none: bool,
}

/// The filter options a command was given
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CardFilter {
    pub list: Option<String>,
    /// A card matches if any pattern matches its title
    pub title_patterns: Vec<String>,
    pub case_insensitive: bool,
    pub tags: TagFilter,
    pub due: DueFilter,
    pub status: StatusFilter,
    pub has_attachments: Option<bool>,
    /// Only cards whose title contains a web link
    pub title_has_link: bool,
}

impl CardFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_list(mut self, list: impl Into<String>) -> Self {
        self.list = Some(list.into());
        self
    }

    pub fn with_title_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.title_patterns.push(pattern.into());
        self
    }

    pub fn case_insensitive(mut self, yes: bool) -> Self {
        self.case_insensitive = yes;
        self
    }

    pub fn with_tag(mut self, name: impl Into<String>) -> Self {
        self.tags.names.push(name.into());
        self
    }

    pub fn without_tags(mut self) -> Self {
        self.tags.none = true;
        self
    }

    pub fn with_due(mut self) -> Self {
        self.due.has = true;
        self
    }

    pub fn without_due(mut self) -> Self {
        self.due.none = true;
        self
    }

    pub fn with_status(mut self, status: StatusFilter) -> Self {
        self.status = status;
        self
    }

    pub fn with_attachments(mut self, present: bool) -> Self {
        self.has_attachments = Some(present);
        self
    }

    pub fn with_title_link(mut self) -> Self {
        self.title_has_link = true;
        self
    }

    /// Validate regexes and exclusive options
    pub fn compile(&self) -> Result<CompiledFilter> {
        if self.tags.none && !self.tags.names.is_empty() {
            return Err(DeckError::validation(
                "tags",
                "--no-tags cannot be combined with named tags",
            ));
        }
        if self.due.has && self.due.none {
            return Err(DeckError::validation(
                "due",
                "--has-due and --no-due are mutually exclusive",
            ));
        }

        let title = self
            .title_patterns
            .iter()
            .map(|pattern| {
                RegexBuilder::new(pattern)
                    .case_insensitive(self.case_insensitive)
                    .build()
                    .map_err(|e| DeckError::validation("regex", format!("'{pattern}': {e}")))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(CompiledFilter {
            list: self.list.clone(),
            title,
            tags: self.tags.clone(),
            due: self.due,
            status: self.status,
            has_attachments: self.has_attachments,
            title_has_link: self.title_has_link,
        })
    }
}

/// A filter whose regexes are known to be valid
#[derive(Debug, Clone)]
pub struct CompiledFilter {
    list: Option<String>,
    title: Vec<Regex>,
    tags: TagFilter,
    due: DueFilter,
    status: StatusFilter,
    has_attachments: Option<bool>,
    title_has_link: bool,
}

impl CompiledFilter {
    /// The list name this filter is scoped to, if any
    pub fn list_name(&self) -> Option<&str> {
        self.list.as_deref()
    }

    /// Bind list and tag names to the board
    pub fn resolve(&self, ctx: &BoardContext) -> Result<CardPredicate> {
        let list = self
            .list
            .as_deref()
            .map(|name| ctx.resolve_list(name).map(|list| list.id.clone()))
            .transpose()?;

        let tags = if self.tags.none {
            TagClause::Untagged
        } else if self.tags.names.is_empty() {
            TagClause::Any
        } else {
            let ids = self
                .tags
                .names
                .iter()
                .map(|name| ctx.resolve_tag(name))
                .collect::<Result<BTreeSet<_>>>()?;
            TagClause::OneOf(ids)
        };

        let due = match (self.due.has, self.due.none) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        };

        // Cards left behind in an archived list are not open work
        let open_lists = (self.status == StatusFilter::Open)
            .then(|| ctx.lists().iter().map(|l| l.id.clone()).collect());

        Ok(CardPredicate {
            list,
            open_lists,
            title: self.title.clone(),
            tags,
            due,
            status: self.status,
            has_attachments: self.has_attachments,
            title_has_link: self.title_has_link,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum TagClause {
    Any,
    Untagged,
    OneOf(BTreeSet<TagId>),
}

/// A filter bound to a board, ready to test cards
#[derive(Debug, Clone)]
pub struct CardPredicate {
    list: Option<ListId>,
    open_lists: Option<BTreeSet<ListId>>,
    title: Vec<Regex>,
    tags: TagClause,
    due: Option<bool>,
    status: StatusFilter,
    has_attachments: Option<bool>,
    title_has_link: bool,
}

impl Default for CardPredicate {
    /// Admits every open card
    fn default() -> Self {
        Self {
            list: None,
            open_lists: None,
            title: Vec::new(),
            tags: TagClause::Any,
            due: None,
            status: StatusFilter::Open,
            has_attachments: None,
            title_has_link: false,
        }
    }
}

impl CardPredicate {
    /// The list the predicate is scoped to. Fetches can be narrowed to it.
    pub fn list(&self) -> Option<&ListId> {
        self.list.as_ref()
    }

    pub fn matches(&self, card: &Card) -> bool {
        self.status.admits(card.status)
            && self.list.as_ref().is_none_or(|list| &card.list_id == list)
            && self
                .open_lists
                .as_ref()
                .is_none_or(|lists| lists.contains(&card.list_id))
            && (self.title.is_empty() || self.title.iter().any(|re| re.is_match(&card.title)))
            && match &self.tags {
                TagClause::Any => true,
                TagClause::Untagged => card.tag_ids.is_empty(),
                TagClause::OneOf(ids) => !card.tag_ids.is_disjoint(ids),
            }
            && self.due.is_none_or(|has| card.due.is_some() == has)
            && self
                .has_attachments
                .is_none_or(|has| !card.attachments.is_empty() == has)
            && (!self.title_has_link || links::has_link(&card.title))
    }
}
