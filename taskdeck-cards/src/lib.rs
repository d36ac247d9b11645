//! Query and review task cards on a remote kanban board.
//!
//! This crate holds everything that is not terminal plumbing:
//!
//! - **Types**: boards, lists, tags and cards ([`types`]).
//! - **Filters**: [`CardFilter`] compiles to a [`CardPredicate`] in two steps,
//!   so invalid regexes are rejected before any network call ([`filter`]).
//! - **Queries**: fetch once, then filter, sort and project locally ([`query`]).
//! - **Repository**: the [`CardRepository`] trait and a blocking Trello client.
//! - **Sessions**: batch actions and the review prompt, driven through the
//!   [`session::Interaction`] trait ([`session`]).
//!
//! All calls are synchronous. A command loads one [`BoardContext`], fetches
//! one snapshot of cards and works on that.

pub mod context;
pub mod dates;
pub mod error;
pub mod filter;
pub mod links;
pub mod lookup;
pub mod query;
pub mod repository;
pub mod session;
pub mod types;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use context::BoardContext;
pub use error::{DeckError, Result};
pub use filter::{CardFilter, CardPredicate, CompiledFilter, DueFilter, StatusFilter, TagFilter};
pub use query::{Field, QueryRow, SortKey};
pub use repository::{CardRepository, TrelloClient, TrelloCredentials};
pub use session::{Interaction, Reply, SessionReport};
pub use types::{Board, Card, CardStatus, CardUpdate, List, Tag};
