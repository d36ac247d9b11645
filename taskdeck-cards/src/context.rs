//! The resolved board a command works against.
//!
//! A [`BoardContext`] is loaded once per command and handed to the filter,
//! the query engine, and the sessions. It replaces any notion of a "current
//! board" living in process state.

use crate::error::{DeckError, Result};
use crate::lookup::{NameIndex, Resolved};
use crate::repository::CardRepository;
use crate::types::{Board, Card, List, ListId, Tag, TagId};
use std::collections::HashMap;
use tracing::debug;

/// A board together with its lists, tags and name lookups
#[derive(Debug, Clone)]
pub struct BoardContext {
    pub board: Board,
    lists: Vec<List>,
    tags: Vec<Tag>,
    list_index: NameIndex<ListId>,
    tag_index: NameIndex<TagId>,
    list_names: HashMap<ListId, String>,
    tag_names: HashMap<TagId, String>,
}

impl BoardContext {
    /// Build a context from already-fetched parts. Lists are kept in board
    /// order; closed lists are dropped.
    pub fn new(board: Board, lists: Vec<List>, tags: Vec<Tag>) -> Self {
        let mut lists: Vec<List> = lists.into_iter().filter(|l| !l.closed).collect();
        lists.sort_by(|a, b| a.position.total_cmp(&b.position));

        let list_index = NameIndex::new(lists.iter().map(|l| (l.name.clone(), l.id.clone())));
        let tag_index = NameIndex::new(tags.iter().map(|t| (t.name.clone(), t.id.clone())));
        let list_names = lists.iter().map(|l| (l.id.clone(), l.name.clone())).collect();
        let tag_names = tags.iter().map(|t| (t.id.clone(), t.name.clone())).collect();

        Self {
            board,
            lists,
            tags,
            list_index,
            tag_index,
            list_names,
            tag_names,
        }
    }

    /// Resolve the named board and fetch its lists and tags
    pub fn load<R: CardRepository + ?Sized>(repo: &R, board_name: &str) -> Result<Self> {
        let board = repo.find_board(board_name)?;
        let lists = repo.list_lists(&board.id)?;
        let tags = repo.list_tags(&board.id)?;
        debug!(
            board = %board.name,
            lists = lists.len(),
            tags = tags.len(),
            "loaded board context"
        );
        Ok(Self::new(board, lists, tags))
    }

    /// Open lists in board order
    pub fn lists(&self) -> &[List] {
        &self.lists
    }

    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    pub fn tag_index(&self) -> &NameIndex<TagId> {
        &self.tag_index
    }

    /// Display name of a list, or its id when the list is not on this board
    pub fn list_name<'a>(&'a self, id: &'a ListId) -> &'a str {
        self.list_names
            .get(id)
            .map(String::as_str)
            .unwrap_or_else(|| id.as_str())
    }

    pub fn tag_name<'a>(&'a self, id: &'a TagId) -> &'a str {
        self.tag_names
            .get(id)
            .map(String::as_str)
            .unwrap_or_else(|| id.as_str())
    }

    /// Tag names of a card, sorted for stable display
    pub fn tag_names_of<'a>(&'a self, card: &'a Card) -> Vec<&'a str> {
        let mut names: Vec<&str> = card.tag_ids.iter().map(|id| self.tag_name(id)).collect();
        names.sort_unstable_by_key(|n| n.to_lowercase());
        names
    }

    /// Resolve a list name: exact match first, then a unique partial match
    pub fn resolve_list(&self, name: &str) -> Result<&List> {
        let id = match self.list_index.resolve(name) {
            Resolved::Exact(id) | Resolved::Partial(id) => id,
            Resolved::Ambiguous(candidates) => {
                return Err(DeckError::validation(
                    "list",
                    format!("'{}' is ambiguous: {}", name, candidates.join(", ")),
                ))
            }
            Resolved::Missing => return Err(DeckError::not_found("list", name)),
        };
        self.lists
            .iter()
            .find(|l| &l.id == id)
            .ok_or_else(|| DeckError::not_found("list", name))
    }

    /// Resolve a tag name exactly (after normalization)
    pub fn resolve_tag(&self, name: &str) -> Result<TagId> {
        self.tag_index
            .get(name)
            .cloned()
            .ok_or_else(|| DeckError::not_found("tag", name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> BoardContext {
        let mut closed = List::new("l9", "Old Stuff", "b1", 0.5);
        closed.closed = true;
        BoardContext::new(
            Board::new("b1", "Home"),
            vec![
                List::new("l2", "Doing", "b1", 2.0),
                List::new("l1", "Inbox", "b1", 1.0),
                List::new("l3", "Done", "b1", 3.0),
                closed,
            ],
            vec![
                Tag::new("t1", "Food", "b1"),
                Tag::new("t2", "errand", "b1"),
            ],
        )
    }

    #[test]
    fn test_lists_in_board_order_without_closed() {
        let ctx = context();
        let names: Vec<_> = ctx.lists().iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["Inbox", "Doing", "Done"]);
    }

    #[test]
    fn test_resolve_list() {
        let ctx = context();
        assert_eq!(ctx.resolve_list("inbox").unwrap().id, ListId::from("l1"));
        assert_eq!(ctx.resolve_list("box").unwrap().id, ListId::from("l1"));
        // "Doing" and "Done" both contain "do" but "done" is exact
        assert_eq!(ctx.resolve_list("DONE").unwrap().id, ListId::from("l3"));
        assert!(matches!(
            ctx.resolve_list("o"),
            Err(DeckError::Validation { .. })
        ));
        assert!(matches!(
            ctx.resolve_list("Someday"),
            Err(DeckError::NotFound { .. })
        ));
    }

    #[test]
    fn test_resolve_tag_is_exact() {
        let ctx = context();
        assert_eq!(ctx.resolve_tag("food").unwrap(), TagId::from("t1"));
        assert!(matches!(
            ctx.resolve_tag("foo"),
            Err(DeckError::NotFound { .. })
        ));
    }

    #[test]
    fn test_tag_names_of_card() {
        let ctx = context();
        let card = Card::new("c1", "Shop", "l1").with_tag("t2").with_tag("t1");
        assert_eq!(ctx.tag_names_of(&card), vec!["errand", "Food"]);
        assert_eq!(ctx.list_name(&card.list_id), "Inbox");
    }
}
