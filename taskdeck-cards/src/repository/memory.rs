//! In-memory repository for tests.
//!
//! Keeps every board, list, tag and card in plain vectors and records each
//! mutation call so tests can assert exactly what a session did.

use super::CardRepository;
use crate::error::{DeckError, Result};
use crate::types::{Board, BoardId, Card, CardId, CardStatus, CardUpdate, List, ListId, Tag};
use chrono::Utc;
use std::collections::HashMap;

/// One mutation call made against the repository
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    Create { list: ListId, title: String },
    Update { card: CardId, update: CardUpdate },
    Move { card: CardId, list: ListId },
    Attach { card: CardId, url: String },
    Comment { card: CardId, text: String },
    Archive(CardId),
    Delete(CardId),
    ArchiveList(ListId),
}

impl Mutation {
    /// The card this mutation targets, if it targets one
    pub fn card(&self) -> Option<&CardId> {
        match self {
            Self::Update { card, .. }
            | Self::Move { card, .. }
            | Self::Attach { card, .. }
            | Self::Comment { card, .. } => Some(card),
            Self::Archive(card) | Self::Delete(card) => Some(card),
            Self::Create { .. } | Self::ArchiveList(_) => None,
        }
    }
}

/// How a mutation on a particular card should fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InjectedFailure {
    Network,
    Auth,
}

/// A [`CardRepository`] held entirely in memory
#[derive(Debug, Default)]
pub struct MemoryRepository {
    boards: Vec<Board>,
    lists: Vec<List>,
    tags: Vec<Tag>,
    cards: Vec<Card>,
    mutations: Vec<Mutation>,
    failures: HashMap<CardId, InjectedFailure>,
    next_id: usize,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_board(mut self, board: Board) -> Self {
        self.boards.push(board);
        self
    }

    pub fn with_list(mut self, list: List) -> Self {
        self.lists.push(list);
        self
    }

    pub fn with_tag(mut self, tag: Tag) -> Self {
        self.tags.push(tag);
        self
    }

    pub fn with_card(mut self, card: Card) -> Self {
        self.cards.push(card);
        self
    }

    /// Make every mutation of `card` fail. The call is still recorded.
    pub fn with_failure(mut self, card: impl Into<CardId>, failure: InjectedFailure) -> Self {
        self.failures.insert(card.into(), failure);
        self
    }

    /// Every stored card, including archived ones
    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn card(&self, id: &str) -> Option<&Card> {
        self.cards.iter().find(|c| c.id.as_str() == id)
    }

    pub fn lists(&self) -> &[List] {
        &self.lists
    }

    /// Mutation calls in the order they were made
    pub fn mutations(&self) -> &[Mutation] {
        &self.mutations
    }

    pub fn mutation_count(&self) -> usize {
        self.mutations.len()
    }

    /// Record a call, then fail it if a failure was injected for the card
    fn record(&mut self, mutation: Mutation) -> Result<()> {
        let failure = mutation.card().and_then(|id| self.failures.get(id)).copied();
        self.mutations.push(mutation);
        match failure {
            Some(InjectedFailure::Network) => Err(DeckError::network("connection reset")),
            Some(InjectedFailure::Auth) => Err(DeckError::auth("token revoked")),
            None => Ok(()),
        }
    }

    fn card_mut(&mut self, id: &CardId) -> Result<&mut Card> {
        self.cards
            .iter_mut()
            .find(|c| &c.id == id)
            .ok_or_else(|| DeckError::not_found("card", id.as_str()))
    }
}

impl CardRepository for MemoryRepository {
    fn list_boards(&self) -> Result<Vec<Board>> {
        Ok(self.boards.clone())
    }

    fn list_lists(&self, board: &BoardId) -> Result<Vec<List>> {
        Ok(self
            .lists
            .iter()
            .filter(|l| &l.board_id == board && !l.closed)
            .cloned()
            .collect())
    }

    fn list_tags(&self, board: &BoardId) -> Result<Vec<Tag>> {
        Ok(self
            .tags
            .iter()
            .filter(|t| &t.board_id == board)
            .cloned()
            .collect())
    }

    fn fetch_cards(&self, board: &BoardId, list: Option<&ListId>) -> Result<Vec<Card>> {
        let on_board: Vec<&ListId> = self
            .lists
            .iter()
            .filter(|l| &l.board_id == board)
            .map(|l| &l.id)
            .collect();
        Ok(self
            .cards
            .iter()
            .filter(|c| on_board.contains(&&c.list_id))
            .filter(|c| list.is_none_or(|l| &c.list_id == l))
            .cloned()
            .collect())
    }

    fn create_card(&mut self, list: &ListId, title: &str, description: Option<&str>) -> Result<Card> {
        self.record(Mutation::Create {
            list: list.clone(),
            title: title.to_string(),
        })?;
        if !self.lists.iter().any(|l| &l.id == list) {
            return Err(DeckError::not_found("list", list.as_str()));
        }
        self.next_id += 1;
        let mut card = Card::new(format!("new-{}", self.next_id), title, list.clone());
        card.description = description.filter(|d| !d.is_empty()).map(String::from);
        self.cards.push(card.clone());
        Ok(card)
    }

    fn update_card(&mut self, id: &CardId, update: &CardUpdate) -> Result<Card> {
        self.record(Mutation::Update {
            card: id.clone(),
            update: update.clone(),
        })?;
        let card = self.card_mut(id)?;
        update.apply_to(card);
        card.last_activity = Utc::now();
        Ok(card.clone())
    }

    fn move_card(&mut self, id: &CardId, destination: &ListId) -> Result<Card> {
        self.record(Mutation::Move {
            card: id.clone(),
            list: destination.clone(),
        })?;
        if !self.lists.iter().any(|l| &l.id == destination) {
            return Err(DeckError::not_found("list", destination.as_str()));
        }
        let card = self.card_mut(id)?;
        card.list_id = destination.clone();
        Ok(card.clone())
    }

    fn attach_url(&mut self, id: &CardId, url: &str) -> Result<()> {
        self.record(Mutation::Attach {
            card: id.clone(),
            url: url.to_string(),
        })?;
        self.card_mut(id)?.attachments.insert(url.to_string());
        Ok(())
    }

    fn add_comment(&mut self, id: &CardId, text: &str) -> Result<()> {
        self.record(Mutation::Comment {
            card: id.clone(),
            text: text.to_string(),
        })?;
        self.card_mut(id)?;
        Ok(())
    }

    fn archive_card(&mut self, id: &CardId) -> Result<()> {
        self.record(Mutation::Archive(id.clone()))?;
        self.card_mut(id)?.status = CardStatus::Archived;
        Ok(())
    }

    fn delete_card(&mut self, id: &CardId) -> Result<()> {
        self.record(Mutation::Delete(id.clone()))?;
        let before = self.cards.len();
        self.cards.retain(|c| &c.id != id);
        if self.cards.len() == before {
            return Err(DeckError::not_found("card", id.as_str()));
        }
        Ok(())
    }

    fn archive_list(&mut self, id: &ListId) -> Result<()> {
        self.record(Mutation::ArchiveList(id.clone()))?;
        let list = self
            .lists
            .iter_mut()
            .find(|l| &l.id == id)
            .ok_or_else(|| DeckError::not_found("list", id.as_str()))?;
        list.closed = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo() -> MemoryRepository {
        MemoryRepository::new()
            .with_board(Board::new("b1", "Home"))
            .with_board(Board::new("b2", "Work"))
            .with_list(List::new("l1", "Inbox", "b1", 1.0))
            .with_list(List::new("l2", "Backlog", "b2", 1.0))
            .with_card(Card::new("c1", "home card", "l1"))
            .with_card(Card::new("c2", "work card", "l2"))
    }

    #[test]
    fn test_fetch_is_scoped_to_board() {
        let repo = repo();
        let cards = repo.fetch_cards(&BoardId::from("b1"), None).unwrap();
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].id, CardId::from("c1"));
    }

    #[test]
    fn test_mutations_are_recorded() {
        let mut repo = repo();
        repo.archive_card(&CardId::from("c1")).unwrap();
        repo.delete_card(&CardId::from("c2")).unwrap();
        assert_eq!(repo.mutation_count(), 2);
        assert_eq!(repo.card("c1").unwrap().status, CardStatus::Archived);
        assert!(repo.card("c2").is_none());
    }

    #[test]
    fn test_injected_failure() {
        let mut repo = repo().with_failure("c1", InjectedFailure::Network);
        assert!(matches!(
            repo.archive_card(&CardId::from("c1")),
            Err(DeckError::Network { .. })
        ));
        assert_eq!(repo.card("c1").unwrap().status, CardStatus::Open);
        assert_eq!(repo.mutation_count(), 1);
    }
}
