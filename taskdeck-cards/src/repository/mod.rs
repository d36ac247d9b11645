//! The remote card store.
//!
//! Everything the engine needs from the board service goes through
//! [`CardRepository`]. Calls block the calling thread; there is one writer per
//! session and no optimistic-concurrency check against outside edits.

mod trello;

#[cfg(any(test, feature = "test-support"))]
mod memory;

pub use trello::{TrelloClient, TrelloCredentials, DEFAULT_API_URL};

#[cfg(any(test, feature = "test-support"))]
pub use memory::{InjectedFailure, MemoryRepository, Mutation};

use crate::error::Result;
use crate::types::{Board, BoardId, Card, CardId, CardUpdate, List, ListId, Tag};

/// Operations the engine consumes from the board service.
///
/// Each call may fail with a network, authentication, or not-found error.
pub trait CardRepository {
    /// Boards the credentials can see
    fn list_boards(&self) -> Result<Vec<Board>>;

    /// Find a board by name (case-insensitive)
    fn find_board(&self, name: &str) -> Result<Board> {
        let boards = self.list_boards()?;
        let index = crate::lookup::NameIndex::new(boards.into_iter().map(|b| (b.name.clone(), b)));
        index
            .get(name)
            .cloned()
            .ok_or_else(|| crate::error::DeckError::not_found("board", name))
    }

    /// Open lists of a board in board order
    fn list_lists(&self, board: &BoardId) -> Result<Vec<List>>;

    /// Tags defined on a board
    fn list_tags(&self, board: &BoardId) -> Result<Vec<Tag>>;

    /// Open and archived cards of a board, optionally scoped to one list
    fn fetch_cards(&self, board: &BoardId, list: Option<&ListId>) -> Result<Vec<Card>>;

    fn create_card(&mut self, list: &ListId, title: &str, description: Option<&str>) -> Result<Card>;

    fn update_card(&mut self, id: &CardId, update: &CardUpdate) -> Result<Card>;

    fn move_card(&mut self, id: &CardId, destination: &ListId) -> Result<Card>;

    /// Attach a web link to a card
    fn attach_url(&mut self, id: &CardId, url: &str) -> Result<()>;

    /// Post a comment on a card
    fn add_comment(&mut self, id: &CardId, text: &str) -> Result<()>;

    /// Flip the card to archived; the record persists
    fn archive_card(&mut self, id: &CardId) -> Result<()>;

    /// Remove the card permanently
    fn delete_card(&mut self, id: &CardId) -> Result<()>;

    /// Archive a list. Lists are never deleted.
    fn archive_list(&mut self, id: &ListId) -> Result<()>;
}
