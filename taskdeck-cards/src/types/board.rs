//! Board-level types: Board, List, Tag

use super::ids::{BoardId, ListId, TagId};
use serde::{Deserialize, Serialize};

/// The top-level container of lists and tags
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    pub id: BoardId,
    pub name: String,
    #[serde(default)]
    pub url: String,
}

impl Board {
    pub fn new(id: impl Into<BoardId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            url: String::new(),
        }
    }
}

/// A named column on a board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct List {
    pub id: ListId,
    pub name: String,
    pub board_id: BoardId,
    /// Ordinal position on the board, lowest first
    pub position: f64,
    #[serde(default)]
    pub closed: bool,
}

impl List {
    pub fn new(
        id: impl Into<ListId>,
        name: impl Into<String>,
        board_id: impl Into<BoardId>,
        position: f64,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            board_id: board_id.into(),
            position,
            closed: false,
        }
    }
}

/// A label that can be applied to many cards
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: TagId,
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
    pub board_id: BoardId,
}

impl Tag {
    pub fn new(id: impl Into<TagId>, name: impl Into<String>, board_id: impl Into<BoardId>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            color: None,
            board_id: board_id.into(),
        }
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }
}
