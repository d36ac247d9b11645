//! Core types for the card engine

mod board;
mod card;
mod ids;

// Re-export all types
pub use board::{Board, List, Tag};
pub use card::{Card, CardStatus, CardUpdate};
pub use ids::{BoardId, CardId, ListId, TagId};
