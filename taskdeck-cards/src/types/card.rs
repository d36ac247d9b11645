//! Card types: Card, CardStatus, CardUpdate

use super::ids::{CardId, ListId, TagId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Lifecycle state of a card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardStatus {
    Open,
    Archived,
    Deleted,
}

/// A task card on the board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Every card sits in exactly one list
    pub list_id: ListId,
    #[serde(default)]
    pub tag_ids: BTreeSet<TagId>,
    #[serde(default)]
    pub due: Option<DateTime<Utc>>,
    #[serde(default)]
    pub attachments: BTreeSet<String>,
    pub status: CardStatus,
    pub last_activity: DateTime<Utc>,
    #[serde(default)]
    pub url: String,
}

impl Card {
    /// Create an open card with no tags, due date, or attachments
    pub fn new(id: impl Into<CardId>, title: impl Into<String>, list_id: impl Into<ListId>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: None,
            list_id: list_id.into(),
            tag_ids: BTreeSet::new(),
            due: None,
            attachments: BTreeSet::new(),
            status: CardStatus::Open,
            last_activity: Utc::now(),
            url: String::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_tag(mut self, tag: impl Into<TagId>) -> Self {
        self.tag_ids.insert(tag.into());
        self
    }

    pub fn with_due(mut self, due: DateTime<Utc>) -> Self {
        self.due = Some(due);
        self
    }

    pub fn with_attachment(mut self, url: impl Into<String>) -> Self {
        self.attachments.insert(url.into());
        self
    }

    pub fn with_status(mut self, status: CardStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_last_activity(mut self, at: DateTime<Utc>) -> Self {
        self.last_activity = at;
        self
    }

    pub fn has_tag(&self, tag: &TagId) -> bool {
        self.tag_ids.contains(tag)
    }

    /// The tag set this card would have after toggling `tag`
    pub fn toggled_tags(&self, tag: &TagId) -> BTreeSet<TagId> {
        let mut tags = self.tag_ids.clone();
        if !tags.remove(tag) {
            tags.insert(tag.clone());
        }
        tags
    }

    /// Description text, empty when unset
    pub fn description_text(&self) -> &str {
        self.description.as_deref().unwrap_or("")
    }
}

/// A partial update to a card. Unset fields are left alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CardUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    /// `Some(None)` clears the due date
    pub due: Option<Option<DateTime<Utc>>>,
    pub tag_ids: Option<BTreeSet<TagId>>,
    pub status: Option<CardStatus>,
}

impl CardUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_due(mut self, due: Option<DateTime<Utc>>) -> Self {
        self.due = Some(due);
        self
    }

    pub fn with_tags(mut self, tags: BTreeSet<TagId>) -> Self {
        self.tag_ids = Some(tags);
        self
    }

    pub fn with_status(mut self, status: CardStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Apply this update to a local copy of the card
    pub fn apply_to(&self, card: &mut Card) {
        if let Some(title) = &self.title {
            card.title = title.clone();
        }
        if let Some(description) = &self.description {
            card.description = if description.is_empty() {
                None
            } else {
                Some(description.clone())
            };
        }
        if let Some(due) = self.due {
            card.due = due;
        }
        if let Some(tags) = &self.tag_ids {
            card.tag_ids = tags.clone();
        }
        if let Some(status) = self.status {
            card.status = status;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_card_creation() {
        let card = Card::new("c1", "Write report", "l1");
        assert_eq!(card.title, "Write report");
        assert_eq!(card.status, CardStatus::Open);
        assert!(card.tag_ids.is_empty());
        assert!(card.due.is_none());
        assert_eq!(card.description_text(), "");
    }

    #[test]
    fn test_toggle_twice_restores_tags() {
        let card = Card::new("c1", "Buy milk", "l1").with_tag("food");
        let food = TagId::from("food");
        let errand = TagId::from("errand");

        let removed = card.toggled_tags(&food);
        assert!(!removed.contains(&food));

        let added = card.toggled_tags(&errand);
        assert!(added.contains(&errand) && added.contains(&food));

        let mut twice = card.clone();
        twice.tag_ids = twice.toggled_tags(&errand);
        twice.tag_ids = twice.toggled_tags(&errand);
        assert_eq!(twice.tag_ids, card.tag_ids);
    }

    #[test]
    fn test_update_applies_only_set_fields() {
        let mut card = Card::new("c1", "Old", "l1").with_description("keep me");
        CardUpdate::new().with_title("New").apply_to(&mut card);
        assert_eq!(card.title, "New");
        assert_eq!(card.description.as_deref(), Some("keep me"));
    }

    #[test]
    fn test_update_clears_due_and_empty_description() {
        let mut card = Card::new("c1", "Task", "l1")
            .with_description("text")
            .with_due(Utc::now());
        CardUpdate::new()
            .with_due(None)
            .with_description("")
            .apply_to(&mut card);
        assert!(card.due.is_none());
        assert!(card.description.is_none());
    }

    #[test]
    fn test_status_serializes_lowercase() {
        let json = serde_json::to_string(&CardStatus::Archived).unwrap();
        assert_eq!(json, "\"archived\"");
    }
}
