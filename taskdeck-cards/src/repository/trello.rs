//! Blocking client for the Trello REST API.

use super::CardRepository;
use crate::error::{DeckError, Result};
use crate::types::{Board, BoardId, Card, CardId, CardStatus, CardUpdate, List, ListId, Tag};
use chrono::{DateTime, Utc};
use reqwest::blocking::{Client, Response};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::collections::BTreeSet;
use std::time::Duration;
use tracing::debug;

/// Default API root
pub const DEFAULT_API_URL: &str = "https://api.trello.com/1";

const CARD_FIELDS: &str = "name,desc,idList,idLabels,due,closed,dateLastActivity,shortUrl";

/// API key and token, sent as query parameters on every request. Card
/// content always travels in the JSON body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrelloCredentials {
    pub api_key: String,
    pub api_token: String,
}

impl TrelloCredentials {
    pub fn new(api_key: impl Into<String>, api_token: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_token: api_token.into(),
        }
    }
}

/// Extract a readable message from an error body.
///
/// Trello answers most errors with plain text; JSON bodies carry `message`.
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|json| json.get("message").and_then(|v| v.as_str()).map(String::from))
        .unwrap_or_else(|| body.trim().to_string())
}

/// Map a response to a `DeckError` based on status code
fn check_response(response: Response, resource: &str, name: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = error_message(&response.text().unwrap_or_default());
    match status.as_u16() {
        401 | 403 => Err(DeckError::auth(message)),
        404 => Err(DeckError::not_found(resource, name)),
        code => Err(DeckError::network(format!("HTTP {code}: {message}"))),
    }
}

#[derive(Debug, Deserialize)]
struct WireBoard {
    id: String,
    name: String,
    #[serde(default)]
    url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireList {
    id: String,
    name: String,
    id_board: String,
    #[serde(default)]
    pos: f64,
    #[serde(default)]
    closed: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireLabel {
    id: String,
    #[serde(default)]
    name: String,
    color: Option<String>,
    id_board: String,
}

#[derive(Debug, Deserialize)]
struct WireAttachment {
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireCard {
    id: String,
    name: String,
    #[serde(default)]
    desc: String,
    id_list: String,
    #[serde(default)]
    id_labels: Vec<String>,
    due: Option<DateTime<Utc>>,
    #[serde(default)]
    closed: bool,
    date_last_activity: DateTime<Utc>,
    #[serde(default)]
    short_url: String,
    #[serde(default)]
    attachments: Vec<WireAttachment>,
}

impl From<WireBoard> for Board {
    fn from(wire: WireBoard) -> Self {
        Board {
            id: BoardId::from(wire.id),
            name: wire.name,
            url: wire.url,
        }
    }
}

impl From<WireList> for List {
    fn from(wire: WireList) -> Self {
        List {
            id: ListId::from(wire.id),
            name: wire.name,
            board_id: BoardId::from(wire.id_board),
            position: wire.pos,
            closed: wire.closed,
        }
    }
}

impl From<WireLabel> for Tag {
    fn from(wire: WireLabel) -> Self {
        Tag {
            id: wire.id.into(),
            // Unnamed labels are shown by color
            name: if wire.name.is_empty() {
                wire.color.clone().unwrap_or_default()
            } else {
                wire.name
            },
            color: wire.color,
            board_id: wire.id_board.into(),
        }
    }
}

impl From<WireCard> for Card {
    fn from(wire: WireCard) -> Self {
        Card {
            id: wire.id.into(),
            title: wire.name,
            description: (!wire.desc.is_empty()).then_some(wire.desc),
            list_id: wire.id_list.into(),
            tag_ids: wire.id_labels.into_iter().map(Into::into).collect(),
            due: wire.due,
            attachments: wire
                .attachments
                .into_iter()
                .filter_map(|a| a.url)
                .collect::<BTreeSet<_>>(),
            status: if wire.closed {
                CardStatus::Archived
            } else {
                CardStatus::Open
            },
            last_activity: wire.date_last_activity,
            url: wire.short_url,
        }
    }
}

/// Card repository backed by the Trello API
pub struct TrelloClient {
    client: Client,
    api_url: String,
    credentials: TrelloCredentials,
}

impl std::fmt::Debug for TrelloClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrelloClient")
            .field("api_url", &self.api_url)
            .finish_non_exhaustive()
    }
}

impl TrelloClient {
    /// Create a client. Empty credentials are a configuration error.
    pub fn new(api_url: impl Into<String>, credentials: TrelloCredentials) -> Result<Self> {
        if credentials.api_key.trim().is_empty() || credentials.api_token.trim().is_empty() {
            return Err(DeckError::config(
                "api_key and api_token must both be set (TASKDECK_API_KEY / TASKDECK_API_TOKEN)",
            ));
        }
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("taskdeck/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            credentials,
        })
    }

    /// Build a request URL with credentials and encoded parameters
    fn url(&self, path: &str, params: &[(&str, &str)]) -> String {
        let mut url = format!(
            "{}{}?key={}&token={}",
            self.api_url,
            path,
            urlencoding::encode(&self.credentials.api_key),
            urlencoding::encode(&self.credentials.api_token)
        );
        for (key, value) in params {
            url.push_str(&format!("&{}={}", key, urlencoding::encode(value)));
        }
        url
    }

    fn send(
        &self,
        method: Method,
        path: &str,
        params: &[(&str, &str)],
        body: Option<&Value>,
        resource: &str,
        name: &str,
    ) -> Result<Response> {
        debug!(%method, path, "trello request");
        let mut request = self.client.request(method, self.url(path, params));
        if let Some(body) = body {
            request = request.json(body);
        }
        check_response(request.send()?, resource, name)
    }

    fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
        resource: &str,
        name: &str,
    ) -> Result<T> {
        Ok(self.send(Method::GET, path, params, None, resource, name)?.json()?)
    }

    fn put_card(&self, id: &CardId, body: Value) -> Result<Card> {
        let path = format!("/cards/{}", urlencoding::encode(id.as_str()));
        let wire: WireCard = self
            .send(Method::PUT, &path, &[], Some(&body), "card", id.as_str())?
            .json()?;
        Ok(wire.into())
    }
}

impl CardRepository for TrelloClient {
    fn list_boards(&self) -> Result<Vec<Board>> {
        let boards: Vec<WireBoard> = self.get(
            "/members/me/boards",
            &[("fields", "name,url"), ("filter", "open")],
            "member",
            "me",
        )?;
        Ok(boards.into_iter().map(Into::into).collect())
    }

    fn list_lists(&self, board: &BoardId) -> Result<Vec<List>> {
        let path = format!("/boards/{}/lists", urlencoding::encode(board.as_str()));
        let lists: Vec<WireList> = self.get(
            &path,
            &[("filter", "open"), ("fields", "name,idBoard,pos,closed")],
            "board",
            board.as_str(),
        )?;
        Ok(lists.into_iter().map(Into::into).collect())
    }

    fn list_tags(&self, board: &BoardId) -> Result<Vec<Tag>> {
        let path = format!("/boards/{}/labels", urlencoding::encode(board.as_str()));
        let labels: Vec<WireLabel> = self.get(
            &path,
            &[("fields", "name,color,idBoard"), ("limit", "1000")],
            "board",
            board.as_str(),
        )?;
        Ok(labels.into_iter().map(Into::into).collect())
    }

    fn fetch_cards(&self, board: &BoardId, list: Option<&ListId>) -> Result<Vec<Card>> {
        let (path, resource, name) = match list {
            Some(list) => (
                format!("/lists/{}/cards/all", urlencoding::encode(list.as_str())),
                "list",
                list.as_str(),
            ),
            None => (
                format!("/boards/{}/cards/all", urlencoding::encode(board.as_str())),
                "board",
                board.as_str(),
            ),
        };
        let cards: Vec<WireCard> = self.get(
            &path,
            &[
                ("fields", CARD_FIELDS),
                ("attachments", "true"),
                ("attachment_fields", "url"),
            ],
            resource,
            name,
        )?;
        Ok(cards.into_iter().map(Into::into).collect())
    }

    fn create_card(&mut self, list: &ListId, title: &str, description: Option<&str>) -> Result<Card> {
        let mut body = json!({ "idList": list.as_str(), "name": title });
        if let Some(desc) = description {
            body["desc"] = Value::from(desc);
        }
        let wire: WireCard = self
            .send(Method::POST, "/cards", &[], Some(&body), "list", list.as_str())?
            .json()?;
        Ok(wire.into())
    }

    fn update_card(&mut self, id: &CardId, update: &CardUpdate) -> Result<Card> {
        let mut body = Map::new();
        if let Some(title) = &update.title {
            body.insert("name".into(), Value::from(title.as_str()));
        }
        if let Some(desc) = &update.description {
            body.insert("desc".into(), Value::from(desc.as_str()));
        }
        if let Some(due) = update.due {
            // null clears the date
            let due = due.map(|d| Value::from(d.to_rfc3339())).unwrap_or(Value::Null);
            body.insert("due".into(), due);
        }
        if let Some(tags) = &update.tag_ids {
            let ids: Vec<&str> = tags.iter().map(|t| t.as_str()).collect();
            body.insert("idLabels".into(), Value::from(ids.join(",")));
        }
        if let Some(status) = update.status {
            body.insert("closed".into(), Value::from(status != CardStatus::Open));
        }
        self.put_card(id, Value::Object(body))
    }

    fn move_card(&mut self, id: &CardId, destination: &ListId) -> Result<Card> {
        self.put_card(id, json!({ "idList": destination.as_str() }))
    }

    fn attach_url(&mut self, id: &CardId, url: &str) -> Result<()> {
        let path = format!("/cards/{}/attachments", urlencoding::encode(id.as_str()));
        let body = json!({ "url": url });
        self.send(Method::POST, &path, &[], Some(&body), "card", id.as_str())?;
        Ok(())
    }

    fn add_comment(&mut self, id: &CardId, text: &str) -> Result<()> {
        let path = format!("/cards/{}/actions/comments", urlencoding::encode(id.as_str()));
        let body = json!({ "text": text });
        self.send(Method::POST, &path, &[], Some(&body), "card", id.as_str())?;
        Ok(())
    }

    fn archive_card(&mut self, id: &CardId) -> Result<()> {
        self.put_card(id, json!({ "closed": true }))?;
        Ok(())
    }

    fn delete_card(&mut self, id: &CardId) -> Result<()> {
        let path = format!("/cards/{}", urlencoding::encode(id.as_str()));
        self.send(Method::DELETE, &path, &[], None, "card", id.as_str())?;
        Ok(())
    }

    fn archive_list(&mut self, id: &ListId) -> Result<()> {
        let path = format!("/lists/{}/closed", urlencoding::encode(id.as_str()));
        let body = json!({ "value": true });
        self.send(Method::PUT, &path, &[], Some(&body), "list", id.as_str())?;
        Ok(())
    }
}
