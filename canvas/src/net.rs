//! Browser backend: REST calls and the change-feed websocket via `gloo-net`.
//!
//! Only compiled for `wasm32`; native builds and tests use an in-memory
//! [`NoteBackend`].

use async_trait::async_trait;
use futures::StreamExt;
use gloo_net::http::{Request, Response};
use gloo_net::websocket::Message;
use gloo_net::websocket::futures::WebSocket;
use serde::de::DeserializeOwned;

use crate::doc::{ChangeEvent, Note, NoteDraft, NoteId, NotePatch};
use crate::sync::{ChangeSource, NoteBackend, StoreError};

/// Talks to the bulletin service at `base_url` (e.g. `https://board.example`).
#[derive(Debug, Clone)]
pub struct HttpBackend {
    base_url: String,
}

impl HttpBackend {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { base_url: base_url.into().trim_end_matches('/').to_owned() }
    }

    fn notes_url(&self) -> String {
        format!("{}/api/notes", self.base_url)
    }

    fn note_url(&self, id: NoteId) -> String {
        format!("{}/api/notes/{id}", self.base_url)
    }

    fn feed_url(&self) -> String {
        let url = format!("{}/api/notes/changes", self.base_url);
        if let Some(rest) = url.strip_prefix("https://") {
            format!("wss://{rest}")
        } else if let Some(rest) = url.strip_prefix("http://") {
            format!("ws://{rest}")
        } else {
            url
        }
    }
}

#[async_trait(?Send)]
impl NoteBackend for HttpBackend {
    type Feed = WsFeed;

    async fn load_all(&self) -> Result<Vec<Note>, StoreError> {
        let resp = Request::get(&self.notes_url()).send().await.map_err(transport)?;
        let rows: Vec<serde_json::Value> = decode(resp).await?;
        let mut notes = Vec::with_capacity(rows.len());
        for row in rows {
            match serde_json::from_value::<Note>(row) {
                Ok(note) => notes.push(note),
                Err(e) => log::warn!("skipping unreadable note: {e}"),
            }
        }
        Ok(notes)
    }

    async fn create(&self, draft: &NoteDraft) -> Result<Note, StoreError> {
        let req = Request::post(&self.notes_url()).json(draft).map_err(transport)?;
        decode(req.send().await.map_err(transport)?).await
    }

    async fn update(&self, id: NoteId, patch: &NotePatch) -> Result<Note, StoreError> {
        let req = Request::patch(&self.note_url(id)).json(patch).map_err(transport)?;
        let resp = req.send().await.map_err(transport)?;
        if resp.status() == 404 {
            return Err(StoreError::NotFound(id));
        }
        decode(resp).await
    }

    async fn delete(&self, id: NoteId) -> Result<(), StoreError> {
        let resp = Request::delete(&self.note_url(id)).send().await.map_err(transport)?;
        match resp.status() {
            404 => Err(StoreError::NotFound(id)),
            status if is_success(status) => Ok(()),
            status => Err(StoreError::Status(status)),
        }
    }

    async fn subscribe(&self) -> Result<Self::Feed, StoreError> {
        let socket = WebSocket::open(&self.feed_url()).map_err(transport)?;
        Ok(WsFeed { socket })
    }
}

/// Realtime changes read from the service websocket.
pub struct WsFeed {
    socket: WebSocket,
}

#[async_trait(?Send)]
impl ChangeSource for WsFeed {
    async fn next_change(&mut self) -> Option<ChangeEvent> {
        loop {
            match self.socket.next().await? {
                Ok(Message::Text(text)) => {
                    if let Some(event) = ChangeEvent::parse(&text) {
                        return Some(event);
                    }
                }
                Ok(Message::Bytes(_)) => {}
                Err(e) => {
                    log::warn!("change feed closed: {e}");
                    return None;
                }
            }
        }
    }
}

fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}

fn transport(e: impl std::fmt::Display) -> StoreError {
    StoreError::Transport(e.to_string())
}

async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T, StoreError> {
    if !is_success(resp.status()) {
        return Err(StoreError::Status(resp.status()));
    }
    resp.json::<T>().await.map_err(|e| StoreError::Decode(e.to_string()))
}
