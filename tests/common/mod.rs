use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use chrono::Utc;

use chat_gateway::error::Result;
use chat_gateway::fanout::FanoutPublisher;
use chat_gateway::message::message_models::Message;
use chat_gateway::message::message_repository::{DeleteMatch, MessageStore, NewMessage};
use chat_gateway::message::message_service::MessageService;
use chat_gateway::routes::create_router;
use chat_gateway::state::{AppState, Config};

/// In-memory stand-in for the Postgres store: a Vec of rows with a
/// monotonically increasing id counter, mirroring the SQL contract.
pub struct MemoryStore {
    rows: Mutex<Vec<Message>>,
    next_id: AtomicI64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            rows: Mutex::new(Vec::new()),
            next_id: AtomicI64::new(1),
        }
    }

    pub fn all_rows(&self) -> Vec<Message> {
        self.rows.lock().unwrap().clone()
    }
}

#[async_trait]
impl MessageStore for MemoryStore {
    async fn insert(&self, new: NewMessage) -> Result<Message> {
        let message = Message {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            sender: new.sender,
            recipient: new.recipient,
            body: new.body,
            photo: new.photo,
            sent_at: new.sent_at.unwrap_or_else(Utc::now),
            seen: false,
            reply_to: new.reply_to,
        };
        self.rows.lock().unwrap().push(message.clone());
        Ok(message)
    }

    async fn find_conversation(&self, a: &str, b: &str) -> Result<Vec<Message>> {
        let mut messages: Vec<Message> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|m| {
                (m.sender == a && m.recipient == b) || (m.sender == b && m.recipient == a)
            })
            .cloned()
            .collect();
        messages.sort_by(|x, y| x.sent_at.cmp(&y.sent_at).then(x.id.cmp(&y.id)));
        Ok(messages)
    }

    async fn mark_seen(&self, id: i64, recipient: Option<&str>) -> Result<bool> {
        let mut rows = self.rows.lock().unwrap();
        match rows
            .iter_mut()
            .find(|m| m.id == id && recipient.map_or(true, |r| m.recipient == r))
        {
            Some(row) => {
                row.seen = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: i64, a: &str, b: &str, mode: DeleteMatch) -> Result<bool> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|m| {
            let pair_matches = match mode {
                DeleteMatch::AnyOrder => {
                    (m.sender == a && m.recipient == b) || (m.sender == b && m.recipient == a)
                }
                DeleteMatch::ExactOrder => m.sender == a && m.recipient == b,
            };
            !(m.id == id && pair_matches)
        });
        Ok(rows.len() < before)
    }
}

/// Records every publish so tests can assert on channel, event and payload.
pub struct RecordingPublisher {
    published: Mutex<Vec<(String, String, serde_json::Value)>>,
}

impl RecordingPublisher {
    pub fn new() -> Self {
        Self {
            published: Mutex::new(Vec::new()),
        }
    }

    pub fn published(&self) -> Vec<(String, String, serde_json::Value)> {
        self.published.lock().unwrap().clone()
    }
}

#[async_trait]
impl FanoutPublisher for RecordingPublisher {
    async fn publish(
        &self,
        channel: &str,
        event: &str,
        payload: &serde_json::Value,
    ) -> Result<()> {
        self.published.lock().unwrap().push((
            channel.to_string(),
            event.to_string(),
            payload.clone(),
        ));
        Ok(())
    }
}

pub fn create_test_app(
    store: Arc<MemoryStore>,
    publisher: Arc<dyn FanoutPublisher>,
) -> Router {
    create_test_app_with(store, publisher, DeleteMatch::AnyOrder)
}

pub fn create_test_app_with(
    store: Arc<MemoryStore>,
    publisher: Arc<dyn FanoutPublisher>,
    delete_match: DeleteMatch,
) -> Router {
    let config = Arc::new(Config {
        redis_url: "redis://unused".to_string(),
        delete_match,
    });
    let message_service = MessageService::new(store, publisher, delete_match);
    create_router(AppState {
        config,
        message_service,
    })
}
