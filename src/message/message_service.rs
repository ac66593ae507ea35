use std::sync::Arc;

use tracing::{debug, info};
use validator::Validate;

use crate::error::{AppError, Result};
use crate::fanout::{channel_for, FanoutPublisher, NEW_MESSAGE_EVENT};
use crate::message::message_dto::{DeleteMessageRequest, MarkSeenRequest, SendMessageRequest};
use crate::message::message_models::{Message, MessageEnvelope};
use crate::message::message_repository::{DeleteMatch, MessageStore, NewMessage};

/// Identity strings are compared and stored lowercase.
fn canonical(identity: &str) -> String {
    identity.to_lowercase()
}

/// A photo is accepted only if it looks like an embedded image payload.
/// Anything else is discarded and the message stored without one; the blob
/// is never decoded or validated further.
fn accepted_photo(photo: Option<String>) -> Option<String> {
    photo.filter(|p| p.starts_with("data:image"))
}

#[derive(Clone)]
pub struct MessageService {
    store: Arc<dyn MessageStore>,
    publisher: Arc<dyn FanoutPublisher>,
    delete_match: DeleteMatch,
}

impl MessageService {
    pub fn new(
        store: Arc<dyn MessageStore>,
        publisher: Arc<dyn FanoutPublisher>,
        delete_match: DeleteMatch,
    ) -> Self {
        Self {
            store,
            publisher,
            delete_match,
        }
    }

    /// Full history for the unordered pair, oldest first, each message
    /// tagged with its side relative to `username`.
    pub async fn read_conversation(
        &self,
        username: Option<String>,
        chat_with: Option<String>,
    ) -> Result<Vec<MessageEnvelope>> {
        let (username, chat_with) = match (username, chat_with) {
            (Some(u), Some(c)) if !u.is_empty() && !c.is_empty() => (u, c),
            _ => {
                return Err(AppError::Validation(
                    "Missing required query parameters: username or chatWith".to_string(),
                ))
            }
        };

        let viewer = canonical(&username);
        let other = canonical(&chat_with);
        debug!("Fetching conversation between {viewer} and {other}");

        let messages = self.store.find_conversation(&viewer, &other).await?;
        if messages.is_empty() {
            // An empty pair is reportable, so callers can tell "no
            // conversation yet" apart from a transport failure.
            return Err(AppError::NotFound(
                "No messages found for this chat".to_string(),
            ));
        }

        info!("Fetched {} messages for {viewer} <-> {other}", messages.len());
        Ok(messages
            .into_iter()
            .map(|m| m.envelope_for(&viewer))
            .collect())
    }

    /// Validate, persist, then fan out. The fan-out publish is awaited
    /// before success is reported: a publish failure after a successful
    /// insert fails the whole request even though the row is durably
    /// stored, so a client retry may duplicate the row. At-least-once
    /// storage, best-effort notify.
    pub async fn send_message(&self, payload: SendMessageRequest) -> Result<Message> {
        payload.validate()?;

        let sender = canonical(payload.username.as_deref().unwrap_or_default());
        let recipient = canonical(payload.chat_with.as_deref().unwrap_or_default());

        let message = self
            .store
            .insert(NewMessage {
                sender: sender.clone(),
                recipient: recipient.clone(),
                body: payload.body.unwrap_or_default(),
                photo: accepted_photo(payload.photo),
                sent_at: payload.timestamp,
                reply_to: payload.reply_to,
            })
            .await?;

        info!("Stored message {} from {sender} to {recipient}", message.id);

        let channel = channel_for(&sender, &recipient);
        let frame = serde_json::to_value(&message)
            .map_err(|e| AppError::Unexpected(e.to_string()))?;
        self.publisher
            .publish(&channel, NEW_MESSAGE_EVENT, &frame)
            .await?;

        info!("Published message {} to {channel}", message.id);
        Ok(message)
    }

    /// Flip `seen` to true. Idempotent: re-marking a seen message matches
    /// the row again and succeeds without side effect.
    pub async fn mark_seen(&self, payload: MarkSeenRequest) -> Result<()> {
        let id = payload.message_id()?;
        let seen_by = payload.seen_by.as_deref().map(canonical);

        let matched = self.store.mark_seen(id, seen_by.as_deref()).await?;
        if !matched {
            return Err(AppError::NotFound("Message not found".to_string()));
        }

        info!("Marked message {id} as seen");
        Ok(())
    }

    /// Remove a message, but only when the supplied participant pair
    /// matches the stored row per the configured precondition.
    pub async fn delete_message(&self, payload: DeleteMessageRequest) -> Result<()> {
        let id = payload.message_id()?;
        let (username, chat_with) = match (&payload.username, &payload.chat_with) {
            (Some(u), Some(c)) if !u.is_empty() && !c.is_empty() => (u, c),
            _ => {
                return Err(AppError::Validation(
                    "Missing required fields: messageId, username, chatWith".to_string(),
                ))
            }
        };

        let removed = self
            .store
            .delete(id, &canonical(username), &canonical(chat_with), self.delete_match)
            .await?;
        if !removed {
            return Err(AppError::NotFound(
                "Message not found for this chat".to_string(),
            ));
        }

        info!("Deleted message {id}");
        Ok(())
    }
}
