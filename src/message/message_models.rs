use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// A stored chat message. Wire field names follow the client contract
/// (`username`/`chatWith`/`message`), struct fields match the column names.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Message {
    pub id: i64,
    #[serde(rename = "username")]
    pub sender: String,
    #[serde(rename = "chatWith")]
    pub recipient: String,
    #[serde(rename = "message")]
    pub body: String,
    pub photo: Option<String>,
    #[serde(rename = "timestamp")]
    pub sent_at: DateTime<Utc>,
    pub seen: bool,
    #[serde(rename = "replyTo")]
    pub reply_to: Option<i64>,
}

/// Which side of the conversation a message sits on, relative to the
/// identity that asked for the history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum Side {
    #[serde(rename = "self")]
    Own,
    #[serde(rename = "other")]
    Other,
}

/// A message as returned by the conversation read: the stored record plus
/// the computed `side`, so clients can align bubbles without re-comparing
/// identities themselves.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MessageEnvelope {
    #[serde(flatten)]
    pub message: Message,
    pub side: Side,
}

impl Message {
    /// Build the read envelope from the viewpoint of `viewer` (canonical form).
    pub fn envelope_for(self, viewer: &str) -> MessageEnvelope {
        let side = if self.sender == viewer {
            Side::Own
        } else {
            Side::Other
        };
        MessageEnvelope {
            message: self,
            side,
        }
    }
}
