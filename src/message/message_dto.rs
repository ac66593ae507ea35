use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

use crate::error::{AppError, Result};
use crate::message::message_models::{Message, MessageEnvelope};

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ConversationQuery {
    pub username: Option<String>,
    #[serde(rename = "chatWith")]
    pub chat_with: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[validate(schema(function = "validate_send_message"))]
pub struct SendMessageRequest {
    pub username: Option<String>,
    #[serde(rename = "chatWith")]
    pub chat_with: Option<String>,
    #[serde(rename = "message")]
    pub body: Option<String>,
    pub photo: Option<String>,
    /// Caller-supplied send time; insertion time when omitted.
    #[serde(rename = "timestamp")]
    pub timestamp: Option<chrono::DateTime<chrono::Utc>>,
    /// Weak reference to an earlier message id; never validated against
    /// the store, dangling values are tolerated.
    #[serde(rename = "replyTo")]
    pub reply_to: Option<i64>,
}

fn validate_send_message(req: &SendMessageRequest) -> std::result::Result<(), ValidationError> {
    let has_identities = req.username.as_deref().is_some_and(|s| !s.is_empty())
        && req.chat_with.as_deref().is_some_and(|s| !s.is_empty());
    let has_content = req.body.as_deref().is_some_and(|s| !s.is_empty())
        || req.photo.as_deref().is_some_and(|s| !s.is_empty());

    if has_identities && has_content {
        return Ok(());
    }

    let mut err = ValidationError::new("required");
    err.message = Some("Missing required fields: username, chatWith, message/photo".into());
    Err(err)
}

/// Mark-seen accepts either a bare `id` or the stricter
/// `messageId` + `seenBy` form where the asserted recipient must match.
#[derive(Debug, Deserialize, ToSchema)]
pub struct MarkSeenRequest {
    #[schema(value_type = Option<i64>)]
    pub id: Option<serde_json::Value>,
    #[serde(rename = "messageId")]
    #[schema(value_type = Option<i64>)]
    pub message_id: Option<serde_json::Value>,
    #[serde(rename = "seenBy")]
    pub seen_by: Option<String>,
}

impl MarkSeenRequest {
    pub fn message_id(&self) -> Result<i64> {
        parse_message_id(self.id.as_ref().or(self.message_id.as_ref()))
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct DeleteMessageRequest {
    #[serde(rename = "messageId")]
    #[schema(value_type = Option<i64>)]
    pub message_id: Option<serde_json::Value>,
    pub username: Option<String>,
    #[serde(rename = "chatWith")]
    pub chat_with: Option<String>,
}

impl DeleteMessageRequest {
    pub fn message_id(&self) -> Result<i64> {
        parse_message_id(self.message_id.as_ref())
    }
}

/// Clients send ids both as JSON numbers and as strings; anything else is
/// a validation failure, not a deserialization one.
fn parse_message_id(value: Option<&serde_json::Value>) -> Result<i64> {
    let value = value.ok_or_else(|| {
        AppError::Validation("Missing required field: message id".to_string())
    })?;
    match value {
        serde_json::Value::Number(n) => n.as_i64(),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
    .ok_or_else(|| AppError::Validation("Message id must be a number".to_string()))
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ConversationResponse {
    pub messages: Vec<MessageEnvelope>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SentMessageResponse {
    pub message: Message,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StatusResponse {
    pub message: String,
}
