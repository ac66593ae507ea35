//! Realtime fan-out of newly stored messages.
//!
//! Each conversation maps to exactly one pub/sub channel derived from the
//! unordered participant pair, so either side subscribing computes the same
//! name. The publisher is an injected one-method dependency rather than a
//! process-global client, which lets tests substitute a recording fake.

use async_trait::async_trait;
use redis::AsyncCommands;
use serde_json::json;

use crate::error::{AppError, Result};

/// Event name attached to every fanned-out message frame.
pub const NEW_MESSAGE_EVENT: &str = "newMessage";

/// Channel name for a conversation pair. Identities must already be in
/// canonical form; the pair is sorted so both participants derive the same
/// channel regardless of who sends.
pub fn channel_for(a: &str, b: &str) -> String {
    let (first, second) = if a <= b { (a, b) } else { (b, a) };
    format!("chat-{first}-{second}")
}

#[async_trait]
pub trait FanoutPublisher: Send + Sync {
    async fn publish(&self, channel: &str, event: &str, payload: &serde_json::Value)
        -> Result<()>;
}

/// Publishes over Redis pub/sub. The event name travels inside the frame
/// since Redis channels carry only an opaque payload.
pub struct RedisPublisher {
    client: redis::Client,
}

impl RedisPublisher {
    pub fn new(client: redis::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl FanoutPublisher for RedisPublisher {
    async fn publish(
        &self,
        channel: &str,
        event: &str,
        payload: &serde_json::Value,
    ) -> Result<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        let frame = serde_json::to_string(&json!({ "event": event, "data": payload }))
            .map_err(|e| AppError::Fanout(e.to_string()))?;

        // Subscriber count is irrelevant; delivery is whatever the transport
        // provides and the gateway never retries.
        let _subscribers: i64 = conn.publish(channel, frame).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_is_stable_across_orderings() {
        assert_eq!(channel_for("amy", "bob"), channel_for("bob", "amy"));
    }

    #[test]
    fn channel_sorts_pair_lexicographically() {
        assert_eq!(channel_for("bob", "amy"), "chat-amy-bob");
    }

    #[test]
    fn same_identity_twice_is_still_deterministic() {
        assert_eq!(channel_for("amy", "amy"), "chat-amy-amy");
    }
}
