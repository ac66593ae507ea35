use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::db::DbPool;
use crate::error::Result;
use crate::message::message_models::Message;

/// Insert payload, identities already in canonical (lowercase) form.
#[derive(Debug, Clone)]
pub struct NewMessage {
    pub sender: String,
    pub recipient: String,
    pub body: String,
    pub photo: Option<String>,
    pub sent_at: Option<DateTime<Utc>>,
    pub reply_to: Option<i64>,
}

/// Precondition for delete: whether the supplied participant pair must
/// match the stored row in either order or exactly as stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeleteMatch {
    #[default]
    AnyOrder,
    ExactOrder,
}

/// Store contract for the gateway. One implementation over Postgres; tests
/// substitute an in-memory store.
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Insert a row and return it fully materialized (assigned `id`,
    /// resolved `sent_at`, `seen = false`).
    async fn insert(&self, new: NewMessage) -> Result<Message>;

    /// All messages for the unordered pair, ascending by `sent_at` with
    /// `id` as the tie-break.
    async fn find_conversation(&self, a: &str, b: &str) -> Result<Vec<Message>>;

    /// Set `seen = true`. When `recipient` is asserted the row must also
    /// belong to that recipient. Returns whether a row matched; marking an
    /// already-seen row matches again (idempotent).
    async fn mark_seen(&self, id: i64, recipient: Option<&str>) -> Result<bool>;

    /// Delete the row if its participant pair matches per `mode`. Returns
    /// whether a row was removed.
    async fn delete(&self, id: i64, a: &str, b: &str, mode: DeleteMatch) -> Result<bool>;
}

#[derive(Clone)]
pub struct PgMessageStore {
    pool: DbPool,
}

impl PgMessageStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MessageStore for PgMessageStore {
    async fn insert(&self, new: NewMessage) -> Result<Message> {
        let message = sqlx::query_as::<_, Message>(
            "INSERT INTO messages (sender, recipient, body, photo, sent_at, reply_to)
             VALUES ($1, $2, $3, $4, COALESCE($5, NOW()), $6)
             RETURNING *",
        )
        .bind(&new.sender)
        .bind(&new.recipient)
        .bind(&new.body)
        .bind(&new.photo)
        .bind(new.sent_at)
        .bind(new.reply_to)
        .fetch_one(&self.pool)
        .await?;

        Ok(message)
    }

    async fn find_conversation(&self, a: &str, b: &str) -> Result<Vec<Message>> {
        let messages = sqlx::query_as::<_, Message>(
            "SELECT * FROM messages
             WHERE (sender = $1 AND recipient = $2)
                OR (sender = $2 AND recipient = $1)
             ORDER BY sent_at ASC, id ASC",
        )
        .bind(a)
        .bind(b)
        .fetch_all(&self.pool)
        .await?;

        Ok(messages)
    }

    async fn mark_seen(&self, id: i64, recipient: Option<&str>) -> Result<bool> {
        let result = match recipient {
            Some(recipient) => {
                sqlx::query(
                    "UPDATE messages SET seen = TRUE
                     WHERE id = $1 AND recipient = $2",
                )
                .bind(id)
                .bind(recipient)
                .execute(&self.pool)
                .await?
            }
            None => {
                sqlx::query("UPDATE messages SET seen = TRUE WHERE id = $1")
                    .bind(id)
                    .execute(&self.pool)
                    .await?
            }
        };

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: i64, a: &str, b: &str, mode: DeleteMatch) -> Result<bool> {
        let sql = match mode {
            DeleteMatch::AnyOrder => {
                "DELETE FROM messages
                 WHERE id = $1
                   AND ((sender = $2 AND recipient = $3)
                     OR (sender = $3 AND recipient = $2))"
            }
            DeleteMatch::ExactOrder => {
                "DELETE FROM messages
                 WHERE id = $1 AND sender = $2 AND recipient = $3"
            }
        };

        let result = sqlx::query(sql)
            .bind(id)
            .bind(a)
            .bind(b)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
