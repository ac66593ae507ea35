use std::sync::Arc;

use crate::message::message_repository::DeleteMatch;
use crate::message::message_service::MessageService;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub message_service: MessageService,
}

#[derive(Clone)]
pub struct Config {
    pub redis_url: String,
    pub delete_match: DeleteMatch,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            redis_url: std::env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string()),
            // Whether delete requires the pair in either order or exactly
            // as stored; source systems disagree, so it stays a knob.
            delete_match: match std::env::var("DELETE_MATCH").as_deref() {
                Ok("exact-order") => DeleteMatch::ExactOrder,
                _ => DeleteMatch::AnyOrder,
            },
        }
    }
}
