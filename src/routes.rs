use crate::{
    message::{
        message_dto::{
            ConversationResponse, DeleteMessageRequest, MarkSeenRequest, SendMessageRequest,
            SentMessageResponse, StatusResponse,
        },
        message_handlers,
        message_models::{Message, MessageEnvelope, Side},
    },
    state::AppState,
};
use axum::http::{header::CONTENT_TYPE, Method};
use axum::{routing::get, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::message::message_handlers::get_conversation,
        crate::message::message_handlers::send_message,
        crate::message::message_handlers::mark_seen,
        crate::message::message_handlers::delete_message,
    ),
    components(
        schemas(
            SendMessageRequest,
            MarkSeenRequest,
            DeleteMessageRequest,
            Message,
            MessageEnvelope,
            Side,
            ConversationResponse,
            SentMessageResponse,
            StatusResponse,
        )
    ),
    tags(
        (name = "messages", description = "Chat message relay endpoint")
    )
)]
struct ApiDoc;

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE]);

    // One endpoint, dispatched by verb; anything else is a 405.
    let gateway = get(message_handlers::get_conversation)
        .post(message_handlers::send_message)
        .put(message_handlers::mark_seen)
        .patch(message_handlers::mark_seen)
        .delete(message_handlers::delete_message)
        .options(message_handlers::preflight)
        .fallback(message_handlers::method_not_allowed);

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/api/messages", gateway)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
