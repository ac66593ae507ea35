use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::{
    error::{AppError, Result},
    message::{
        message_dto::{
            ConversationQuery, ConversationResponse, DeleteMessageRequest, MarkSeenRequest,
            SendMessageRequest, SentMessageResponse, StatusResponse,
        },
    },
    state::AppState,
};

/// Read the message history between two identities
#[utoipa::path(
    get,
    path = "/api/messages",
    tag = "messages",
    params(ConversationQuery),
    responses(
        (status = 200, description = "Ordered conversation history", body = ConversationResponse),
        (status = 400, description = "Missing query parameters"),
        (status = 404, description = "No messages for this pair")
    )
)]
pub async fn get_conversation(
    State(state): State<AppState>,
    Query(query): Query<ConversationQuery>,
) -> Result<impl IntoResponse> {
    let messages = state
        .message_service
        .read_conversation(query.username, query.chat_with)
        .await?;

    Ok((StatusCode::OK, Json(ConversationResponse { messages })))
}

/// Send a message and fan it out to the conversation channel
#[utoipa::path(
    post,
    path = "/api/messages",
    tag = "messages",
    request_body = SendMessageRequest,
    responses(
        (status = 201, description = "Message stored and published", body = SentMessageResponse),
        (status = 400, description = "Missing required fields"),
        (status = 500, description = "Store or publish failure")
    )
)]
pub async fn send_message(
    State(state): State<AppState>,
    Json(payload): Json<SendMessageRequest>,
) -> Result<impl IntoResponse> {
    let message = state.message_service.send_message(payload).await?;

    Ok((StatusCode::CREATED, Json(SentMessageResponse { message })))
}

/// Mark a message as seen by its recipient
#[utoipa::path(
    put,
    path = "/api/messages",
    tag = "messages",
    request_body = MarkSeenRequest,
    responses(
        (status = 200, description = "Message marked as seen", body = StatusResponse),
        (status = 400, description = "Missing or non-numeric id"),
        (status = 404, description = "No matching message")
    )
)]
pub async fn mark_seen(
    State(state): State<AppState>,
    Json(payload): Json<MarkSeenRequest>,
) -> Result<impl IntoResponse> {
    state.message_service.mark_seen(payload).await?;

    Ok((
        StatusCode::OK,
        Json(StatusResponse {
            message: "Message marked as seen".to_string(),
        }),
    ))
}

/// Delete a message belonging to the given conversation pair
#[utoipa::path(
    delete,
    path = "/api/messages",
    tag = "messages",
    request_body = DeleteMessageRequest,
    responses(
        (status = 200, description = "Message deleted", body = StatusResponse),
        (status = 400, description = "Missing fields"),
        (status = 404, description = "No matching message for this pair")
    )
)]
pub async fn delete_message(
    State(state): State<AppState>,
    Json(payload): Json<DeleteMessageRequest>,
) -> Result<impl IntoResponse> {
    state.message_service.delete_message(payload).await?;

    Ok((
        StatusCode::OK,
        Json(StatusResponse {
            message: "Message deleted".to_string(),
        }),
    ))
}

/// CORS preflight; headers come from the CORS layer.
pub async fn preflight() -> StatusCode {
    StatusCode::OK
}

/// Any verb outside the dispatch table.
pub async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}
