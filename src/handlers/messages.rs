//! Message endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use tracing::info;

use crate::config::AppState;
use crate::error::Result;
use crate::models::{Message, SendMessageInput, UpdateStatusInput};

/// POST /messages
pub async fn send_message(
    State(state): State<AppState>,
    Json(input): Json<SendMessageInput>,
) -> Result<(StatusCode, Json<Message>)> {
    info!("POST /messages - {} -> {}", input.sender, input.recipient);

    let message = state
        .messages
        .send_message(&input.sender, &input.recipient, &input.content)?;
    Ok((StatusCode::CREATED, Json(message)))
}

/// GET /messages/user/:user_id
pub async fn get_user_messages(
    Path(user_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Vec<Message>>> {
    info!("GET /messages/user/{}", user_id);

    let messages = state.messages.messages_for_user(&user_id)?;
    Ok(Json(messages))
}

/// GET /messages/chat/:chat_id
pub async fn get_chat_messages(
    Path(chat_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Vec<Message>>> {
    info!("GET /messages/chat/{}", chat_id);

    let messages = state.messages.messages_for_chat(&chat_id)?;
    Ok(Json(messages))
}

/// PATCH /messages/:message_id/status
pub async fn update_message_status(
    Path(message_id): Path<String>,
    State(state): State<AppState>,
    Json(input): Json<UpdateStatusInput>,
) -> Result<Json<Message>> {
    info!("PATCH /messages/{}/status -> {}", message_id, input.status);

    let message = state.messages.update_status(&message_id, &input.status)?;
    Ok(Json(message))
}
