//! Chat listing and metadata endpoints.

use axum::{
    extract::{Path, State},
    Json,
};
use tracing::info;

use crate::config::AppState;
use crate::error::Result;
use crate::models::{ChatMetadata, ChatSummary};

/// GET /chats/user/:user_id
pub async fn list_chats(
    Path(user_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Vec<ChatSummary>>> {
    info!("GET /chats/user/{}", user_id);

    let summaries = state.chats.chats_for_user(&user_id)?;
    Ok(Json(summaries))
}

/// GET /chats/:chat_id
pub async fn get_chat_metadata(
    Path(chat_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<ChatMetadata>> {
    info!("GET /chats/{}", chat_id);

    let metadata = state.chats.chat_metadata(&chat_id)?;
    Ok(Json(metadata))
}
