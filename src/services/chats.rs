//! Derived chat views: per-user listings and per-chat statistics.

use std::sync::Arc;

use crate::error::{Error, Result};
use crate::models::{ChatMetadata, ChatSummary, MessageStatus, ParticipantStats};
use crate::store::ChatStore;

/// Previews are cut at this many characters, with an ellipsis marker
/// appended when content was actually truncated.
pub const PREVIEW_MAX_CHARS: usize = 30;

pub struct ChatQueryService {
    store: Arc<ChatStore>,
}

impl ChatQueryService {
    pub fn new(store: Arc<ChatStore>) -> Self {
        Self { store }
    }

    /// One summary per chat containing the user, in chat insertion
    /// order. The last appended message supplies preview and timestamp.
    pub fn chats_for_user(&self, user_id: &str) -> Result<Vec<ChatSummary>> {
        if !self.store.user_exists(user_id) {
            return Err(Error::InvalidUser("Invalid user ID".into()));
        }

        let summaries = self
            .store
            .chats_with_participant(user_id)
            .into_iter()
            .map(|chat| {
                let last_message = chat
                    .message_ids
                    .last()
                    .and_then(|id| self.store.find_message(id));
                ChatSummary {
                    other_participant: chat.other_participant(user_id).to_string(),
                    message_count: chat.message_ids.len(),
                    last_message_preview: last_message.as_ref().map(|m| preview(&m.content)),
                    last_message_time: last_message.map(|m| m.timestamp),
                    id: chat.id,
                    participants: chat.participants,
                }
            })
            .collect();
        Ok(summaries)
    }

    /// Aggregate statistics for one chat: first/last activity, unread
    /// count and per-participant sent/received tallies.
    pub fn chat_metadata(&self, chat_id: &str) -> Result<ChatMetadata> {
        let (chat, messages) = self
            .store
            .chat_with_messages(chat_id)
            .ok_or(Error::NotFound("Chat"))?;

        let participant_stats = chat
            .participants
            .iter()
            .map(|participant| ParticipantStats {
                user_id: participant.clone(),
                messages_sent: messages.iter().filter(|m| &m.sender == participant).count(),
                messages_received: messages
                    .iter()
                    .filter(|m| &m.recipient == participant)
                    .count(),
            })
            .collect();

        Ok(ChatMetadata {
            message_count: chat.message_ids.len(),
            created_at: messages.iter().map(|m| m.timestamp).min(),
            last_activity: messages.iter().map(|m| m.timestamp).max(),
            unread_count: messages
                .iter()
                .filter(|m| m.status != MessageStatus::Read)
                .count(),
            participant_stats,
            id: chat.id,
            participants: chat.participants,
        })
    }
}

fn preview(content: &str) -> String {
    if content.chars().count() > PREVIEW_MAX_CHARS {
        let cut: String = content.chars().take(PREVIEW_MAX_CHARS).collect();
        format!("{cut}...")
    } else {
        content.to_string()
    }
}
