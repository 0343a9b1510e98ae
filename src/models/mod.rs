use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Delivery state of a message. Any value may be set at any time;
/// there is no enforced transition order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageStatus {
    Delivered,
    Read,
    Failed,
}

impl MessageStatus {
    /// Parse a wire value, rejecting anything outside the enum.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "delivered" => Some(MessageStatus::Delivered),
            "read" => Some(MessageStatus::Read),
            "failed" => Some(MessageStatus::Failed),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MessageStatus::Delivered => "delivered",
            MessageStatus::Read => "read",
            MessageStatus::Failed => "failed",
        }
    }
}

/// A single message between two users. Immutable after creation
/// except for `status`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub sender: String,
    pub recipient: String,
    pub content: String,
    pub status: MessageStatus,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn new(
        sender: impl Into<String>,
        recipient: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            sender: sender.into(),
            recipient: recipient.into(),
            content: content.into(),
            status: MessageStatus::Delivered,
            timestamp: Utc::now(),
        }
    }
}

/// A private conversation between exactly two users. Holds message ids
/// in append order; at most one chat exists per unordered pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chat {
    pub id: String,
    pub participants: [String; 2],
    #[serde(rename = "messages")]
    pub message_ids: Vec<String>,
}

impl Chat {
    pub fn new(a: impl Into<String>, b: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            participants: [a.into(), b.into()],
            message_ids: Vec::new(),
        }
    }

    pub fn has_participant(&self, user_id: &str) -> bool {
        self.participants.iter().any(|p| p == user_id)
    }

    /// The co-participant, or an empty string for a malformed chat.
    pub fn other_participant(&self, user_id: &str) -> &str {
        self.participants
            .iter()
            .find(|p| *p != user_id)
            .map(String::as_str)
            .unwrap_or("")
    }
}

/// Input for sending a message. Fields default to empty so that missing
/// keys surface as a validation error rather than a decode failure.
#[derive(Debug, Deserialize)]
pub struct SendMessageInput {
    #[serde(default)]
    pub sender: String,
    #[serde(default)]
    pub recipient: String,
    #[serde(default)]
    pub content: String,
}

/// Input for updating a message status. Kept as a raw string so invalid
/// values produce the domain validation error.
#[derive(Debug, Deserialize)]
pub struct UpdateStatusInput {
    #[serde(default)]
    pub status: String,
}

/// Per-chat listing entry with the most recent message preview.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatSummary {
    pub id: String,
    pub participants: [String; 2],
    pub message_count: usize,
    pub other_participant: String,
    pub last_message_preview: Option<String>,
    pub last_message_time: Option<DateTime<Utc>>,
}

/// Aggregated statistics for a single chat.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMetadata {
    pub id: String,
    pub participants: [String; 2],
    pub message_count: usize,
    pub created_at: Option<DateTime<Utc>>,
    pub last_activity: Option<DateTime<Utc>>,
    pub unread_count: usize,
    pub participant_stats: Vec<ParticipantStats>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantStats {
    pub user_id: String,
    pub messages_sent: usize,
    pub messages_received: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parse_rejects_unknown_values() {
        assert_eq!(MessageStatus::parse("read"), Some(MessageStatus::Read));
        assert_eq!(MessageStatus::parse("seen"), None);
        assert_eq!(MessageStatus::parse(""), None);
    }

    #[test]
    fn new_message_is_delivered() {
        let msg = Message::new("user1", "user2", "hello");
        assert_eq!(msg.status, MessageStatus::Delivered);
        assert!(!msg.id.is_empty());
    }

    #[test]
    fn other_participant_falls_back_to_empty() {
        let chat = Chat::new("user1", "user2");
        assert_eq!(chat.other_participant("user1"), "user2");
        assert_eq!(chat.other_participant("user2"), "user1");
        // A user outside the pair gets the first non-matching participant.
        assert_eq!(chat.other_participant("user3"), "user1");
    }

    #[test]
    fn status_serializes_lowercase() {
        let json = serde_json::to_string(&MessageStatus::Delivered).unwrap();
        assert_eq!(json, "\"delivered\"");
    }
}
