//! Message creation, lookup and status updates.

use std::sync::Arc;

use crate::error::{Error, Result};
use crate::models::{Message, MessageStatus};
use crate::store::ChatStore;

pub struct MessageService {
    store: Arc<ChatStore>,
}

impl MessageService {
    pub fn new(store: Arc<ChatStore>) -> Self {
        Self { store }
    }

    /// Validate and persist a message, attaching it to the chat for its
    /// participant pair (created on first contact).
    pub fn send_message(&self, sender: &str, recipient: &str, content: &str) -> Result<Message> {
        if sender.is_empty() || recipient.is_empty() || content.is_empty() {
            return Err(Error::Validation(
                "Missing required fields: sender, recipient, and content are required".into(),
            ));
        }
        if !self.store.user_exists(sender) || !self.store.user_exists(recipient) {
            return Err(Error::InvalidUser("Invalid sender or recipient".into()));
        }
        if sender == recipient {
            return Err(Error::SelfMessage);
        }

        let message = Message::new(sender, recipient, content);
        self.store.record_message(message.clone());
        Ok(message)
    }

    /// Overwrite a message status. Any valid status is accepted at any
    /// time; there is no transition graph.
    pub fn update_status(&self, message_id: &str, status: &str) -> Result<Message> {
        let status = MessageStatus::parse(status).ok_or_else(|| {
            Error::Validation(
                "Invalid status. Status must be one of: delivered, read, failed".into(),
            )
        })?;
        self.store
            .update_message_status(message_id, status)
            .ok_or(Error::NotFound("Message"))
    }

    /// All messages sent or received by the user, in storage order.
    pub fn messages_for_user(&self, user_id: &str) -> Result<Vec<Message>> {
        if !self.store.user_exists(user_id) {
            return Err(Error::InvalidUser("Invalid user ID".into()));
        }
        Ok(self.store.messages_for_user(user_id))
    }

    /// A chat's messages sorted ascending by timestamp. The sort is
    /// stable, so equal timestamps keep append order.
    pub fn messages_for_chat(&self, chat_id: &str) -> Result<Vec<Message>> {
        let (_, mut messages) = self
            .store
            .chat_with_messages(chat_id)
            .ok_or(Error::NotFound("Chat"))?;
        messages.sort_by_key(|m| m.timestamp);
        Ok(messages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn service() -> MessageService {
        let store = Arc::new(ChatStore::new(
            ["user1", "user2", "user3"].map(String::from),
        ));
        MessageService::new(store)
    }

    #[test]
    fn send_creates_delivered_message_and_chat() {
        let svc = service();
        let msg = svc.send_message("user1", "user2", "hello").unwrap();

        assert_eq!(msg.status, MessageStatus::Delivered);
        let chat = svc.store.find_chat_by_pair("user1", "user2").unwrap();
        assert_eq!(chat.message_ids, vec![msg.id]);
        assert!(chat.participants.contains(&"user1".to_string()));
        assert!(chat.participants.contains(&"user2".to_string()));
    }

    #[test]
    fn second_send_reuses_the_chat() {
        let svc = service();
        svc.send_message("user1", "user2", "hello").unwrap();
        svc.send_message("user2", "user1", "hi").unwrap();

        let chats = svc.store.chats_with_participant("user1");
        assert_eq!(chats.len(), 1);
        assert_eq!(chats[0].message_ids.len(), 2);
    }

    #[test]
    fn validation_rejects_missing_fields() {
        let svc = service();
        assert!(matches!(
            svc.send_message("", "user2", "hello"),
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            svc.send_message("user1", "user2", ""),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn unknown_users_are_rejected() {
        let svc = service();
        assert!(matches!(
            svc.send_message("ghost", "user2", "hello"),
            Err(Error::InvalidUser(_))
        ));
        assert!(matches!(
            svc.send_message("user1", "ghost", "hello"),
            Err(Error::InvalidUser(_))
        ));
    }

    #[test]
    fn self_message_is_rejected() {
        let svc = service();
        assert!(matches!(
            svc.send_message("user1", "user1", "x"),
            Err(Error::SelfMessage)
        ));
        // No side effects from the rejected send.
        assert!(svc.store.messages_for_user("user1").is_empty());
    }

    #[test]
    fn update_status_validates_then_looks_up() {
        let svc = service();
        let msg = svc.send_message("user1", "user2", "hello").unwrap();

        assert!(matches!(
            svc.update_status(&msg.id, "seen"),
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            svc.update_status("missing", "read"),
            Err(Error::NotFound("Message"))
        ));
        let updated = svc.update_status(&msg.id, "read").unwrap();
        assert_eq!(updated.status, MessageStatus::Read);
    }

    #[test]
    fn messages_for_user_filters_by_participation() {
        let svc = service();
        svc.send_message("user1", "user2", "one").unwrap();
        svc.send_message("user2", "user3", "two").unwrap();

        assert_eq!(svc.messages_for_user("user1").unwrap().len(), 1);
        assert_eq!(svc.messages_for_user("user2").unwrap().len(), 2);
        assert!(matches!(
            svc.messages_for_user("ghost"),
            Err(Error::InvalidUser(_))
        ));
    }

    #[test]
    fn chat_messages_come_back_sorted_by_timestamp() {
        let svc = service();

        // Insert out of chronological order through the store directly.
        let mut early = Message::new("user1", "user2", "early");
        early.timestamp = Utc::now() - Duration::seconds(60);
        let late = Message::new("user1", "user2", "late");
        let chat = svc.store.record_message(late.clone());
        svc.store.record_message(early.clone());

        let messages = svc.messages_for_chat(&chat.id).unwrap();
        assert_eq!(messages[0].id, early.id);
        assert_eq!(messages[1].id, late.id);

        assert!(matches!(
            svc.messages_for_chat("missing"),
            Err(Error::NotFound("Chat"))
        ));
    }
}
