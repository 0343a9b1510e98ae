//! In-memory chat store.
//!
//! Collections keep insertion order (listings depend on it) with id and
//! participant-pair indexes layered on top for O(1) lookup. All access
//! goes through one `RwLock` so readers never observe a half-recorded
//! message, and find-or-create on a participant pair is atomic.

use std::collections::{HashMap, HashSet};

use parking_lot::RwLock;

use crate::models::{Chat, Message, MessageStatus};

/// Normalized key for an unordered participant pair.
fn pair_key(a: &str, b: &str) -> (String, String) {
    if a <= b {
        (a.to_string(), b.to_string())
    } else {
        (b.to_string(), a.to_string())
    }
}

#[derive(Default)]
struct Collections {
    messages: Vec<Message>,
    message_index: HashMap<String, usize>,
    chats: Vec<Chat>,
    chat_index: HashMap<String, usize>,
    pair_index: HashMap<(String, String), usize>,
}

impl Collections {
    fn push_message(&mut self, message: Message) {
        self.message_index
            .insert(message.id.clone(), self.messages.len());
        self.messages.push(message);
    }

    fn push_chat(&mut self, chat: Chat) {
        let key = pair_key(&chat.participants[0], &chat.participants[1]);
        self.chat_index.insert(chat.id.clone(), self.chats.len());
        self.pair_index.insert(key, self.chats.len());
        self.chats.push(chat);
    }
}

/// Process-wide store for users, messages and chats.
pub struct ChatStore {
    /// Known users, fixed at construction.
    users: HashSet<String>,
    inner: RwLock<Collections>,
}

impl ChatStore {
    pub fn new(users: impl IntoIterator<Item = String>) -> Self {
        Self {
            users: users.into_iter().collect(),
            inner: RwLock::new(Collections::default()),
        }
    }

    pub fn user_exists(&self, user_id: &str) -> bool {
        self.users.contains(user_id)
    }

    pub fn add_message(&self, message: Message) {
        self.inner.write().push_message(message);
    }

    pub fn find_message(&self, message_id: &str) -> Option<Message> {
        let inner = self.inner.read();
        inner
            .message_index
            .get(message_id)
            .map(|&idx| inner.messages[idx].clone())
    }

    /// Overwrite a message status unconditionally, returning the updated
    /// message. No transition order is enforced.
    pub fn update_message_status(
        &self,
        message_id: &str,
        status: MessageStatus,
    ) -> Option<Message> {
        let mut inner = self.inner.write();
        let idx = *inner.message_index.get(message_id)?;
        inner.messages[idx].status = status;
        Some(inner.messages[idx].clone())
    }

    pub fn find_chat(&self, chat_id: &str) -> Option<Chat> {
        let inner = self.inner.read();
        inner
            .chat_index
            .get(chat_id)
            .map(|&idx| inner.chats[idx].clone())
    }

    /// Look up the chat for an unordered participant pair.
    pub fn find_chat_by_pair(&self, a: &str, b: &str) -> Option<Chat> {
        let inner = self.inner.read();
        inner
            .pair_index
            .get(&pair_key(a, b))
            .map(|&idx| inner.chats[idx].clone())
    }

    pub fn add_chat(&self, chat: Chat) {
        self.inner.write().push_chat(chat);
    }

    pub fn append_message_to_chat(&self, chat_id: &str, message_id: &str) -> bool {
        let mut inner = self.inner.write();
        match inner.chat_index.get(chat_id).copied() {
            Some(idx) => {
                inner.chats[idx].message_ids.push(message_id.to_string());
                true
            }
            None => false,
        }
    }

    /// Persist a message and attach it to the chat for its participant
    /// pair, creating the chat if none exists yet. One write lock covers
    /// the whole operation so concurrent sends for the same pair cannot
    /// produce duplicate chats.
    pub fn record_message(&self, message: Message) -> Chat {
        let mut inner = self.inner.write();
        let key = pair_key(&message.sender, &message.recipient);
        let idx = match inner.pair_index.get(&key).copied() {
            Some(idx) => idx,
            None => {
                let chat = Chat::new(message.sender.clone(), message.recipient.clone());
                inner.push_chat(chat);
                inner.chats.len() - 1
            }
        };
        inner.chats[idx].message_ids.push(message.id.clone());
        inner.push_message(message);
        inner.chats[idx].clone()
    }

    /// All messages where the user is sender or recipient, in insertion
    /// order.
    pub fn messages_for_user(&self, user_id: &str) -> Vec<Message> {
        let inner = self.inner.read();
        inner
            .messages
            .iter()
            .filter(|m| m.sender == user_id || m.recipient == user_id)
            .cloned()
            .collect()
    }

    /// All chats containing the user, in insertion order.
    pub fn chats_with_participant(&self, user_id: &str) -> Vec<Chat> {
        let inner = self.inner.read();
        inner
            .chats
            .iter()
            .filter(|c| c.has_participant(user_id))
            .cloned()
            .collect()
    }

    /// A chat together with its messages in append order, resolved under
    /// a single read lock.
    pub fn chat_with_messages(&self, chat_id: &str) -> Option<(Chat, Vec<Message>)> {
        let inner = self.inner.read();
        let idx = *inner.chat_index.get(chat_id)?;
        let chat = inner.chats[idx].clone();
        let messages = chat
            .message_ids
            .iter()
            .filter_map(|id| inner.message_index.get(id))
            .map(|&i| inner.messages[i].clone())
            .collect();
        Some((chat, messages))
    }

    /// Clear messages and chats, keeping the user set. Test isolation
    /// hook.
    pub fn reset_all(&self) {
        *self.inner.write() = Collections::default();
    }
}
