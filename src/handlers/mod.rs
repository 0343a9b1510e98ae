//! HTTP handlers
//!
//! Thin axum wrappers over the services: extract, delegate, serialize.

pub mod chats;
pub mod messages;

pub use chats::{get_chat_metadata, list_chats};
pub use messages::{get_chat_messages, get_user_messages, send_message, update_message_status};
