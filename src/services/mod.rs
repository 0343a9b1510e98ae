//! Domain services over the store.
//!
//! `MessageService` owns message creation, chat resolution and status
//! transitions; `ChatQueryService` owns the derived per-user and
//! per-chat views. Both return typed errors for the HTTP layer to
//! translate.

pub mod chats;
pub mod messages;

pub use chats::ChatQueryService;
pub use messages::MessageService;
