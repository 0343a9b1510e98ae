//! In-memory storage
//!
//! Owns the user set and the message/chat collections. Everything lives
//! for the lifetime of the process; there is no persistence.

pub mod memory;

pub use memory::ChatStore;
