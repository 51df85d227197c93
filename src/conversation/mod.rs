//! Bounded, in-memory conversation history.
//!
//! - `types`: conversation ids, roles and messages
//! - `store`: the capacity-bounded FIFO history per conversation
//! - `locks`: per-conversation serialization of chat turns

pub mod locks;
pub mod store;
pub mod types;

pub use locks::{ConversationGuard, ConversationLocks};
pub use store::{ConversationError, ConversationStore, DEFAULT_MAX_MESSAGES};
pub use types::{ConversationId, DEFAULT_CONVERSATION_ID, Message, Role};
