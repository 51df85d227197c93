//! Capacity-bounded conversation history store.

use std::collections::VecDeque;
use std::num::NonZeroUsize;

use dashmap::DashMap;
use thiserror::Error;
use tracing::debug;

use super::types::{ConversationId, Message};

/// Number of messages retained per conversation when not configured.
pub const DEFAULT_MAX_MESSAGES: usize = 5;

/// Errors raised while building a conversation store.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConversationError {
    /// The per-conversation capacity must be at least one message.
    #[error("max_messages must be > 0")]
    InvalidCapacity,
}

/// In-memory history keyed by conversation id.
///
/// Each conversation keeps at most `max_messages` messages. Appending past the
/// bound drops the oldest message first. History lives for the lifetime of the
/// process only.
#[derive(Debug)]
pub struct ConversationStore {
    conversations: DashMap<ConversationId, VecDeque<Message>>,
    max_messages: NonZeroUsize,
}

impl ConversationStore {
    /// Create a store retaining at most `max_messages` per conversation.
    ///
    /// # Errors
    /// Returns [`ConversationError::InvalidCapacity`] if `max_messages` is zero.
    pub fn new(max_messages: usize) -> Result<Self, ConversationError> {
        let max_messages =
            NonZeroUsize::new(max_messages).ok_or(ConversationError::InvalidCapacity)?;
        Ok(Self::with_capacity(max_messages))
    }

    /// Create a store from an already validated capacity.
    #[must_use]
    pub fn with_capacity(max_messages: NonZeroUsize) -> Self {
        Self {
            conversations: DashMap::new(),
            max_messages,
        }
    }

    /// Maximum number of messages kept per conversation.
    #[must_use]
    pub const fn max_messages(&self) -> usize {
        self.max_messages.get()
    }

    /// Append one message to the end of a conversation, evicting from the front
    /// if the conversation grows past capacity.
    pub fn append(&self, id: &ConversationId, message: Message) {
        let mut entry = self.conversations.entry(id.clone()).or_default();
        self.push_bounded(id, &mut entry, message);
    }

    /// Append several messages in order while holding the conversation entry.
    ///
    /// Eviction runs after every push, so the result equals calling
    /// [`append`](Self::append) once per message.
    pub fn append_all<I>(&self, id: &ConversationId, messages: I)
    where
        I: IntoIterator<Item = Message>,
    {
        let mut entry = self.conversations.entry(id.clone()).or_default();
        for message in messages {
            self.push_bounded(id, &mut entry, message);
        }
    }

    /// Current history of a conversation, oldest first.
    ///
    /// Unknown ids yield an empty history. The returned vector is a copy.
    #[must_use]
    pub fn retrieve(&self, id: &ConversationId) -> Vec<Message> {
        self.conversations
            .get(id)
            .map(|history| history.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Reset a conversation to an empty history.
    pub fn clear(&self, id: &ConversationId) {
        self.conversations.entry(id.clone()).or_default().clear();
        debug!("Cleared conversation {id}");
    }

    /// Number of messages currently held for a conversation.
    #[must_use]
    pub fn len(&self, id: &ConversationId) -> usize {
        self.conversations.get(id).map_or(0, |history| history.len())
    }

    /// Whether a conversation currently holds no messages.
    #[must_use]
    pub fn is_empty(&self, id: &ConversationId) -> bool {
        self.len(id) == 0
    }

    /// Number of conversation ids known to the store.
    #[must_use]
    pub fn conversation_count(&self) -> usize {
        self.conversations.len()
    }

    fn push_bounded(&self, id: &ConversationId, history: &mut VecDeque<Message>, message: Message) {
        history.push_back(message);
        while history.len() > self.max_messages.get() {
            history.pop_front();
            debug!("Evicted oldest message from conversation {id}");
        }
    }
}

impl Default for ConversationStore {
    fn default() -> Self {
        Self::with_capacity(NonZeroUsize::new(DEFAULT_MAX_MESSAGES).unwrap_or(NonZeroUsize::MIN))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered(n: usize) -> Message {
        Message::user(format!("m{n}"))
    }

    #[test]
    fn test_zero_capacity_rejected() {
        assert_eq!(
            ConversationStore::new(0).err(),
            Some(ConversationError::InvalidCapacity)
        );
    }

    #[test]
    fn test_default_capacity() {
        assert_eq!(ConversationStore::default().max_messages(), 5);
    }

    #[test]
    fn test_unknown_id_reads_empty() {
        let store = ConversationStore::default();
        assert!(store.retrieve(&ConversationId::from("never-seen")).is_empty());
        assert_eq!(store.conversation_count(), 0);
    }

    #[test]
    fn test_length_stays_bounded() {
        let store = ConversationStore::new(3).unwrap_or_default();
        let id = ConversationId::from("a");
        for n in 0..20 {
            store.append(&id, numbered(n));
            assert!(store.retrieve(&id).len() <= 3);
        }
    }

    #[test]
    fn test_fifo_eviction_keeps_latest() {
        let store = ConversationStore::default();
        let id = ConversationId::from("x");
        for n in 1..=6 {
            store.append(&id, numbered(n));
        }

        let expected: Vec<Message> = (2..=6).map(numbered).collect();
        assert_eq!(store.retrieve(&id), expected);
    }

    #[test]
    fn test_append_all_matches_single_appends() {
        let batched = ConversationStore::new(4).unwrap_or_default();
        let single = ConversationStore::new(4).unwrap_or_default();
        let id = ConversationId::from("x");

        batched.append_all(&id, (0..7).map(numbered));
        for n in 0..7 {
            single.append(&id, numbered(n));
        }

        assert_eq!(batched.retrieve(&id), single.retrieve(&id));
        assert_eq!(batched.len(&id), 4);
    }

    #[test]
    fn test_clear_resets_history() {
        let store = ConversationStore::default();
        let id = ConversationId::from("a");
        store.append(&id, numbered(1));
        store.clear(&id);
        assert!(store.retrieve(&id).is_empty());
        assert!(store.is_empty(&id));
    }

    #[test]
    fn test_conversations_are_isolated() {
        let store = ConversationStore::default();
        let a = ConversationId::from("a");
        let b = ConversationId::from("b");
        store.append(&b, numbered(0));
        for n in 1..=10 {
            store.append(&a, numbered(n));
        }
        store.clear(&a);

        assert_eq!(store.retrieve(&b), vec![numbered(0)]);
    }

    #[test]
    fn test_retrieve_returns_a_copy() {
        let store = ConversationStore::default();
        let id = ConversationId::from("a");
        store.append(&id, numbered(1));

        let mut copy = store.retrieve(&id);
        copy.push(numbered(2));
        copy[0].content = "tampered".to_string();

        assert_eq!(store.retrieve(&id), vec![numbered(1)]);
    }
}
