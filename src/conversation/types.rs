//! Types for conversation history.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Conversation id used when the client does not supply one.
pub const DEFAULT_CONVERSATION_ID: &str = "default";

/// Client-supplied key partitioning history into independent logs.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(transparent)]
#[serde(transparent)]
pub struct ConversationId(String);

impl ConversationId {
    /// Wrap an arbitrary string as a conversation id.
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow as `&str`.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ConversationId {
    fn default() -> Self {
        Self(DEFAULT_CONVERSATION_ID.to_string())
    }
}

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for ConversationId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ConversationId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Author of a chat message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Instructions for the model.
    System,
    /// Message written by the end user.
    User,
    /// Message produced by the completion provider.
    Assistant,
}

impl Role {
    /// Wire name of the role.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One turn in a conversation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Who wrote the message.
    pub role: Role,
    /// Message text.
    pub content: String,
}

impl Message {
    /// Create a message with an explicit role.
    #[must_use]
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    /// Create a system message.
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    /// Create a user message.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Create an assistant message.
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_conversation_id() {
        assert_eq!(ConversationId::default().as_str(), "default");
    }

    #[test]
    fn test_message_wire_format() {
        let json = serde_json::to_value(Message::user("hi")).unwrap_or_default();
        assert_eq!(json, serde_json::json!({"role": "user", "content": "hi"}));
    }

    #[test]
    fn test_unknown_role_rejected() {
        let parsed = serde_json::from_str::<Message>(r#"{"role":"wizard","content":"x"}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_conversation_id_is_transparent() {
        let id: ConversationId = serde_json::from_str(r#""s1""#).unwrap_or_default();
        assert_eq!(id, ConversationId::from("s1"));
    }
}
