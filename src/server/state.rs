//! Application state shared across all request handlers.

use std::sync::Arc;

use crate::config::RelayConfig;
use crate::conversation::{ConversationError, ConversationLocks, ConversationStore};
use crate::llm::{CompletionProvider, LlmError, OpenAiClient};

/// Errors raised while assembling application state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    /// The conversation store could not be built.
    #[error("conversation store: {0}")]
    Store(#[from] ConversationError),
    /// The completion provider could not be built.
    #[error("completion provider: {0}")]
    Provider(#[from] LlmError),
}

/// Shared application state.
pub struct AppState {
    /// Conversation history for every conversation id.
    pub store: ConversationStore,
    /// Serializes chat turns per conversation id.
    pub locks: ConversationLocks,
    /// Provider every chat turn is forwarded to.
    pub provider: Arc<dyn CompletionProvider>,
    /// Model name to use.
    pub model: String,
    /// System message prepended to each context, if any.
    pub system_prompt: Option<String>,
}

impl AppState {
    /// Assemble state from explicit parts.
    #[must_use]
    pub fn new(
        store: ConversationStore,
        provider: Arc<dyn CompletionProvider>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            store,
            locks: ConversationLocks::new(),
            provider,
            model: model.into(),
            system_prompt: None,
        }
    }

    /// Set the system message prepended to each context.
    #[must_use]
    pub fn with_system_prompt(mut self, system_prompt: Option<String>) -> Self {
        self.system_prompt = system_prompt;
        self
    }

    /// Build state from configuration, talking to an OpenAI-compatible API.
    ///
    /// # Errors
    /// Returns an error if the store capacity is invalid or the HTTP client
    /// cannot be created.
    pub fn from_config(config: &RelayConfig) -> Result<Arc<Self>, StateError> {
        let store = ConversationStore::new(config.max_messages)?;
        let provider = OpenAiClient::new(
            &config.base_url,
            &config.api_key,
            config.request_timeout(),
        )?;

        let state = Self::new(store, Arc::new(provider), config.model.clone())
            .with_system_prompt(config.system_prompt.clone());
        Ok(Arc::new(state))
    }
}
