//! Error types for completion providers.

use thiserror::Error;

/// Completion provider error type.
#[derive(Debug, Error)]
pub enum LlmError {
    /// No API key was configured for the provider.
    #[error("missing API key for completion provider")]
    MissingApiKey,
    /// Transport failure, including timeouts.
    #[error("http client error: {0}")]
    Http(#[from] reqwest::Error),
    /// The provider answered with a non-success status.
    #[error("{message}")]
    Api {
        /// HTTP status returned by the provider.
        status: u16,
        /// Provider error text, or the raw body when it carried none.
        message: String,
    },
    /// The provider returned no completion choices.
    #[error("completion provider returned no choices")]
    EmptyChoices,
    /// The provider response could not be interpreted.
    #[error("malformed completion response: {0}")]
    Malformed(String),
}

/// Convenience result alias for provider calls.
pub type LlmResult<T> = Result<T, LlmError>;
