//! Relay configuration loaded from the environment.

use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;
use url::Url;

use crate::conversation::DEFAULT_MAX_MESSAGES;
use crate::llm::DEFAULT_OPENAI_BASE_URL;

/// Default server port.
pub const DEFAULT_PORT: u16 = 3000;
/// Model every chat turn is sent to unless overridden.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
/// Default provider request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

const PORT_ENV: &str = "RELAY_PORT";
const MODEL_ENV: &str = "RELAY_MODEL";
const MAX_MESSAGES_ENV: &str = "RELAY_MAX_MESSAGES";
const SYSTEM_PROMPT_ENV: &str = "RELAY_SYSTEM_PROMPT";
const REQUEST_TIMEOUT_ENV: &str = "RELAY_REQUEST_TIMEOUT_SECS";
const API_KEY_ENV: &str = "OPENAI_API_KEY";
const BASE_URL_ENV: &str = "OPENAI_BASE_URL";

/// Configuration errors. All of them are fatal at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An environment variable could not be parsed.
    #[error("invalid value for {key}: {value:?}")]
    InvalidValue {
        /// Variable name.
        key: &'static str,
        /// Raw value found in the environment.
        value: String,
    },
    /// A value parsed but is out of range.
    #[error("invalid configuration: {0}")]
    Invalid(String),
    /// The provider base URL is not a valid URL.
    #[error("url parse error: {0}")]
    Url(#[from] url::ParseError),
}

/// Settings for the relay process.
#[derive(Clone, Debug)]
pub struct RelayConfig {
    /// Port the HTTP server listens on.
    pub port: u16,
    /// Model identifier sent with every completion request.
    pub model: String,
    /// Messages retained per conversation.
    pub max_messages: usize,
    /// Optional system message prepended to every context; never stored.
    pub system_prompt: Option<String>,
    /// Timeout for one completion request, in seconds.
    pub request_timeout_secs: u64,
    /// Bearer token for the completion provider.
    pub api_key: String,
    /// Root URL of the OpenAI-compatible API.
    pub base_url: String,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            model: DEFAULT_MODEL.to_string(),
            max_messages: DEFAULT_MAX_MESSAGES,
            system_prompt: None,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            api_key: String::new(),
            base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
        }
    }
}

impl RelayConfig {
    /// Load configuration from process environment variables.
    ///
    /// # Errors
    /// Returns an error if a variable is set to an unparsable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// Unset or blank variables keep their defaults.
    ///
    /// # Errors
    /// Returns an error if a variable is set to an unparsable value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let mut config = Self::default();

        if let Some(port) = parse_var(&get, PORT_ENV)? {
            config.port = port;
        }
        if let Some(model) = get(MODEL_ENV) {
            config.model = model;
        }
        if let Some(max_messages) = parse_var(&get, MAX_MESSAGES_ENV)? {
            config.max_messages = max_messages;
        }
        config.system_prompt = get(SYSTEM_PROMPT_ENV);
        if let Some(timeout) = parse_var(&get, REQUEST_TIMEOUT_ENV)? {
            config.request_timeout_secs = timeout;
        }
        if let Some(api_key) = get(API_KEY_ENV) {
            config.api_key = api_key;
        }
        if let Some(base_url) = get(BASE_URL_ENV) {
            config.base_url = base_url;
        }

        Ok(config)
    }

    /// Validate configuration invariants.
    ///
    /// # Errors
    /// Returns an error if any values are out of range or invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_messages == 0 {
            return Err(ConfigError::Invalid(format!("{MAX_MESSAGES_ENV} must be > 0")));
        }

        if self.model.trim().is_empty() {
            return Err(ConfigError::Invalid(format!("{MODEL_ENV} must not be empty")));
        }

        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid(format!(
                "{REQUEST_TIMEOUT_ENV} must be > 0"
            )));
        }

        if self.api_key.trim().is_empty() {
            return Err(ConfigError::Invalid(format!("{API_KEY_ENV} must be set")));
        }

        Url::parse(&self.base_url)?;

        Ok(())
    }

    /// Provider request timeout.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn parse_var<T, G>(get: &G, key: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    G: Fn(&str) -> Option<String>,
{
    get(key)
        .map(|raw| {
            raw.trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue { key, value: raw })
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = RelayConfig::from_lookup(lookup(&[])).unwrap_or_default();
        assert_eq!(config.port, 3000);
        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.max_messages, 5);
        assert_eq!(config.base_url, DEFAULT_OPENAI_BASE_URL);
        assert!(config.system_prompt.is_none());
    }

    #[test]
    fn test_overrides_from_environment() {
        let config = RelayConfig::from_lookup(lookup(&[
            ("RELAY_PORT", "8080"),
            ("RELAY_MAX_MESSAGES", "12"),
            ("RELAY_SYSTEM_PROMPT", "You are an academic advisor."),
            ("OPENAI_API_KEY", "sk-test"),
            ("OPENAI_BASE_URL", "http://localhost:11434/v1"),
        ]))
        .unwrap_or_default();

        assert_eq!(config.port, 8080);
        assert_eq!(config.max_messages, 12);
        assert_eq!(
            config.system_prompt.as_deref(),
            Some("You are an academic advisor.")
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_unparsable_value_rejected() {
        let result = RelayConfig::from_lookup(lookup(&[("RELAY_PORT", "http")]));
        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue { key: "RELAY_PORT", .. })
        ));
    }

    #[test]
    fn test_validate_rejects_zero_capacity() {
        let config = RelayConfig {
            max_messages: 0,
            api_key: "sk-test".to_string(),
            ..RelayConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_requires_api_key() {
        assert!(RelayConfig::default().validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_base_url() {
        let config = RelayConfig {
            api_key: "sk-test".to_string(),
            base_url: "not a url".to_string(),
            ..RelayConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Url(_))));
    }
}
