use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::KestrelError;

/// Environment variable consulted for the API credential when the config
/// file does not provide one.
pub const API_KEY_ENV: &str = "GROQ_API_KEY";

/// Top-level configuration loaded from `.kestrel.toml`.
///
/// # Examples
///
/// ```
/// use kestrel_core::KestrelConfig;
///
/// let config = KestrelConfig::default();
/// assert!(config.llm.api_key.is_none());
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KestrelConfig {
    /// Completion endpoint settings.
    #[serde(default)]
    pub llm: LlmConfig,
}

impl KestrelConfig {
    /// Load configuration from a TOML file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`KestrelError::Io`] if the file cannot be read, or
    /// [`KestrelError::Toml`] if the content is not valid TOML.
    pub fn from_file(path: &Path) -> Result<Self, KestrelError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns [`KestrelError::Toml`] if parsing fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use kestrel_core::KestrelConfig;
    ///
    /// let toml = r#"
    /// [llm]
    /// api_key = "gsk-test"
    /// "#;
    /// let config = KestrelConfig::from_toml(toml).unwrap();
    /// assert_eq!(config.llm.api_key.as_deref(), Some("gsk-test"));
    /// ```
    pub fn from_toml(content: &str) -> Result<Self, KestrelError> {
        let config: Self = toml::from_str(content)?;
        Ok(config)
    }
}

/// Completion endpoint configuration.
///
/// The model identifier and sampling temperature are pinned constants in
/// `kestrel-review`, not configuration. Only the credential and an
/// optional endpoint override are configurable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LlmConfig {
    /// API key for the completion endpoint.
    pub api_key: Option<String>,
    /// Custom base URL for an OpenAI-compatible endpoint.
    pub base_url: Option<String>,
}

impl LlmConfig {
    /// Fill a missing `api_key` from the [`API_KEY_ENV`] environment
    /// variable.
    ///
    /// The environment is consulted here, once, at the call site that
    /// builds the config — never inside the review client itself.
    ///
    /// # Examples
    ///
    /// ```
    /// use kestrel_core::LlmConfig;
    ///
    /// let config = LlmConfig {
    ///     api_key: Some("gsk-explicit".into()),
    ///     base_url: None,
    /// };
    /// // An explicit key is never overwritten.
    /// let resolved = config.with_env_fallback();
    /// assert_eq!(resolved.api_key.as_deref(), Some("gsk-explicit"));
    /// ```
    pub fn with_env_fallback(mut self) -> Self {
        if self.api_key.is_none() {
            self.api_key = std::env::var(API_KEY_ENV).ok();
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_no_credential() {
        let config = KestrelConfig::default();
        assert!(config.llm.api_key.is_none());
        assert!(config.llm.base_url.is_none());
    }

    #[test]
    fn parse_full_toml() {
        let toml = r#"
[llm]
api_key = "gsk-abc123"
base_url = "http://localhost:11434"
"#;
        let config = KestrelConfig::from_toml(toml).unwrap();
        assert_eq!(config.llm.api_key.as_deref(), Some("gsk-abc123"));
        assert_eq!(config.llm.base_url.as_deref(), Some("http://localhost:11434"));
    }

    #[test]
    fn empty_toml_gives_defaults() {
        let config = KestrelConfig::from_toml("").unwrap();
        assert!(config.llm.api_key.is_none());
    }

    #[test]
    fn invalid_toml_returns_error() {
        let result = KestrelConfig::from_toml("{{invalid}}");
        assert!(result.is_err());
    }

    #[test]
    fn env_fallback_keeps_explicit_key() {
        let config = LlmConfig {
            api_key: Some("gsk-explicit".into()),
            base_url: None,
        };
        let resolved = config.with_env_fallback();
        assert_eq!(resolved.api_key.as_deref(), Some("gsk-explicit"));
    }
}
