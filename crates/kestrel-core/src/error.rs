/// Errors that can occur across the Kestrel assistant.
///
/// Each variant maps to one branch of the error taxonomy, so callers can
/// branch on the failure kind without matching on message strings. Library
/// crates use this type directly; the binary crate converts to `miette`
/// diagnostics at the boundary.
///
/// # Examples
///
/// ```
/// use kestrel_core::KestrelError;
///
/// let err = KestrelError::Config("GROQ_API_KEY is required".into());
/// assert!(err.to_string().contains("GROQ_API_KEY"));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum KestrelError {
    /// Missing or invalid configuration, including an absent credential.
    /// Construction-time and fatal for that client instance.
    #[error("configuration error: {0}")]
    Config(String),

    /// Input rejected before any network call. Fully recoverable; the
    /// caller may fix the input and resubmit.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The completion endpoint answered but returned no choices.
    #[error("empty response from completion endpoint")]
    EmptyResponse,

    /// Transport or API failure. The message carries an operation-specific
    /// prefix followed by the original cause.
    #[error("{0}")]
    Analysis(String),

    /// Filesystem I/O failure.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization / deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML deserialization failure.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_displays_message() {
        let err = KestrelError::Config("no credential".into());
        assert_eq!(err.to_string(), "configuration error: no credential");
    }

    #[test]
    fn invalid_input_displays_message() {
        let err = KestrelError::InvalidInput("code cannot be empty".into());
        assert_eq!(err.to_string(), "invalid input: code cannot be empty");
    }

    #[test]
    fn empty_response_has_fixed_message() {
        assert_eq!(
            KestrelError::EmptyResponse.to_string(),
            "empty response from completion endpoint"
        );
    }

    #[test]
    fn analysis_error_passes_message_through() {
        let err = KestrelError::Analysis("Security check failed: timeout".into());
        assert_eq!(err.to_string(), "Security check failed: timeout");
    }

    #[test]
    fn io_error_converts() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: KestrelError = io_err.into();
        assert!(err.to_string().contains("gone"));
    }
}
