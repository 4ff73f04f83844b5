//! Error types for the Consult client core.
//!
//! Uses `thiserror` for public API error types with structured variants
//! covering the ask pipeline and configuration domains.

/// Top-level error type for the Consult core library.
#[derive(Debug, thiserror::Error)]
pub enum ConsultError {
    #[error("Ask error: {0}")]
    Ask(#[from] AskError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors from one logical ask request.
#[derive(Debug, thiserror::Error)]
pub enum AskError {
    /// The question was empty after trimming. No request is issued.
    #[error("Question must not be empty")]
    EmptyQuestion,

    /// The server answered with a non-success status outside the fallback
    /// triggers. Carries the server-provided body text when non-empty.
    #[error("Ask request failed: {message}")]
    Request { message: String },

    /// A protocol failure inside the event stream: an `error` event, a
    /// malformed payload, or an unreadable response body.
    #[error("Streaming error: {message}")]
    Stream { message: String },

    /// The single-shot response body was not a valid ask result.
    #[error("Response parse error: {message}")]
    ResponseParse { message: String },
}

/// Errors from the configuration system.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid API base URL: {url}")]
    InvalidBaseUrl { url: String },

    #[error("Configuration parse error: {message}")]
    ParseError { message: String },
}

/// A type alias for results using the top-level `ConsultError`.
pub type Result<T> = std::result::Result<T, ConsultError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_ask() {
        let err = ConsultError::Ask(AskError::Request {
            message: "HTTP 500: upstream exploded".into(),
        });
        assert_eq!(
            err.to_string(),
            "Ask error: Ask request failed: HTTP 500: upstream exploded"
        );
    }

    #[test]
    fn test_error_display_stream() {
        let err = AskError::Stream {
            message: "boom".into(),
        };
        assert_eq!(err.to_string(), "Streaming error: boom");
    }

    #[test]
    fn test_error_display_config() {
        let err = ConsultError::Config(ConfigError::InvalidBaseUrl {
            url: "not a url".into(),
        });
        assert_eq!(
            err.to_string(),
            "Configuration error: Invalid API base URL: not a url"
        );
    }

    #[test]
    fn test_error_from_serde() {
        let serde_err = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        let err: ConsultError = serde_err.into();
        assert!(matches!(err, ConsultError::Serialization(_)));
    }
}
