/// Error types for skin resolution
use thiserror::Error;

/// Errors raised while talking to skin providers or building the resolver
///
/// These never escape the resolver's public lookups, which degrade every
/// failure to "no skin resolved". They are returned by providers and by
/// configuration/construction code.
#[derive(Error, Debug)]
pub enum SkinError {
    /// Connection, timeout or body read failure
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Body was not valid JSON of the expected shape
    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// JSON parsed but a required field was missing
    #[error("Malformed response from {provider}: {reason}")]
    MalformedResponse {
        provider: &'static str,
        reason: String,
    },

    /// Non-success status without a recognised error marker
    #[error("{provider} returned unexpected status {status}")]
    UnexpectedStatus { provider: &'static str, status: u16 },

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl SkinError {
    pub(crate) fn malformed(provider: &'static str, reason: impl Into<String>) -> Self {
        SkinError::MalformedResponse {
            provider,
            reason: reason.into(),
        }
    }
}

/// Result type alias for skin operations
pub type SkinResult<T> = Result<T, SkinError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = SkinError::malformed("mojang", "missing id");
        assert_eq!(err.to_string(), "Malformed response from mojang: missing id");

        let err = SkinError::UnexpectedStatus {
            provider: "ashcon",
            status: 503,
        };
        assert_eq!(err.to_string(), "ashcon returned unexpected status 503");
    }

    #[test]
    fn test_decode_error_conversion() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: SkinError = parse_err.into();
        assert!(matches!(err, SkinError::Decode(_)));
    }
}
