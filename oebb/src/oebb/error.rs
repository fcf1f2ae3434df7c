//! ÖBB client error types.

use super::convert::ConversionError;

/// Status code the ticket API uses for "login time-out".
pub(crate) const SESSION_EXPIRED_STATUS: u16 = 440;

/// Errors from the ÖBB HTTP client.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// HTTP request failed (network error, timeout, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider rejected the credentials with its session time-out status
    #[error("session expired")]
    SessionExpired,

    /// API returned an unexpected status code
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// JSON deserialization failed
    #[error("JSON parse error: {message}")]
    Json {
        message: String,
        body: Option<String>,
    },

    /// Response decoded but contained invalid values
    #[error(transparent)]
    Conversion(#[from] ConversionError),

    /// A credential value cannot be sent as an HTTP header
    #[error("credential field {0} is not a valid header value")]
    InvalidHeader(&'static str),
}

impl ApiError {
    /// Whether the provider signalled an expired session.
    pub fn is_session_expired(&self) -> bool {
        matches!(self, ApiError::SessionExpired)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ApiError::SessionExpired;
        assert_eq!(err.to_string(), "session expired");
        assert!(err.is_session_expired());

        let err = ApiError::Api {
            status: 500,
            message: "Internal Server Error".into(),
        };
        assert_eq!(err.to_string(), "API error 500: Internal Server Error");
        assert!(!err.is_session_expired());

        let err = ApiError::Json {
            message: "expected value".into(),
            body: Some("<html>".into()),
        };
        assert!(err.to_string().contains("JSON parse error"));
        assert!(err.to_string().contains("expected value"));

        let err = ApiError::InvalidHeader("AccessToken");
        assert_eq!(
            err.to_string(),
            "credential field AccessToken is not a valid header value"
        );
    }
}
