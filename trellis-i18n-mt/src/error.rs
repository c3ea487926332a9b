/// Error types for translation suggestions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MtError {
    /// Missing or invalid provider configuration
    ConfigError(String),
    /// Locale code rejected before any request was made
    InvalidLocale(String),
    /// The request never got a response (connection, DNS, TLS...)
    NetworkError(String),
    /// The provider refused the credential
    AuthError(String),
    /// The response could not be understood
    MalformedResponse(String),
    /// The provider answered with an error of its own
    ProviderError(String),
    /// No answer within the configured time
    Timeout,
}

impl MtError {
    /// Short category name, used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            MtError::ConfigError(_) => "config",
            MtError::InvalidLocale(_) => "invalid-locale",
            MtError::NetworkError(_) => "network",
            MtError::AuthError(_) => "auth",
            MtError::MalformedResponse(_) => "malformed-response",
            MtError::ProviderError(_) => "provider-error",
            MtError::Timeout => "timeout",
        }
    }

    /// Map a non-success HTTP status to an error
    pub(crate) fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let body: String = body.trim().chars().take(200).collect();
        let detail = if body.is_empty() {
            status.to_string()
        } else {
            format!("{}: {}", status, body)
        };
        match status.as_u16() {
            401 | 403 => MtError::AuthError(detail),
            _ => MtError::ProviderError(detail),
        }
    }
}

impl std::fmt::Display for MtError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MtError::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            MtError::InvalidLocale(msg) => write!(f, "Invalid locale: {}", msg),
            MtError::NetworkError(msg) => write!(f, "Network error: {}", msg),
            MtError::AuthError(msg) => write!(f, "Authentication failed: {}", msg),
            MtError::MalformedResponse(msg) => write!(f, "Malformed response: {}", msg),
            MtError::ProviderError(msg) => write!(f, "{}", msg),
            MtError::Timeout => write!(f, "timeout"),
        }
    }
}

impl std::error::Error for MtError {}

impl From<reqwest::Error> for MtError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            MtError::Timeout
        } else if err.is_decode() {
            MtError::MalformedResponse(err.to_string())
        } else {
            MtError::NetworkError(err.to_string())
        }
    }
}

impl From<serde_json::Error> for MtError {
    fn from(err: serde_json::Error) -> Self {
        MtError::MalformedResponse(err.to_string())
    }
}

/// Result type for MT operations
pub type MtResult<T> = Result<T, MtError>;

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_status_mapping() {
        assert!(matches!(
            MtError::from_status(StatusCode::UNAUTHORIZED, ""),
            MtError::AuthError(_)
        ));
        assert!(matches!(
            MtError::from_status(StatusCode::FORBIDDEN, "bad key"),
            MtError::AuthError(_)
        ));
        assert!(matches!(
            MtError::from_status(StatusCode::INTERNAL_SERVER_ERROR, "boom"),
            MtError::ProviderError(_)
        ));
    }

    #[test]
    fn test_status_detail_includes_body() {
        let err = MtError::from_status(StatusCode::TOO_MANY_REQUESTS, " quota exceeded \n");
        assert_eq!(err.to_string(), "429 Too Many Requests: quota exceeded");
    }

    #[test]
    fn test_timeout_message() {
        assert_eq!(MtError::Timeout.to_string(), "timeout");
        assert_eq!(MtError::Timeout.kind(), "timeout");
    }

    #[test]
    fn test_json_error_is_malformed() {
        let err: MtError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert_eq!(err.kind(), "malformed-response");
    }
}
