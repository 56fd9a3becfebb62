//! HTTP error types and handling

use futon_common::FutonError;
use thiserror::Error;

/// Transport-level errors
#[derive(Error, Debug)]
pub enum HttpError {
    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(String),

    /// Generic reqwest error
    #[error("HTTP error: {0}")]
    Reqwest(#[from] reqwest::Error),

    /// URL parse error
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),
}

/// Result type for transport operations
pub type HttpResult<T> = Result<T, HttpError>;

impl From<HttpError> for FutonError {
    fn from(err: HttpError) -> Self {
        match err {
            HttpError::Json(msg) => FutonError::Serialization(msg),
            other => FutonError::Transport(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_error_maps_to_serialization() {
        let err: FutonError = HttpError::Json("unexpected end of input".to_string()).into();
        assert!(matches!(err, FutonError::Serialization(_)));
    }

    #[test]
    fn test_url_error_maps_to_transport() {
        let parse_err = url::Url::parse("not a url").unwrap_err();
        let err: FutonError = HttpError::from(parse_err).into();
        assert!(matches!(err, FutonError::Transport(_)));
    }
}
