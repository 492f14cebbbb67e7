use thiserror::Error;

/// Strategy-level error taxonomy.
///
/// Every failure inside the cascade is one of three kinds: a selector or
/// regex produced nothing, the network said no, or a response could not be
/// parsed. Non-2xx statuses get their own variant so logs keep the code,
/// but they are the same category as `Network` for cascade purposes:
/// all of them are logged and swallowed by the orchestrator, never
/// surfaced to the caller.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// Selector or regex matched nothing.
    #[error("not found: {0}")]
    NotFound(String),

    /// Request failed to complete.
    #[error("network failure: {0}")]
    Network(String),

    /// Request completed with a non-2xx status.
    #[error("HTTP status {0}")]
    Status(reqwest::StatusCode),

    /// JSON parse failure or absent capture group in structured content.
    #[error("parse failure: {0}")]
    Parse(String),
}

impl ResolveError {
    /// Short label for log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            ResolveError::NotFound(_) => "not_found",
            ResolveError::Network(_) | ResolveError::Status(_) => "network",
            ResolveError::Parse(_) => "parse",
        }
    }
}

impl From<reqwest::Error> for ResolveError {
    fn from(err: reqwest::Error) -> Self {
        ResolveError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for ResolveError {
    fn from(err: serde_json::Error) -> Self {
        ResolveError::Parse(err.to_string())
    }
}

/// Centralized error type for the binary and library surface.
#[derive(Error, Debug)]
pub enum AppError {
    /// Cascade-internal errors, when a caller opts into seeing them.
    #[error("resolve error: {0}")]
    Resolve(#[from] ResolveError),

    /// HTTP/Fetch errors outside the cascade (CLI page fetch).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// HTTP status code errors.
    #[error("HTTP request failed with status: {0}")]
    HttpStatus(reqwest::StatusCode),

    /// IO errors.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// URL parsing errors.
    #[error("URL parsing error: {0}")]
    Url(#[from] url::ParseError),

    /// Anyhow errors (for general error handling).
    #[error("Application error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

/// Type alias for Result with AppError.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_error_kinds() {
        assert_eq!(ResolveError::NotFound("x".into()).kind(), "not_found");
        assert_eq!(ResolveError::Network("x".into()).kind(), "network");
        assert_eq!(ResolveError::Status(reqwest::StatusCode::NOT_FOUND).kind(), "network");
        assert_eq!(ResolveError::Parse("x".into()).kind(), "parse");
    }

    #[test]
    fn test_resolve_error_display() {
        let err = ResolveError::Status(reqwest::StatusCode::FORBIDDEN);
        assert_eq!(err.to_string(), "HTTP status 403 Forbidden");
    }

    #[test]
    fn test_json_error_maps_to_parse() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: ResolveError = json_err.into();
        assert_eq!(err.kind(), "parse");
    }
}
