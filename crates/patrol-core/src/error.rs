use thiserror::Error;

/// Application-wide error types for patrol.
#[derive(Error, Debug)]
pub enum AppError {
    /// HTTP request failed before a response could be read.
    #[error("HTTP error: {0}")]
    HttpError(String),

    /// Network/connection error (DNS, refused connection, reset).
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Request timed out.
    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    /// Browser automation (CDP) failure.
    #[error("Browser error: {0}")]
    BrowserError(String),

    /// A user-supplied parameter resolver failed.
    #[error("Resolver error: {0}")]
    ResolverError(String),

    /// A user-supplied outcome callback failed.
    #[error("Callback error: {0}")]
    CallbackError(String),

    /// JSON serialization/deserialization failed.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// File system operation failed (log sink, output paths).
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Generic error.
    #[error("{0}")]
    Generic(String),
}

impl AppError {
    /// Returns true if the error means no HTTP response was obtained.
    ///
    /// These are the errors the runner classifies as `transport-error`.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            AppError::HttpError(_) | AppError::NetworkError(_) | AppError::Timeout(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_errors() {
        assert!(AppError::NetworkError("reset".into()).is_transport());
        assert!(AppError::Timeout(30).is_transport());
        assert!(AppError::HttpError("bad gateway".into()).is_transport());
        assert!(!AppError::CallbackError("boom".into()).is_transport());
        assert!(!AppError::ResolverError("missing token".into()).is_transport());
    }
}
