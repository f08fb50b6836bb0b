use std::fmt;

use serde_json::Value;

use crate::endpoint::Method;

/// Anomaly category assigned to a call outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// No HTTP response was obtained (network, DNS, timeout), or a
    /// user-supplied hook failed.
    TransportError,
    /// A response arrived with a status other than 200.
    HttpStatus,
    /// A 200 response whose body-level `status` field is not 1.
    BusinessStatus,
}

impl Classification {
    pub fn as_str(&self) -> &'static str {
        match self {
            Classification::TransportError => "transport-error",
            Classification::HttpStatus => "http-status",
            Classification::BusinessStatus => "business-status",
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// HTTP status of a call attempt, or the sentinel for no response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseStatus {
    Code(u16),
    NoResponse,
}

impl fmt::Display for ResponseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResponseStatus::Code(code) => write!(f, "{code}"),
            ResponseStatus::NoResponse => f.write_str("NO_RESPONSE"),
        }
    }
}

/// Everything the error log needs to know about one anomalous call.
///
/// Created per call attempt and handed straight to the sink; not
/// retained by the runner.
#[derive(Debug, Clone)]
pub struct OutcomeRecord {
    pub endpoint: String,
    pub url: String,
    pub method: Method,
    pub params: Value,
    pub data: Value,
    pub status: ResponseStatus,
    pub response: Value,
    pub elapsed_ms: u64,
    pub classification: Classification,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification_tags() {
        assert_eq!(Classification::TransportError.as_str(), "transport-error");
        assert_eq!(Classification::HttpStatus.as_str(), "http-status");
        assert_eq!(Classification::BusinessStatus.as_str(), "business-status");
    }

    #[test]
    fn test_status_display() {
        assert_eq!(ResponseStatus::Code(404).to_string(), "404");
        assert_eq!(ResponseStatus::NoResponse.to_string(), "NO_RESPONSE");
    }
}
