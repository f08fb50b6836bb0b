use std::future::Future;

use serde_json::Value;

use crate::endpoint::Method;
use crate::error::AppError;
use crate::outcome::OutcomeRecord;

/// An HTTP response as the runner sees it: status code plus the body,
/// parsed as JSON when possible and kept as a raw string otherwise.
#[derive(Debug, Clone, PartialEq)]
pub struct CallResponse {
    pub status: u16,
    pub body: Value,
}

/// Issues a single HTTP call against a fully composed URL.
///
/// `Ok` means *some* HTTP response was received, whatever its status;
/// status handling belongs to the runner's classification step. `Err`
/// means transport failure: no response was obtained at all.
pub trait Caller: Send + Sync + Clone {
    fn call(
        &self,
        method: Method,
        url: &str,
        params: &Value,
        data: &Value,
    ) -> impl Future<Output = Result<CallResponse, AppError>> + Send;
}

/// Receives anomalous call outcomes from the runner.
///
/// Invoked from a single logical sequence; implementations need no
/// internal locking under that contract.
pub trait ErrorSink {
    fn append(&mut self, record: &OutcomeRecord) -> Result<(), AppError>;
}

/// A no-op ErrorSink for runs where anomalies only need console output.
#[derive(Debug, Clone, Default)]
pub struct NullSink;

impl ErrorSink for NullSink {
    fn append(&mut self, _record: &OutcomeRecord) -> Result<(), AppError> {
        Ok(())
    }
}
