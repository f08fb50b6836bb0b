//! Test utilities: mock implementations of the runner's trait seams.
//!
//! Handwritten mocks for dependency injection in unit tests. Mocks use
//! `Arc<Mutex<_>>` for interior mutability, allowing test assertions on
//! recorded calls.

use std::sync::{Arc, Mutex};

use serde_json::{Value, json};

use crate::endpoint::Method;
use crate::error::AppError;
use crate::outcome::OutcomeRecord;
use crate::traits::{CallResponse, Caller, ErrorSink};

// ---------------------------------------------------------------------------
// MockCaller
// ---------------------------------------------------------------------------

/// One call the mock received, as the runner issued it.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub method: Method,
    pub url: String,
    pub params: Value,
    pub data: Value,
}

/// Mock caller that pops scripted responses and records every call.
///
/// If the script runs out, further calls return a 200 `{"status": 1}`
/// response.
#[derive(Clone)]
pub struct MockCaller {
    responses: Arc<Mutex<Vec<Result<CallResponse, AppError>>>>,
    pub calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl MockCaller {
    /// Every call succeeds with the given status and body.
    pub fn ok(status: u16, body: Value) -> Self {
        Self::with_responses(vec![Ok(CallResponse { status, body })])
    }

    /// The first call fails with the given transport error.
    pub fn with_error(error: AppError) -> Self {
        Self::with_responses(vec![Err(error)])
    }

    pub fn with_responses(responses: Vec<Result<CallResponse, AppError>>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(responses)),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl Caller for MockCaller {
    async fn call(
        &self,
        method: Method,
        url: &str,
        params: &Value,
        data: &Value,
    ) -> Result<CallResponse, AppError> {
        self.calls.lock().unwrap().push(RecordedCall {
            method,
            url: url.to_string(),
            params: params.clone(),
            data: data.clone(),
        });

        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            Ok(CallResponse {
                status: 200,
                body: json!({"status": 1}),
            })
        } else {
            responses.remove(0)
        }
    }
}

// ---------------------------------------------------------------------------
// MemorySink
// ---------------------------------------------------------------------------

/// Sink that keeps appended records in memory for assertions.
#[derive(Clone, Default)]
pub struct MemorySink {
    pub records: Arc<Mutex<Vec<OutcomeRecord>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_count(&self) -> usize {
        self.records.lock().unwrap().len()
    }
}

impl ErrorSink for MemorySink {
    fn append(&mut self, record: &OutcomeRecord) -> Result<(), AppError> {
        self.records.lock().unwrap().push(record.clone());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// FailingSink
// ---------------------------------------------------------------------------

/// Sink whose appends always fail, for fault-isolation tests.
#[derive(Debug, Clone, Default)]
pub struct FailingSink;

impl ErrorSink for FailingSink {
    fn append(&mut self, _record: &OutcomeRecord) -> Result<(), AppError> {
        Err(AppError::Generic("sink append failed".into()))
    }
}
