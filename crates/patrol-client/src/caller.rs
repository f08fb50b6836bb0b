use std::time::Duration;

use patrol_core::endpoint::Method;
use patrol_core::error::AppError;
use patrol_core::traits::{CallResponse, Caller};
use reqwest::Client;
use serde_json::Value;
use url::Url;

/// HTTP caller using reqwest.
///
/// Issues GET requests with the resolved params as the query string and
/// POST requests with the resolved data as a JSON body. Any HTTP
/// response is returned as `Ok` whatever its status; only transport
/// failures (DNS, refused connection, timeout) surface as errors, since
/// status handling belongs to the runner's classification step.
#[derive(Clone)]
pub struct ReqwestCaller {
    client: Client,
    timeout_secs: u64,
}

impl ReqwestCaller {
    pub fn new() -> Result<Self, AppError> {
        Self::with_timeout(Duration::from_secs(30))
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, AppError> {
        let timeout_secs = timeout.as_secs();
        let client = Client::builder()
            .user_agent("patrol/0.2 (API smoke tester)")
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::HttpError(e.to_string()))?;

        Ok(Self {
            client,
            timeout_secs,
        })
    }
}

impl Caller for ReqwestCaller {
    async fn call(
        &self,
        method: Method,
        url: &str,
        params: &Value,
        data: &Value,
    ) -> Result<CallResponse, AppError> {
        Url::parse(url).map_err(|e| AppError::HttpError(format!("Invalid URL {url}: {e}")))?;

        let request = match method {
            Method::Get => self.client.get(url).query(&query_pairs(params)),
            Method::Post => self.client.post(url).json(data),
        };

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                AppError::Timeout(self.timeout_secs)
            } else if e.is_connect() {
                AppError::NetworkError(format!("Connection failed: {e}"))
            } else {
                AppError::HttpError(e.to_string())
            }
        })?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| AppError::HttpError(format!("Failed to read response body: {e}")))?;

        Ok(CallResponse {
            status,
            body: parse_body(text),
        })
    }
}

/// Flatten a JSON object into query pairs. Strings go through verbatim;
/// other values keep their JSON rendering. Non-objects contribute
/// nothing.
fn query_pairs(params: &Value) -> Vec<(String, String)> {
    match params.as_object() {
        Some(map) => map
            .iter()
            .map(|(key, value)| {
                let value = match value {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                (key.clone(), value)
            })
            .collect(),
        None => Vec::new(),
    }
}

/// Parse a response body as JSON, keeping the raw text when it is not.
fn parse_body(text: String) -> Value {
    serde_json::from_str(&text).unwrap_or(Value::String(text))
}
