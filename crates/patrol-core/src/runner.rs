use std::time::Instant;

use serde_json::Value;

use crate::context::RunContext;
use crate::endpoint::EndpointDescriptor;
use crate::error::AppError;
use crate::outcome::{Classification, OutcomeRecord, ResponseStatus};
use crate::traits::{Caller, ErrorSink};

/// Drives an ordered endpoint registry sequentially against a base
/// address, classifying each outcome and handing anomalies to the sink.
///
/// Generic over the transport via the [`Caller`] trait, enabling
/// dependency injection and testability without real HTTP calls.
///
/// Entries run strictly in registry order: each call completes,
/// including its classification, logging, and callback, before the next
/// begins. A failure in one entry (resolver, transport, callback, or the
/// sink itself) is logged and never aborts the remaining entries.
pub struct EndpointRunner<C: Caller> {
    caller: C,
    base_url: String,
}

/// Counts for one run of the registry.
///
/// All failures are logged, none is fatal: the run always completes and
/// carries no exit-code distinction between partial and full failure.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Entries in the registry, enabled or not.
    pub total: usize,
    /// Entries skipped because `enabled` was false.
    pub skipped: usize,
    /// Entries for which a call was issued.
    pub called: usize,
    /// Calls that produced no anomaly record at all.
    pub succeeded: usize,
    /// Anomaly records handed to the sink (a single call may produce
    /// more than one).
    pub anomalies: usize,
}

impl<C: Caller> EndpointRunner<C> {
    pub fn new(caller: C, base_url: impl Into<String>) -> Self {
        Self {
            caller,
            base_url: base_url.into(),
        }
    }

    /// Process the registry in order, one entry at a time.
    pub async fn run<S: ErrorSink>(
        &self,
        registry: &[EndpointDescriptor],
        ctx: &mut RunContext,
        sink: &mut S,
    ) -> RunSummary {
        let enabled: Vec<&EndpointDescriptor> =
            registry.iter().filter(|api| api.enabled).collect();
        let mut summary = RunSummary {
            total: registry.len(),
            skipped: registry.len() - enabled.len(),
            ..Default::default()
        };

        tracing::info!(
            "starting endpoint run against {} ({} entries, {} disabled)",
            self.base_url,
            enabled.len(),
            summary.skipped
        );

        let total = enabled.len();
        for (index, api) in enabled.into_iter().enumerate() {
            self.run_entry(api, index, total, ctx, sink, &mut summary)
                .await;
        }

        tracing::info!(
            "endpoint run complete: {}/{} clean, {} anomaly records",
            summary.succeeded,
            summary.called,
            summary.anomalies
        );
        summary
    }

    async fn run_entry<S: ErrorSink>(
        &self,
        api: &EndpointDescriptor,
        index: usize,
        total: usize,
        ctx: &mut RunContext,
        sink: &mut S,
        summary: &mut RunSummary,
    ) {
        let url = format!("{}{}", self.base_url, api.path);
        tracing::info!("[{}/{}] {} ({} {})", index + 1, total, api.name, api.method, url);

        let params = match api.params.resolve(ctx).await {
            Ok(value) => value,
            Err(err) => {
                tracing::error!("params resolver for {} failed: {err}", api.name);
                append(
                    sink,
                    hook_failure_record(api, &url, Value::Null, Value::Null, 0, &err),
                    summary,
                );
                self.invoke_callback(api, &url, &Value::Null, &Value::Null, 0, None, Some(&err), ctx, sink, summary)
                    .await;
                return;
            }
        };
        let data = match api.data.resolve(ctx).await {
            Ok(value) => value,
            Err(err) => {
                tracing::error!("data resolver for {} failed: {err}", api.name);
                append(
                    sink,
                    hook_failure_record(api, &url, params.clone(), Value::Null, 0, &err),
                    summary,
                );
                self.invoke_callback(api, &url, &params, &Value::Null, 0, None, Some(&err), ctx, sink, summary)
                    .await;
                return;
            }
        };

        if params.as_object().is_some_and(|m| !m.is_empty()) {
            tracing::info!("params: {params}");
        }
        if data.as_object().is_some_and(|m| !m.is_empty()) {
            tracing::info!("data: {data}");
        }

        summary.called += 1;
        let start = Instant::now();
        let outcome = self.caller.call(api.method, &url, &params, &data).await;
        let elapsed_ms = start.elapsed().as_millis() as u64;

        match outcome {
            Ok(resp) => {
                tracing::info!("status {} in {}ms", resp.status, elapsed_ms);
                tracing::debug!("response: {}", resp.body);

                let mut anomalous = false;
                if resp.status != 200 {
                    anomalous = true;
                    append(
                        sink,
                        OutcomeRecord {
                            endpoint: api.name.clone(),
                            url: url.clone(),
                            method: api.method,
                            params: params.clone(),
                            data: data.clone(),
                            status: ResponseStatus::Code(resp.status),
                            response: resp.body.clone(),
                            elapsed_ms,
                            classification: Classification::HttpStatus,
                        },
                        summary,
                    );
                }
                // Independent of the status check: a 500 whose body still
                // carries a bad `status` field produces two records.
                if let Some(flag) = resp.body.get("status") {
                    if !business_ok(flag) {
                        anomalous = true;
                        append(
                            sink,
                            OutcomeRecord {
                                endpoint: api.name.clone(),
                                url: url.clone(),
                                method: api.method,
                                params: params.clone(),
                                data: data.clone(),
                                status: ResponseStatus::Code(resp.status),
                                response: resp.body.clone(),
                                elapsed_ms,
                                classification: Classification::BusinessStatus,
                            },
                            summary,
                        );
                    }
                }
                if !anomalous {
                    summary.succeeded += 1;
                }

                self.invoke_callback(
                    api,
                    &url,
                    &params,
                    &data,
                    elapsed_ms,
                    Some(&resp.body),
                    None,
                    ctx,
                    sink,
                    summary,
                )
                .await;
            }
            Err(err) => {
                tracing::error!("request failed in {elapsed_ms}ms: {err}");
                append(
                    sink,
                    OutcomeRecord {
                        endpoint: api.name.clone(),
                        url: url.clone(),
                        method: api.method,
                        params: params.clone(),
                        data: data.clone(),
                        status: ResponseStatus::NoResponse,
                        response: Value::String(err.to_string()),
                        elapsed_ms,
                        classification: Classification::TransportError,
                    },
                    summary,
                );
                self.invoke_callback(api, &url, &params, &data, elapsed_ms, None, Some(&err), ctx, sink, summary)
                    .await;
            }
        }
    }

    /// Invoke the entry's callback, if any, and reduce a callback failure
    /// to an anomaly record so it never aborts the run.
    #[allow(clippy::too_many_arguments)]
    async fn invoke_callback<S: ErrorSink>(
        &self,
        api: &EndpointDescriptor,
        url: &str,
        params: &Value,
        data: &Value,
        elapsed_ms: u64,
        body: Option<&Value>,
        error: Option<&AppError>,
        ctx: &mut RunContext,
        sink: &mut S,
        summary: &mut RunSummary,
    ) {
        let Some(callback) = &api.callback else {
            return;
        };
        if let Err(err) = callback(body, error, ctx).await {
            let err = AppError::CallbackError(err.to_string());
            tracing::error!("callback for {} failed: {err}", api.name);
            append(
                sink,
                hook_failure_record(api, url, params.clone(), data.clone(), elapsed_ms, &err),
                summary,
            );
        }
    }
}

/// Body-level success check: a `status` field counts as OK only when it
/// is numerically 1. Strings, booleans, and null are anomalous.
fn business_ok(flag: &Value) -> bool {
    flag.as_f64() == Some(1.0)
}

/// Record for a failure in user-supplied code (resolver or callback):
/// transport-error class, no-response sentinel, the message as the body.
fn hook_failure_record(
    api: &EndpointDescriptor,
    url: &str,
    params: Value,
    data: Value,
    elapsed_ms: u64,
    err: &AppError,
) -> OutcomeRecord {
    OutcomeRecord {
        endpoint: api.name.clone(),
        url: url.to_string(),
        method: api.method,
        params,
        data,
        status: ResponseStatus::NoResponse,
        response: Value::String(err.to_string()),
        elapsed_ms,
        classification: Classification::TransportError,
    }
}

fn append<S: ErrorSink>(sink: &mut S, record: OutcomeRecord, summary: &mut RunSummary) {
    summary.anomalies += 1;
    if let Err(err) = sink.append(&record) {
        // The sink itself failing must not abort the run either.
        tracing::error!("failed to append error record: {err}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoint::{Method, ParamSpec};
    use crate::testutil::{FailingSink, MemorySink, MockCaller};
    use crate::traits::CallResponse;
    use futures::future::BoxFuture;
    use serde_json::json;

    fn runner(caller: MockCaller) -> EndpointRunner<MockCaller> {
        EndpointRunner::new(caller, "http://test.local")
    }

    fn remember_outcome<'a>(
        body: Option<&'a Value>,
        error: Option<&'a AppError>,
        ctx: &'a mut RunContext,
    ) -> BoxFuture<'a, Result<(), AppError>> {
        Box::pin(async move {
            if let Some(body) = body {
                ctx.set("cb-body", body.clone());
            }
            if let Some(err) = error {
                ctx.set("cb-error", json!(err.to_string()));
            }
            let count = ctx.get("cb-count").and_then(Value::as_u64).unwrap_or(0);
            ctx.set("cb-count", json!(count + 1));
            Ok(())
        })
    }

    fn exploding_callback<'a>(
        _body: Option<&'a Value>,
        _error: Option<&'a AppError>,
        _ctx: &'a mut RunContext,
    ) -> BoxFuture<'a, Result<(), AppError>> {
        Box::pin(async move { Err(AppError::Generic("callback exploded".into())) })
    }

    fn failing_resolver(_ctx: &mut RunContext) -> BoxFuture<'_, Result<Value, AppError>> {
        Box::pin(async move { Err(AppError::ResolverError("missing token".into())) })
    }

    #[tokio::test]
    async fn calls_issued_in_registry_order() {
        let caller = MockCaller::with_responses(vec![]);
        let registry = vec![
            EndpointDescriptor::new("first", "/a", Method::Get),
            EndpointDescriptor::new("second", "/b", Method::Post),
            EndpointDescriptor::new("third", "/c", Method::Get),
        ];
        let mut ctx = RunContext::new();
        let mut sink = MemorySink::new();

        let summary = runner(caller.clone()).run(&registry, &mut ctx, &mut sink).await;

        let calls = caller.calls.lock().unwrap();
        let urls: Vec<&str> = calls.iter().map(|c| c.url.as_str()).collect();
        assert_eq!(
            urls,
            ["http://test.local/a", "http://test.local/b", "http://test.local/c"]
        );
        assert_eq!(calls[1].method, Method::Post);
        assert_eq!(summary.called, 3);
        assert_eq!(summary.succeeded, 3);
        assert_eq!(sink.record_count(), 0);
    }

    #[tokio::test]
    async fn disabled_entry_never_calls_or_logs() {
        let caller = MockCaller::with_responses(vec![]);
        let registry = vec![
            EndpointDescriptor::new("off", "/off", Method::Get).disabled(),
            EndpointDescriptor::new("on", "/on", Method::Get),
        ];
        let mut ctx = RunContext::new();
        let mut sink = MemorySink::new();

        let summary = runner(caller.clone()).run(&registry, &mut ctx, &mut sink).await;

        assert_eq!(caller.call_count(), 1);
        assert_eq!(caller.calls.lock().unwrap()[0].url, "http://test.local/on");
        assert_eq!(summary.total, 2);
        assert_eq!(summary.skipped, 1);
        assert_eq!(sink.record_count(), 0);
    }

    #[tokio::test]
    async fn status_500_logs_one_http_status_record() {
        let caller = MockCaller::ok(500, json!({"error": "internal"}));
        let registry = vec![EndpointDescriptor::new("broken", "/x", Method::Get)];
        let mut ctx = RunContext::new();
        let mut sink = MemorySink::new();

        let summary = runner(caller).run(&registry, &mut ctx, &mut sink).await;

        let records = sink.records.lock().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].classification, Classification::HttpStatus);
        assert_eq!(records[0].status, ResponseStatus::Code(500));
        assert_eq!(summary.succeeded, 0);
    }

    #[tokio::test]
    async fn status_404_record_captures_raw_body() {
        let caller = MockCaller::ok(404, Value::String("<html>404</html>".into()));
        let registry = vec![EndpointDescriptor::new("time", "/t", Method::Get)];
        let mut ctx = RunContext::new();
        let mut sink = MemorySink::new();

        runner(caller).run(&registry, &mut ctx, &mut sink).await;

        let records = sink.records.lock().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].classification, Classification::HttpStatus);
        assert_eq!(records[0].status, ResponseStatus::Code(404));
        assert_eq!(records[0].response, Value::String("<html>404</html>".into()));
    }

    #[tokio::test]
    async fn business_status_zero_logs_one_record() {
        let caller = MockCaller::ok(200, json!({"status": 0, "msg": "denied"}));
        let registry = vec![EndpointDescriptor::new("denied", "/x", Method::Get)];
        let mut ctx = RunContext::new();
        let mut sink = MemorySink::new();

        runner(caller).run(&registry, &mut ctx, &mut sink).await;

        let records = sink.records.lock().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].classification, Classification::BusinessStatus);
        assert_eq!(records[0].status, ResponseStatus::Code(200));
        assert_eq!(records[0].response, json!({"status": 0, "msg": "denied"}));
    }

    #[tokio::test]
    async fn both_checks_fire_on_the_same_call() {
        let caller = MockCaller::ok(500, json!({"status": 0}));
        let registry = vec![EndpointDescriptor::new("doubly-bad", "/x", Method::Get)];
        let mut ctx = RunContext::new();
        let mut sink = MemorySink::new();

        let summary = runner(caller).run(&registry, &mut ctx, &mut sink).await;

        let records = sink.records.lock().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].classification, Classification::HttpStatus);
        assert_eq!(records[1].classification, Classification::BusinessStatus);
        assert_eq!(summary.anomalies, 2);
    }

    #[tokio::test]
    async fn transport_failure_logs_no_response_record() {
        let caller = MockCaller::with_error(AppError::NetworkError("connection refused".into()));
        let registry = vec![EndpointDescriptor::new("down", "/x", Method::Get)];
        let mut ctx = RunContext::new();
        let mut sink = MemorySink::new();

        runner(caller).run(&registry, &mut ctx, &mut sink).await;

        let records = sink.records.lock().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].classification, Classification::TransportError);
        assert_eq!(records[0].status, ResponseStatus::NoResponse);
        assert!(records[0]
            .response
            .as_str()
            .unwrap()
            .contains("connection refused"));
    }

    #[tokio::test]
    async fn clean_200_status_1_logs_nothing_and_reaches_callback() {
        let caller = MockCaller::ok(200, json!({"status": 1, "data": "12:00"}));
        let registry = vec![
            EndpointDescriptor::new("time", "/t", Method::Get).with_callback(remember_outcome),
        ];
        let mut ctx = RunContext::new();
        let mut sink = MemorySink::new();

        let summary = runner(caller).run(&registry, &mut ctx, &mut sink).await;

        assert_eq!(sink.record_count(), 0);
        assert_eq!(summary.succeeded, 1);
        assert_eq!(ctx.get("cb-body"), Some(&json!({"status": 1, "data": "12:00"})));
        assert!(ctx.get("cb-error").is_none());
        assert_eq!(ctx.get("cb-count"), Some(&json!(1)));
    }

    #[tokio::test]
    async fn body_without_status_field_is_clean() {
        let caller = MockCaller::ok(200, json!({"data": [1, 2, 3]}));
        let registry = vec![EndpointDescriptor::new("plain", "/x", Method::Get)];
        let mut ctx = RunContext::new();
        let mut sink = MemorySink::new();

        let summary = runner(caller).run(&registry, &mut ctx, &mut sink).await;

        assert_eq!(sink.record_count(), 0);
        assert_eq!(summary.succeeded, 1);
    }

    #[tokio::test]
    async fn non_numeric_status_field_is_anomalous() {
        let caller = MockCaller::ok(200, json!({"status": "1"}));
        let registry = vec![EndpointDescriptor::new("stringy", "/x", Method::Get)];
        let mut ctx = RunContext::new();
        let mut sink = MemorySink::new();

        runner(caller).run(&registry, &mut ctx, &mut sink).await;

        let records = sink.records.lock().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].classification, Classification::BusinessStatus);
    }

    #[tokio::test]
    async fn callback_sees_transport_error() {
        let caller = MockCaller::with_error(AppError::Timeout(30));
        let registry = vec![
            EndpointDescriptor::new("slow", "/x", Method::Get).with_callback(remember_outcome),
        ];
        let mut ctx = RunContext::new();
        let mut sink = MemorySink::new();

        runner(caller).run(&registry, &mut ctx, &mut sink).await;

        assert!(ctx.get("cb-body").is_none());
        assert!(ctx
            .get("cb-error")
            .and_then(Value::as_str)
            .unwrap()
            .contains("timed out"));
    }

    #[tokio::test]
    async fn resolver_failure_is_isolated_to_its_entry() {
        let caller = MockCaller::with_responses(vec![]);
        let registry = vec![
            EndpointDescriptor::new("needs-token", "/a", Method::Get)
                .with_params(ParamSpec::resolver(failing_resolver)),
            EndpointDescriptor::new("independent", "/b", Method::Get),
        ];
        let mut ctx = RunContext::new();
        let mut sink = MemorySink::new();

        let summary = runner(caller.clone()).run(&registry, &mut ctx, &mut sink).await;

        // No call for the entry whose resolver failed, but the next entry
        // still runs.
        assert_eq!(caller.call_count(), 1);
        assert_eq!(caller.calls.lock().unwrap()[0].url, "http://test.local/b");

        let records = sink.records.lock().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].classification, Classification::TransportError);
        assert_eq!(records[0].status, ResponseStatus::NoResponse);
        assert!(records[0].response.as_str().unwrap().contains("missing token"));
        assert_eq!(summary.called, 1);
    }

    #[tokio::test]
    async fn callback_failure_logs_and_run_continues() {
        let caller = MockCaller::with_responses(vec![]);
        let registry = vec![
            EndpointDescriptor::new("noisy", "/a", Method::Get)
                .with_callback(exploding_callback),
            EndpointDescriptor::new("after", "/b", Method::Get),
        ];
        let mut ctx = RunContext::new();
        let mut sink = MemorySink::new();

        let summary = runner(caller.clone()).run(&registry, &mut ctx, &mut sink).await;

        assert_eq!(caller.call_count(), 2);
        let records = sink.records.lock().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].classification, Classification::TransportError);
        assert!(records[0].response.as_str().unwrap().contains("callback exploded"));
        // The call itself was clean; only the callback misbehaved.
        assert_eq!(summary.succeeded, 2);
    }

    #[tokio::test]
    async fn sink_failure_does_not_abort_the_run() {
        let caller = MockCaller::with_responses(vec![
            Ok(CallResponse {
                status: 500,
                body: json!({}),
            }),
            Ok(CallResponse {
                status: 200,
                body: json!({"status": 1}),
            }),
        ]);
        let registry = vec![
            EndpointDescriptor::new("bad", "/a", Method::Get),
            EndpointDescriptor::new("good", "/b", Method::Get),
        ];
        let mut ctx = RunContext::new();
        let mut sink = FailingSink;

        let summary = runner(caller.clone()).run(&registry, &mut ctx, &mut sink).await;

        assert_eq!(caller.call_count(), 2);
        assert_eq!(summary.called, 2);
        assert_eq!(summary.anomalies, 1);
        assert_eq!(summary.succeeded, 1);
    }

    #[tokio::test]
    async fn context_flows_between_entries() {
        let caller = MockCaller::with_responses(vec![Ok(CallResponse {
            status: 200,
            body: json!({"status": 1, "data": "09:30"}),
        })]);

        fn stash_time<'a>(
            body: Option<&'a Value>,
            _error: Option<&'a AppError>,
            ctx: &'a mut RunContext,
        ) -> BoxFuture<'a, Result<(), AppError>> {
            Box::pin(async move {
                if let Some(data) = body.and_then(|b| b.get("data")) {
                    ctx.set("current-time", data.clone());
                }
                Ok(())
            })
        }

        fn echo_time(ctx: &mut RunContext) -> BoxFuture<'_, Result<Value, AppError>> {
            Box::pin(async move {
                let time = ctx.get("current-time").cloned().unwrap_or(Value::Null);
                Ok(json!({ "time": time }))
            })
        }

        let registry = vec![
            EndpointDescriptor::new("time", "/t", Method::Get).with_callback(stash_time),
            EndpointDescriptor::new("echo", "/echo", Method::Post)
                .with_data(ParamSpec::resolver(echo_time)),
        ];
        let mut ctx = RunContext::new();
        let mut sink = MemorySink::new();

        runner(caller.clone()).run(&registry, &mut ctx, &mut sink).await;

        let calls = caller.calls.lock().unwrap();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[1].data, json!({"time": "09:30"}));
    }
}
