//! The built-in endpoint registry.
//!
//! Static configuration supplied at startup, not reloaded at runtime.
//! Order matters: the runner walks the list top to bottom, and later
//! entries may read context values stashed by earlier callbacks.

use futures::future::BoxFuture;
use serde_json::{Value, json};

use patrol_core::context::RunContext;
use patrol_core::endpoint::{EndpointDescriptor, Method, ParamSpec};
use patrol_core::error::AppError;

/// Context key the current-time callback stashes the server clock under.
const CURRENT_TIME_KEY: &str = "current-time";

fn remember_current_time<'a>(
    body: Option<&'a Value>,
    error: Option<&'a AppError>,
    ctx: &'a mut RunContext,
) -> BoxFuture<'a, Result<(), AppError>> {
    Box::pin(async move {
        match (body, error) {
            (Some(body), _) => {
                tracing::info!("current-time endpoint returned: {body}");
                if let Some(data) = body.get("data") {
                    ctx.set(CURRENT_TIME_KEY, data.clone());
                }
            }
            (None, Some(err)) => tracing::warn!("current-time endpoint failed: {err}"),
            (None, None) => {}
        }
        Ok(())
    })
}

fn echo_time_data(ctx: &mut RunContext) -> BoxFuture<'_, Result<Value, AppError>> {
    Box::pin(async move {
        let time = ctx.get(CURRENT_TIME_KEY).cloned().ok_or_else(|| {
            AppError::ResolverError("server clock not captured by the current-time entry".into())
        })?;
        Ok(json!({ "time": time }))
    })
}

/// The endpoints one smoke run exercises, in order.
pub fn default_registry() -> Vec<EndpointDescriptor> {
    vec![
        EndpointDescriptor::new("current-time", "/app/getCurrTime.htm", Method::Get)
            .with_callback(remember_current_time),
        EndpointDescriptor::new("sso-parameter", "/app/sys/getSSOParameter.htm", Method::Get),
        EndpointDescriptor::new("console-check", "/app/console/check.htm", Method::Get),
        // Round-trips the captured server clock. Disabled by default:
        // not every deployment ships the echo endpoint.
        EndpointDescriptor::new("echo-time", "/app/echoTime.htm", Method::Post)
            .with_data(ParamSpec::resolver(echo_time_data))
            .disabled(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use patrol_core::runner::EndpointRunner;
    use patrol_core::testutil::{MemorySink, MockCaller};

    #[test]
    fn test_registry_shape() {
        let registry = default_registry();
        let names: Vec<&str> = registry.iter().map(|api| api.name.as_str()).collect();
        assert_eq!(
            names,
            ["current-time", "sso-parameter", "console-check", "echo-time"]
        );

        assert!(registry[0].callback.is_some());
        assert!(registry.iter().take(3).all(|api| api.enabled));
        assert!(!registry[3].enabled);
        assert_eq!(registry[3].method, Method::Post);
    }

    #[tokio::test]
    async fn test_current_time_callback_stashes_server_clock() {
        let caller = MockCaller::ok(200, json!({"status": 1, "data": "2024-05-01 12:00:00"}));
        let runner = EndpointRunner::new(caller, "http://test.local");
        let mut ctx = RunContext::new();
        let mut sink = MemorySink::new();

        runner.run(&default_registry(), &mut ctx, &mut sink).await;

        assert_eq!(
            ctx.get(CURRENT_TIME_KEY),
            Some(&json!("2024-05-01 12:00:00"))
        );
    }

    #[tokio::test]
    async fn test_echo_time_resolver_uses_captured_clock() {
        let mut ctx = RunContext::new();
        ctx.set(CURRENT_TIME_KEY, json!("09:30"));

        let spec = ParamSpec::resolver(echo_time_data);
        let data = spec.resolve(&mut ctx).await.unwrap();
        assert_eq!(data, json!({"time": "09:30"}));
    }

    #[tokio::test]
    async fn test_echo_time_resolver_without_clock_fails() {
        let mut ctx = RunContext::new();
        let spec = ParamSpec::resolver(echo_time_data);
        let err = spec.resolve(&mut ctx).await.unwrap_err();
        assert!(matches!(err, AppError::ResolverError(_)));
    }
}
