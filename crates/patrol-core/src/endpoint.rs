use std::fmt;
use std::sync::Arc;

use futures::future::BoxFuture;
use serde_json::Value;

use crate::context::RunContext;
use crate::error::AppError;

/// HTTP method an endpoint is exercised with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Get => write!(f, "GET"),
            Method::Post => write!(f, "POST"),
        }
    }
}

/// Async function resolving a parameter value from the run context.
pub type ParamResolver =
    Arc<dyn for<'a> Fn(&'a mut RunContext) -> BoxFuture<'a, Result<Value, AppError>> + Send + Sync>;

/// Parameter source for an endpoint: either a fixed JSON value or a
/// resolver invoked with the [`RunContext`] at call time.
#[derive(Clone)]
pub enum ParamSpec {
    Static(Value),
    Resolved(ParamResolver),
}

impl ParamSpec {
    /// Wrap a resolver function.
    pub fn resolver<F>(f: F) -> Self
    where
        F: for<'a> Fn(&'a mut RunContext) -> BoxFuture<'a, Result<Value, AppError>>
            + Send
            + Sync
            + 'static,
    {
        ParamSpec::Resolved(Arc::new(f))
    }

    /// Produce the concrete value for this call attempt.
    ///
    /// Static values clone, so resolving twice yields the same value.
    pub async fn resolve(&self, ctx: &mut RunContext) -> Result<Value, AppError> {
        match self {
            ParamSpec::Static(value) => Ok(value.clone()),
            ParamSpec::Resolved(resolver) => resolver(ctx).await,
        }
    }
}

impl Default for ParamSpec {
    fn default() -> Self {
        ParamSpec::Static(Value::Object(serde_json::Map::new()))
    }
}

impl fmt::Debug for ParamSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamSpec::Static(value) => f.debug_tuple("Static").field(value).finish(),
            ParamSpec::Resolved(_) => f.write_str("Resolved(..)"),
        }
    }
}

/// Hook invoked after every call attempt with the parsed response body
/// (if any response arrived), the error (if none did), and the context.
pub type OutcomeCallback = Arc<
    dyn for<'a> Fn(
            Option<&'a Value>,
            Option<&'a AppError>,
            &'a mut RunContext,
        ) -> BoxFuture<'a, Result<(), AppError>>
        + Send
        + Sync,
>;

/// Static configuration record describing one remote call to exercise.
///
/// Immutable once registered; the runner borrows descriptors and never
/// mutates them.
#[derive(Clone)]
pub struct EndpointDescriptor {
    pub name: String,
    pub path: String,
    pub method: Method,
    pub enabled: bool,
    pub params: ParamSpec,
    pub data: ParamSpec,
    pub callback: Option<OutcomeCallback>,
}

impl EndpointDescriptor {
    /// New enabled descriptor with empty params and data.
    pub fn new(name: impl Into<String>, path: impl Into<String>, method: Method) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            method,
            enabled: true,
            params: ParamSpec::default(),
            data: ParamSpec::default(),
            callback: None,
        }
    }

    /// Query parameters (GET) for this endpoint.
    pub fn with_params(mut self, params: ParamSpec) -> Self {
        self.params = params;
        self
    }

    /// Request body (POST) for this endpoint.
    pub fn with_data(mut self, data: ParamSpec) -> Self {
        self.data = data;
        self
    }

    /// Attach an outcome callback.
    pub fn with_callback<F>(mut self, callback: F) -> Self
    where
        F: for<'a> Fn(
                Option<&'a Value>,
                Option<&'a AppError>,
                &'a mut RunContext,
            ) -> BoxFuture<'a, Result<(), AppError>>
            + Send
            + Sync
            + 'static,
    {
        self.callback = Some(Arc::new(callback));
        self
    }

    /// Keep the entry in the registry but skip it when running.
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}

impl fmt::Debug for EndpointDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EndpointDescriptor")
            .field("name", &self.name)
            .field("path", &self.path)
            .field("method", &self.method)
            .field("enabled", &self.enabled)
            .field("params", &self.params)
            .field("data", &self.data)
            .field("callback", &self.callback.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_static_params_resolve_idempotent() {
        let spec = ParamSpec::Static(json!({"page": 1, "size": 20}));
        let mut ctx = RunContext::new();

        let first = spec.resolve(&mut ctx).await.unwrap();
        let second = spec.resolve(&mut ctx).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first, json!({"page": 1, "size": 20}));
    }

    #[tokio::test]
    async fn test_default_spec_is_empty_object() {
        let mut ctx = RunContext::new();
        let value = ParamSpec::default().resolve(&mut ctx).await.unwrap();
        assert_eq!(value, json!({}));
    }

    fn token_from_context(ctx: &mut RunContext) -> BoxFuture<'_, Result<Value, AppError>> {
        Box::pin(async move {
            let token = ctx
                .get("token")
                .cloned()
                .ok_or_else(|| AppError::ResolverError("token not set".into()))?;
            Ok(json!({ "token": token }))
        })
    }

    #[tokio::test]
    async fn test_resolver_reads_context() {
        let spec = ParamSpec::resolver(token_from_context);
        let mut ctx = RunContext::new();
        ctx.set("token", json!("abc123"));

        let value = spec.resolve(&mut ctx).await.unwrap();
        assert_eq!(value, json!({"token": "abc123"}));
    }

    #[tokio::test]
    async fn test_resolver_error_propagates() {
        let spec = ParamSpec::resolver(token_from_context);
        let mut ctx = RunContext::new();

        let err = spec.resolve(&mut ctx).await.unwrap_err();
        assert!(matches!(err, AppError::ResolverError(_)));
    }

    #[test]
    fn test_descriptor_defaults() {
        let api = EndpointDescriptor::new("time", "/t", Method::Get);
        assert!(api.enabled);
        assert!(api.callback.is_none());
        assert!(matches!(api.params, ParamSpec::Static(_)));

        let api = api.disabled();
        assert!(!api.enabled);
    }
}
