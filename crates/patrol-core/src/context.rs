use std::collections::HashMap;

use serde_json::Value;

/// Shared mutable bag passed to every parameter resolver and callback
/// during one run of the registry.
///
/// Created at run start, discarded at run end. Values set by one entry's
/// callback are visible to later entries' resolvers, which is how chained
/// calls (login → authenticated request) pass state along. Nothing runs
/// concurrently, so no synchronization is needed.
#[derive(Debug, Default)]
pub struct RunContext {
    values: HashMap<String, Value>,
}

impl RunContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a value under `key`, replacing any previous value.
    pub fn set(&mut self, key: impl Into<String>, value: Value) {
        self.values.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Remove and return the value under `key`.
    pub fn take(&mut self, key: &str) -> Option<Value> {
        self.values.remove(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_set_get_take() {
        let mut ctx = RunContext::new();
        assert!(ctx.is_empty());

        ctx.set("token", json!("abc123"));
        assert_eq!(ctx.get("token"), Some(&json!("abc123")));
        assert_eq!(ctx.len(), 1);

        ctx.set("token", json!("def456"));
        assert_eq!(ctx.get("token"), Some(&json!("def456")));

        assert_eq!(ctx.take("token"), Some(json!("def456")));
        assert!(ctx.get("token").is_none());
    }
}
