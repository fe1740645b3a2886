//! Activity registry, mapping logical names to implementations.
//!
//! Built explicitly by worker code (usually through the synthesized
//! `Register*` bindings) and handed to the orchestrator. There is no
//! process-wide registry.

use std::collections::HashMap;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

use activity_options::EffectiveOptions;
use activity_types::Locality;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::errors::{ActivityError, ActivityResult, RegistryError, RegistryResult};

/// Execution context handed to an implementation.
#[derive(Clone, Debug, PartialEq)]
pub struct ActivityContext {
    /// Logical name, or `<inline>` for an inline local activity
    pub activity: String,
    pub locality: Locality,
    /// 1-based attempt number
    pub attempt: u32,
    /// Options the invocation was scheduled with
    pub options: EffectiveOptions,
}

/// An activity implementation operating on encoded payloads.
#[async_trait]
pub trait ActivityHandler: Send + Sync {
    async fn invoke(&self, ctx: ActivityContext, input: Option<Value>) -> ActivityResult<Option<Value>>;
}

// ── Typed adapter ────────────────────────────────────────────────────

struct FnHandler<F, I, O> {
    f: F,
    _types: PhantomData<fn(I) -> O>,
}

#[async_trait]
impl<F, Fut, I, O> ActivityHandler for FnHandler<F, I, O>
where
    F: Fn(ActivityContext, I) -> Fut + Send + Sync,
    Fut: Future<Output = ActivityResult<O>> + Send,
    I: DeserializeOwned + Send,
    O: Serialize + Send,
{
    async fn invoke(&self, ctx: ActivityContext, input: Option<Value>) -> ActivityResult<Option<Value>> {
        let input: I = serde_json::from_value(input.unwrap_or(Value::Null))
            .map_err(|e| ActivityError::non_retryable("DecodeInput", e.to_string()))?;
        let output = (self.f)(ctx, input).await?;
        match serde_json::to_value(output) {
            Ok(Value::Null) => Ok(None),
            Ok(value) => Ok(Some(value)),
            Err(e) => Err(ActivityError::non_retryable("EncodeOutput", e.to_string())),
        }
    }
}

/// Wrap a typed async function as a handler.
///
/// Methods without input take `()`; methods without output return `()`.
pub fn handler_fn<F, Fut, I, O>(f: F) -> Arc<dyn ActivityHandler>
where
    F: Fn(ActivityContext, I) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ActivityResult<O>> + Send + 'static,
    I: DeserializeOwned + Send + 'static,
    O: Serialize + Send + 'static,
{
    Arc::new(FnHandler {
        f,
        _types: PhantomData,
    })
}

// ── Registry ─────────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct ActivityRegistry {
    handlers: HashMap<String, Arc<dyn ActivityHandler>>,
}

impl ActivityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        name: impl Into<String>,
        handler: Arc<dyn ActivityHandler>,
    ) -> RegistryResult<()> {
        let name = name.into();
        if name.is_empty() {
            return Err(RegistryError::EmptyName);
        }
        if self.handlers.contains_key(&name) {
            return Err(RegistryError::Duplicate(name));
        }
        tracing::debug!(activity = %name, "Activity registered");
        self.handlers.insert(name, handler);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn ActivityHandler>> {
        self.handlers.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl std::fmt::Debug for ActivityRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActivityRegistry")
            .field("activities", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn activity_ctx() -> ActivityContext {
        ActivityContext {
            activity: "svc.Echo".into(),
            locality: Locality::Durable,
            attempt: 1,
            options: EffectiveOptions::new(),
        }
    }

    #[test]
    fn register_and_lookup() {
        let mut registry = ActivityRegistry::new();
        registry
            .register("svc.Echo", handler_fn(|_ctx, s: String| async move { Ok(s) }))
            .unwrap();
        assert!(registry.contains("svc.Echo"));
        assert_eq!(registry.names(), vec!["svc.Echo"]);
        assert!(registry.get("svc.Other").is_none());
    }

    #[test]
    fn duplicate_and_empty_names_rejected() {
        let mut registry = ActivityRegistry::new();
        let h = handler_fn(|_ctx, _: ()| async { Ok(()) });
        registry.register("a", h.clone()).unwrap();
        assert_eq!(registry.register("a", h.clone()), Err(RegistryError::Duplicate("a".into())));
        assert_eq!(registry.register("", h), Err(RegistryError::EmptyName));
        assert_eq!(registry.len(), 1);
    }

    #[tokio::test]
    async fn typed_adapter_round_trips_payloads() {
        let h = handler_fn(|_ctx, n: i64| async move { Ok(n * 2) });
        let out = h.invoke(activity_ctx(), Some(Value::from(21))).await.unwrap();
        assert_eq!(out, Some(Value::from(42)));
    }

    #[tokio::test]
    async fn unit_output_is_none() {
        let h = handler_fn(|_ctx, _: ()| async { Ok(()) });
        assert_eq!(h.invoke(activity_ctx(), None).await.unwrap(), None);
    }

    #[tokio::test]
    async fn bad_input_is_non_retryable() {
        let h = handler_fn(|_ctx, n: i64| async move { Ok(n) });
        let err = h.invoke(activity_ctx(), Some(Value::from("x"))).await.unwrap_err();
        assert_eq!(err.kind, "DecodeInput");
        assert!(err.non_retryable);
    }
}
