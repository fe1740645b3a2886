//! Future handle over one pending invocation.

use std::fmt;
use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::context::Context;
use crate::errors::{InvocationError, InvocationResult};
use crate::orchestrator::PendingInvocation;
use crate::selector::Selector;

/// Result of an invocation that is still running.
///
/// Consumed by [`get`](Self::get) or by handing it to a [`Selector`]; it
/// cannot be resolved twice.
#[must_use = "an activity future does nothing unless resolved"]
pub struct ActivityFuture<O> {
    activity: String,
    pending: PendingInvocation,
    has_output: bool,
    _output: PhantomData<fn() -> O>,
}

impl<O> ActivityFuture<O>
where
    O: DeserializeOwned,
{
    pub fn new(activity: impl Into<String>, pending: PendingInvocation, has_output: bool) -> Self {
        Self {
            activity: activity.into(),
            pending,
            has_output,
            _output: PhantomData,
        }
    }

    pub fn activity(&self) -> &str {
        &self.activity
    }

    /// Wait for the invocation.
    ///
    /// Returns [`InvocationError::Cancelled`] as soon as `ctx` is cancelled
    /// while the invocation is still running. An invocation that already
    /// resolved reports its outcome regardless of cancellation.
    pub async fn get(self, ctx: &Context) -> InvocationResult<O> {
        let activity = self.activity.clone();
        tokio::select! {
            biased;
            result = self.resolve() => result,
            _ = ctx.cancelled() => {
                tracing::debug!(activity = %activity, "Wait cancelled");
                Err(InvocationError::Cancelled)
            }
        }
    }

    /// Add to a wait-set; the resolved result is discarded.
    pub fn select<'a, 's>(self, selector: &'s mut Selector<'a>) -> &'s mut Selector<'a>
    where
        O: Send + 'a,
    {
        self.select_with(selector, |_| {})
    }

    /// Add to a wait-set; `callback` runs with the result when the selector
    /// picks this future. Never blocks.
    pub fn select_with<'a, 's, F>(self, selector: &'s mut Selector<'a>, callback: F) -> &'s mut Selector<'a>
    where
        O: Send + 'a,
        F: FnOnce(InvocationResult<O>) + Send + 'a,
    {
        selector.push(async move {
            let result = self.resolve().await;
            Box::new(move || callback(result)) as Box<dyn FnOnce() + Send + 'a>
        });
        selector
    }

    /// Await the invocation and decode its output.
    async fn resolve(self) -> InvocationResult<O> {
        let output = self.pending.await?;
        let value = if self.has_output {
            output.unwrap_or(Value::Null)
        } else {
            Value::Null
        };
        serde_json::from_value(value).map_err(|source| InvocationError::Codec {
            activity: self.activity,
            source,
        })
    }
}

impl<O> fmt::Debug for ActivityFuture<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActivityFuture")
            .field("activity", &self.activity)
            .field("has_output", &self.has_output)
            .finish()
    }
}
