//! Entry points for one activity method.
//!
//! An `ActivityStub` is what a synthesized async/sync entry pair compiles
//! down to: the logical name, the locality, the compiled defaults and the
//! payload presence flags.

use std::fmt;
use std::marker::PhantomData;

use activity_options::DefaultsPlan;
use activity_types::Locality;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::context::Context;
use crate::errors::{InvocationError, InvocationResult};
use crate::future::ActivityFuture;
use crate::orchestrator::ScheduleRequest;
use crate::target::{InlineActivity, Target};

pub struct ActivityStub<I, O> {
    logical_name: String,
    locality: Locality,
    defaults: DefaultsPlan,
    has_input: bool,
    has_output: bool,
    _types: PhantomData<fn(I) -> O>,
}

impl<I, O> ActivityStub<I, O>
where
    I: Serialize,
    O: DeserializeOwned,
{
    /// A stub with input and output and no defaults
    pub fn new(logical_name: impl Into<String>, locality: Locality) -> Self {
        Self {
            logical_name: logical_name.into(),
            locality,
            defaults: DefaultsPlan::default(),
            has_input: true,
            has_output: true,
            _types: PhantomData,
        }
    }

    pub fn durable(logical_name: impl Into<String>) -> Self {
        Self::new(logical_name, Locality::Durable)
    }

    pub fn local(logical_name: impl Into<String>) -> Self {
        Self::new(logical_name, Locality::Local)
    }

    pub fn with_defaults(mut self, defaults: DefaultsPlan) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn with_input(mut self, has_input: bool) -> Self {
        self.has_input = has_input;
        self
    }

    pub fn with_output(mut self, has_output: bool) -> Self {
        self.has_output = has_output;
        self
    }

    pub fn logical_name(&self) -> &str {
        &self.logical_name
    }

    pub fn locality(&self) -> Locality {
        self.locality
    }

    pub fn defaults(&self) -> &DefaultsPlan {
        &self.defaults
    }

    /// Async entry.
    ///
    /// Reads the ambient options for this stub's locality (fresh if none
    /// are attached), fills unset fields from the defaults onto a derived
    /// context, resolves the target and schedules on that context. Never
    /// waits for the invocation itself.
    ///
    /// `inline` only has an effect for local stubs; durable stubs always
    /// dispatch by logical name.
    pub fn execute_async(
        &self,
        ctx: &Context,
        input: I,
        inline: Option<InlineActivity>,
    ) -> InvocationResult<ActivityFuture<O>> {
        let mut options = ctx.options(self.locality).cloned().unwrap_or_default();
        let applied = self.defaults.apply(&mut options);
        let ctx = ctx.with_options(self.locality, options);

        let target = match (self.locality, inline) {
            (Locality::Local, Some(inline)) => Target::Inline(inline),
            (Locality::Durable, Some(_)) => {
                tracing::warn!(
                    activity = %self.logical_name,
                    "Inline implementation ignored for durable activity"
                );
                Target::by_name(self.logical_name.clone())
            }
            (_, None) => Target::by_name(self.logical_name.clone()),
        };

        let input = if self.has_input {
            let encoded = serde_json::to_value(&input).map_err(|source| InvocationError::Codec {
                activity: self.logical_name.clone(),
                source,
            })?;
            Some(encoded)
        } else {
            None
        };

        tracing::debug!(
            activity = %self.logical_name,
            locality = %self.locality,
            target = %target.label(),
            defaulted = applied.timeouts.len() + usize::from(applied.retry_policy),
            "Scheduling activity"
        );

        let pending = ctx.orchestrator().schedule(
            &ctx,
            ScheduleRequest {
                target,
                locality: self.locality,
                input,
            },
        )?;

        Ok(ActivityFuture::new(self.logical_name.clone(), pending, self.has_output))
    }

    /// Sync entry: the async entry followed by `get`.
    pub async fn execute(
        &self,
        ctx: &Context,
        input: I,
        inline: Option<InlineActivity>,
    ) -> InvocationResult<O> {
        self.execute_async(ctx, input, inline)?.get(ctx).await
    }
}

impl<I, O> Clone for ActivityStub<I, O> {
    fn clone(&self) -> Self {
        Self {
            logical_name: self.logical_name.clone(),
            locality: self.locality,
            defaults: self.defaults.clone(),
            has_input: self.has_input,
            has_output: self.has_output,
            _types: PhantomData,
        }
    }
}

impl<I, O> fmt::Debug for ActivityStub<I, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActivityStub")
            .field("logical_name", &self.logical_name)
            .field("locality", &self.locality)
            .field("defaults", &self.defaults)
            .field("has_input", &self.has_input)
            .field("has_output", &self.has_output)
            .finish()
    }
}
