//! In-memory orchestrator for tests and local runs.
//!
//! Resolves targets against an [`ActivityRegistry`], runs handlers on the
//! current task when the returned future is polled, and retries according
//! to the merged retry options. No timers: backoff intervals and timeouts
//! are recorded but not enforced.

use std::sync::Arc;

use activity_options::EffectiveOptions;
use activity_types::Locality;
use futures::FutureExt;
use parking_lot::Mutex;
use serde_json::Value;

use crate::context::Context;
use crate::errors::{InvocationError, InvocationResult};
use crate::orchestrator::{Orchestrator, PendingInvocation, ScheduleRequest};
use crate::registry::{ActivityContext, ActivityHandler, ActivityRegistry};
use crate::target::Target;

/// Attempts allowed when the retry policy leaves the count unbounded.
pub const DEFAULT_ATTEMPT_LIMIT: u32 = 10;

/// One accepted `schedule` call.
#[derive(Clone, Debug, PartialEq)]
pub struct ScheduledCall {
    /// Logical name, or the inline label
    pub activity: String,
    pub inline: bool,
    pub locality: Locality,
    pub options: EffectiveOptions,
    pub input: Option<Value>,
}

pub struct SimulatedOrchestrator {
    registry: Arc<ActivityRegistry>,
    attempt_limit: u32,
    calls: Arc<Mutex<Vec<ScheduledCall>>>,
}

impl SimulatedOrchestrator {
    pub fn new(registry: ActivityRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
            attempt_limit: DEFAULT_ATTEMPT_LIMIT,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Cap for retry policies without a positive `maximum_attempts`
    pub fn with_attempt_limit(mut self, limit: u32) -> Self {
        self.attempt_limit = limit.max(1);
        self
    }

    pub fn registry(&self) -> &ActivityRegistry {
        &self.registry
    }

    /// Every accepted call, in scheduling order
    pub fn calls(&self) -> Vec<ScheduledCall> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    fn max_attempts(&self, options: &EffectiveOptions) -> u32 {
        match options.retry_policy.as_ref().and_then(|p| p.maximum_attempts) {
            Some(n) if n > 0 => n as u32,
            _ => self.attempt_limit,
        }
    }
}

impl Orchestrator for SimulatedOrchestrator {
    fn name(&self) -> &str {
        "simulated-orchestrator"
    }

    fn schedule(&self, ctx: &Context, request: ScheduleRequest) -> InvocationResult<PendingInvocation> {
        let activity = request.target.label().to_string();
        let handler: Arc<dyn ActivityHandler> = match &request.target {
            Target::ByName(name) => self.registry.get(name).ok_or_else(|| {
                InvocationError::SchedulingRejected {
                    activity: name.clone(),
                    reason: "no activity registered under this name".into(),
                }
            })?,
            Target::Inline(inline) => inline.handler().clone(),
        };

        let options = request.options(ctx);
        self.calls.lock().push(ScheduledCall {
            activity: activity.clone(),
            inline: request.target.is_inline(),
            locality: request.locality,
            options: options.clone(),
            input: request.input.clone(),
        });

        let max_attempts = self.max_attempts(&options);
        let ScheduleRequest { locality, input, .. } = request;

        Ok(async move {
            let mut attempt = 0;
            loop {
                attempt += 1;
                let ctx = ActivityContext {
                    activity: activity.clone(),
                    locality,
                    attempt,
                    options: options.clone(),
                };
                let error = match handler.invoke(ctx, input.clone()).await {
                    Ok(output) => return Ok(output),
                    Err(error) => error,
                };

                let non_retryable = error.non_retryable
                    || options
                        .retry_policy
                        .as_ref()
                        .is_some_and(|p| p.is_non_retryable(&error.kind));

                if non_retryable || attempt >= max_attempts {
                    tracing::debug!(
                        activity = %activity,
                        attempt,
                        non_retryable,
                        error = %error,
                        "Activity failed"
                    );
                    return Err(InvocationError::Failed {
                        activity,
                        attempts: attempt,
                        source: error,
                    });
                }
                tracing::trace!(activity = %activity, attempt, error = %error, "Retrying activity");
            }
        }
        .boxed())
    }
}
