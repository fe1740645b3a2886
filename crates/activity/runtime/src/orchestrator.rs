//! The runtime seam generated entries schedule through.

use activity_options::EffectiveOptions;
use activity_types::Locality;
use futures::future::BoxFuture;
use serde_json::Value;

use crate::context::Context;
use crate::errors::{InvocationError, InvocationResult};
use crate::target::Target;

/// What to start. Options travel on the scheduling [`Context`].
#[derive(Clone, Debug)]
pub struct ScheduleRequest {
    pub target: Target,
    pub locality: Locality,
    /// Encoded input; `None` for methods without input
    pub input: Option<Value>,
}

impl ScheduleRequest {
    /// Options of the scope matching this request's locality
    pub fn options(&self, ctx: &Context) -> EffectiveOptions {
        ctx.options(self.locality).cloned().unwrap_or_default()
    }
}

/// Completion of a scheduled invocation: encoded output, if any.
pub type PendingInvocation = BoxFuture<'static, Result<Option<Value>, InvocationError>>;

/// Schedules invocations. Implementations must not block in `schedule`;
/// all waiting happens when the returned future is polled.
pub trait Orchestrator: Send + Sync {
    /// Name of this orchestrator for logging.
    fn name(&self) -> &str;

    /// Start an invocation with the options `ctx` carries for the request's
    /// locality. Rejection is the only synchronous failure.
    fn schedule(&self, ctx: &Context, request: ScheduleRequest) -> InvocationResult<PendingInvocation>;
}
