//! Default-option merger
//!
//! Layers a method's declared defaults under the options a caller already
//! set. Timeout applicability by locality:
//!
//! | Kind            | Durable | Local |
//! |-----------------|---------|-------|
//! | Heartbeat       | yes     | no    |
//! | ScheduleToClose | yes     | yes   |
//! | ScheduleToStart | yes     | no    |
//! | StartToClose    | yes     | yes   |
//!
//! Local activities have no liveness channel and no queuing stage, so
//! heartbeat and schedule-to-start defaults are never applied to them.

use crate::{EffectiveOptions, RetryOptions};
use activity_types::{DefaultInvocationPolicy, Locality, RetryPolicy, TimeoutKind};
use serde::{Deserialize, Serialize};
use std::time::Duration;

static DURABLE_TIMEOUTS: [TimeoutKind; 4] = TimeoutKind::ALL;

static LOCAL_TIMEOUTS: [TimeoutKind; 2] = [TimeoutKind::ScheduleToClose, TimeoutKind::StartToClose];

/// Timeout kinds eligible for defaulting under a locality
pub fn applicable_timeouts(locality: Locality) -> &'static [TimeoutKind] {
    match locality {
        Locality::Durable => &DURABLE_TIMEOUTS,
        Locality::Local => &LOCAL_TIMEOUTS,
    }
}

pub fn is_applicable(kind: TimeoutKind, locality: Locality) -> bool {
    applicable_timeouts(locality).contains(&kind)
}

/// Runtime retry options holding only the valid fields of a declared policy
pub fn retry_options_from(policy: &RetryPolicy) -> RetryOptions {
    RetryOptions {
        initial_interval: policy.initial_interval.as_duration(),
        maximum_interval: policy.max_interval.as_duration(),
        backoff_coefficient: policy.backoff_coefficient,
        maximum_attempts: policy.max_attempts,
        non_retryable_error_types: policy.non_retryable_error_kinds.iter().cloned().collect(),
    }
}

// ── Defaults Plan ────────────────────────────────────────────────────

/// One timeout default that survived compilation
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeoutDefault {
    pub kind: TimeoutKind,
    pub duration: Duration,
}

/// What a call site's merge would fill in, computed once per method.
///
/// Holds only valid defaults for applicable kinds, in [`TimeoutKind::ALL`]
/// order.
#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct DefaultsPlan {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_policy: Option<RetryOptions>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub timeouts: Vec<TimeoutDefault>,
}

/// Fields a single `apply` filled in
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct AppliedDefaults {
    pub retry_policy: bool,
    pub timeouts: Vec<TimeoutKind>,
}

impl AppliedDefaults {
    pub fn is_empty(&self) -> bool {
        !self.retry_policy && self.timeouts.is_empty()
    }
}

impl DefaultsPlan {
    /// Compile declared defaults for a locality
    pub fn compile(defaults: &DefaultInvocationPolicy, locality: Locality) -> Self {
        let timeouts = applicable_timeouts(locality)
            .iter()
            .filter_map(|kind| {
                defaults
                    .timeout(*kind)
                    .as_duration()
                    .map(|duration| TimeoutDefault {
                        kind: *kind,
                        duration,
                    })
            })
            .collect();

        Self {
            retry_policy: defaults.retry_policy.as_ref().map(retry_options_from),
            timeouts,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.retry_policy.is_none() && self.timeouts.is_empty()
    }

    pub fn timeout(&self, kind: TimeoutKind) -> Option<Duration> {
        self.timeouts
            .iter()
            .find(|t| t.kind == kind)
            .map(|t| t.duration)
    }

    /// Fill unset fields of `effective`; fields already set are kept
    pub fn apply(&self, effective: &mut EffectiveOptions) -> AppliedDefaults {
        let mut applied = AppliedDefaults::default();

        if effective.retry_policy.is_none() {
            if let Some(policy) = &self.retry_policy {
                effective.retry_policy = Some(policy.clone());
                applied.retry_policy = true;
                tracing::trace!("default retry policy applied");
            }
        }

        for default in &self.timeouts {
            let slot = effective.timeout_mut(default.kind);
            if slot.is_none() {
                *slot = Some(default.duration);
                applied.timeouts.push(default.kind);
                tracing::trace!(kind = %default.kind, duration = ?default.duration, "default timeout applied");
            }
        }

        applied
    }
}

// ── Direct Merge ─────────────────────────────────────────────────────

/// Copy the declared retry policy unless the caller already set one
pub fn merge_retry_policy(effective: &mut EffectiveOptions, defaults: &DefaultInvocationPolicy) {
    if effective.retry_policy.is_some() {
        return;
    }
    if let Some(policy) = &defaults.retry_policy {
        effective.retry_policy = Some(retry_options_from(policy));
    }
}

/// Copy valid, applicable, declared timeouts into unset fields
pub fn merge_timeouts(
    effective: &mut EffectiveOptions,
    defaults: &DefaultInvocationPolicy,
    locality: Locality,
) {
    for kind in applicable_timeouts(locality) {
        if let Some(duration) = defaults.timeout(*kind).as_duration() {
            let slot = effective.timeout_mut(*kind);
            if slot.is_none() {
                *slot = Some(duration);
            }
        }
    }
}

/// Retry policy and timeouts in one step
pub fn merge(
    effective: &mut EffectiveOptions,
    defaults: &DefaultInvocationPolicy,
    locality: Locality,
) {
    merge_retry_policy(effective, defaults);
    merge_timeouts(effective, defaults, locality);
}
