//! Per-call-site options

use activity_types::TimeoutKind;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Retry options as handed to the runtime.
///
/// `None` leaves the field to the runtime's built-in default.
#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct RetryOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_interval: Option<Duration>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum_interval: Option<Duration>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backoff_coefficient: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum_attempts: Option<i32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub non_retryable_error_types: Vec<String>,
}

impl RetryOptions {
    pub fn is_non_retryable(&self, error_type: &str) -> bool {
        self.non_retryable_error_types
            .iter()
            .any(|t| t == error_type)
    }
}

/// Options for one invocation, built fresh per call site.
///
/// A `None` timeout is unset. `Some(Duration::ZERO)` is set and means
/// "no timeout".
#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct EffectiveOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heartbeat_timeout: Option<Duration>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule_to_close_timeout: Option<Duration>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule_to_start_timeout: Option<Duration>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_to_close_timeout: Option<Duration>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_policy: Option<RetryOptions>,
}

impl EffectiveOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, kind: TimeoutKind, duration: Duration) -> Self {
        *self.timeout_mut(kind) = Some(duration);
        self
    }

    pub fn with_retry_policy(mut self, policy: RetryOptions) -> Self {
        self.retry_policy = Some(policy);
        self
    }

    pub fn timeout(&self, kind: TimeoutKind) -> Option<Duration> {
        match kind {
            TimeoutKind::Heartbeat => self.heartbeat_timeout,
            TimeoutKind::ScheduleToClose => self.schedule_to_close_timeout,
            TimeoutKind::ScheduleToStart => self.schedule_to_start_timeout,
            TimeoutKind::StartToClose => self.start_to_close_timeout,
        }
    }

    pub fn timeout_mut(&mut self, kind: TimeoutKind) -> &mut Option<Duration> {
        match kind {
            TimeoutKind::Heartbeat => &mut self.heartbeat_timeout,
            TimeoutKind::ScheduleToClose => &mut self.schedule_to_close_timeout,
            TimeoutKind::ScheduleToStart => &mut self.schedule_to_start_timeout,
            TimeoutKind::StartToClose => &mut self.start_to_close_timeout,
        }
    }

    /// Kinds that currently hold a value
    pub fn set_timeouts(&self) -> Vec<TimeoutKind> {
        TimeoutKind::ALL
            .into_iter()
            .filter(|k| self.timeout(*k).is_some())
            .collect()
    }
}
