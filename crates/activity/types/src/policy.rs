//! Default invocation policies: retry policy and per-kind timeouts
//!
//! A `DefaultInvocationPolicy` is declared once per method in the service
//! descriptor. It never changes during a generation run; call sites layer
//! their own options on top of it.

use crate::PolicyDuration;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

// ── Locality ─────────────────────────────────────────────────────────

/// Where an activity executes relative to its caller
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Locality {
    /// In-process execution, bypassing durable task queues
    Local,
    /// Scheduled through the runtime's durable task queues
    #[default]
    Durable,
}

impl Locality {
    pub fn is_local(&self) -> bool {
        matches!(self, Locality::Local)
    }
}

impl std::fmt::Display for Locality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Locality::Local => write!(f, "local"),
            Locality::Durable => write!(f, "durable"),
        }
    }
}

// ── Timeout Kinds ────────────────────────────────────────────────────

/// The timeout budgets an activity invocation can carry
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TimeoutKind {
    /// Maximum time between liveness reports
    Heartbeat,
    /// Total budget from scheduling to completion, retries included
    ScheduleToClose,
    /// Time an invocation may wait in a queue before starting
    ScheduleToStart,
    /// Budget for a single attempt
    StartToClose,
}

impl TimeoutKind {
    /// Every kind, in declaration order.
    pub const ALL: [TimeoutKind; 4] = [
        TimeoutKind::Heartbeat,
        TimeoutKind::ScheduleToClose,
        TimeoutKind::ScheduleToStart,
        TimeoutKind::StartToClose,
    ];

    /// Option field name used in descriptors and rendered wrappers.
    pub fn field_name(&self) -> &'static str {
        match self {
            TimeoutKind::Heartbeat => "heartbeat_timeout",
            TimeoutKind::ScheduleToClose => "schedule_to_close_timeout",
            TimeoutKind::ScheduleToStart => "schedule_to_start_timeout",
            TimeoutKind::StartToClose => "start_to_close_timeout",
        }
    }
}

impl std::fmt::Display for TimeoutKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.field_name())
    }
}

// ── Retry Policy ─────────────────────────────────────────────────────

/// Declared retry policy.
///
/// Every field is independently optional. An invalid interval or a `None`
/// numeric field is left for the runtime's built-in default.
#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Delay before the first retry
    #[serde(default)]
    pub initial_interval: PolicyDuration,
    /// Cap on the delay between retries
    #[serde(default)]
    pub max_interval: PolicyDuration,
    /// Multiplier applied to the delay after each attempt
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backoff_coefficient: Option<f64>,
    /// Maximum number of attempts, the first one included
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_attempts: Option<i32>,
    /// Error kinds that must never be retried
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub non_retryable_error_kinds: BTreeSet<String>,
}

impl RetryPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_initial_interval(mut self, interval: PolicyDuration) -> Self {
        self.initial_interval = interval;
        self
    }

    pub fn with_max_interval(mut self, interval: PolicyDuration) -> Self {
        self.max_interval = interval;
        self
    }

    pub fn with_backoff_coefficient(mut self, coefficient: f64) -> Self {
        self.backoff_coefficient = Some(coefficient);
        self
    }

    pub fn with_max_attempts(mut self, attempts: i32) -> Self {
        self.max_attempts = Some(attempts);
        self
    }

    pub fn with_non_retryable(mut self, kind: impl Into<String>) -> Self {
        self.non_retryable_error_kinds.insert(kind.into());
        self
    }

    /// True when no field would survive a merge.
    pub fn is_vacant(&self) -> bool {
        !self.initial_interval.is_valid()
            && !self.max_interval.is_valid()
            && self.backoff_coefficient.is_none()
            && self.max_attempts.is_none()
            && self.non_retryable_error_kinds.is_empty()
    }
}

// ── Default Invocation Policy ────────────────────────────────────────

/// Defaults declared for one method
#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct DefaultInvocationPolicy {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_policy: Option<RetryPolicy>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub timeouts: BTreeMap<TimeoutKind, PolicyDuration>,
}

impl DefaultInvocationPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = Some(policy);
        self
    }

    pub fn with_timeout(mut self, kind: TimeoutKind, duration: PolicyDuration) -> Self {
        self.timeouts.insert(kind, duration);
        self
    }

    /// Declared timeout for a kind; `UNSET` when not declared.
    pub fn timeout(&self, kind: TimeoutKind) -> PolicyDuration {
        self.timeouts
            .get(&kind)
            .copied()
            .unwrap_or(PolicyDuration::UNSET)
    }
}
