//! Runtime error types

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure reported by an activity implementation.
#[derive(Clone, Debug, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{kind}: {message}")]
pub struct ActivityError {
    /// Error type name matched against non-retryable kinds
    pub kind: String,
    pub message: String,
    /// Set by the implementation to stop retries regardless of policy
    #[serde(default)]
    pub non_retryable: bool,
}

impl ActivityError {
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
            non_retryable: false,
        }
    }

    pub fn non_retryable(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            non_retryable: true,
            ..Self::new(kind, message)
        }
    }
}

pub type ActivityResult<T> = Result<T, ActivityError>;

/// Errors surfaced by entry points, futures and selectors.
#[derive(Debug, Error)]
pub enum InvocationError {
    /// The runtime refused to schedule the invocation.
    #[error("scheduling rejected for '{activity}': {reason}")]
    SchedulingRejected { activity: String, reason: String },

    /// Every attempt allowed by the retry policy failed.
    #[error("activity '{activity}' failed after {attempts} attempt(s): {source}")]
    Failed {
        activity: String,
        attempts: u32,
        #[source]
        source: ActivityError,
    },

    /// The caller's context was cancelled while waiting.
    #[error("invocation cancelled")]
    Cancelled,

    /// Input could not be encoded or output could not be decoded.
    #[error("payload codec error for '{activity}': {source}")]
    Codec {
        activity: String,
        #[source]
        source: serde_json::Error,
    },
}

impl InvocationError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, InvocationError::Cancelled)
    }

    /// The implementation's error, when the invocation ran and failed.
    pub fn activity_error(&self) -> Option<&ActivityError> {
        match self {
            InvocationError::Failed { source, .. } => Some(source),
            _ => None,
        }
    }
}

pub type InvocationResult<T> = Result<T, InvocationError>;

/// Registry construction errors
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("activity name must not be empty")]
    EmptyName,

    #[error("activity '{0}' is already registered")]
    Duplicate(String),
}

pub type RegistryResult<T> = Result<T, RegistryError>;
