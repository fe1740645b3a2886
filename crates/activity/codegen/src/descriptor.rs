//! Service descriptor reader: TOML/JSON documents into [`ServiceSchema`].
//!
//! A descriptor lists every procedure of one service. Only methods carrying
//! an `activity` section are activity methods; the rest are skipped.
//!
//! ```toml
//! package = "mutex.v1"
//! service = "Mutex"
//!
//! [[methods]]
//! name = "RenewLease"
//! input = "mutex.v1.RenewLeaseRequest"
//! output = "google.protobuf.Empty"
//!
//! [methods.activity.default_options]
//! start_to_close_timeout = { seconds = 5 }
//! ```

use std::path::{Path, PathBuf};

use activity_types::{
    DefaultInvocationPolicy, Locality, MethodSchema, PolicyDuration, RetryPolicy, ServiceSchema,
    TimeoutKind, TypeRef,
};
use serde::{Deserialize, Serialize};

use crate::error::{DescriptorError, DescriptorResult};

/// Largest magnitude of the `seconds` field (10,000 years).
const MAX_SECONDS: i64 = 315_576_000_000;
const MAX_NANOS: i32 = 999_999_999;
const NANOS_PER_SECOND: i64 = 1_000_000_000;

// ── Document Shape ─────────────────────────────────────────────────────

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceDescriptor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,
    pub service: String,
    #[serde(default)]
    pub methods: Vec<MethodDescriptor>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MethodDescriptor {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    /// Leading comment attached to the method.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activity: Option<ActivityDescriptor>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ActivityDescriptor {
    #[serde(default)]
    pub local: bool,
    /// Logical-name override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub default_options: StartOptionsDescriptor,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StartOptionsDescriptor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heartbeat_timeout: Option<DurationDescriptor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule_to_close_timeout: Option<DurationDescriptor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule_to_start_timeout: Option<DurationDescriptor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_to_close_timeout: Option<DurationDescriptor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_policy: Option<RetryPolicyDescriptor>,
}

impl StartOptionsDescriptor {
    fn timeout(&self, kind: TimeoutKind) -> Option<&DurationDescriptor> {
        match kind {
            TimeoutKind::Heartbeat => self.heartbeat_timeout.as_ref(),
            TimeoutKind::ScheduleToClose => self.schedule_to_close_timeout.as_ref(),
            TimeoutKind::ScheduleToStart => self.schedule_to_start_timeout.as_ref(),
            TimeoutKind::StartToClose => self.start_to_close_timeout.as_ref(),
        }
    }
}

/// `{ seconds, nanos }`, both signed and sharing a sign.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DurationDescriptor {
    #[serde(default)]
    pub seconds: i64,
    #[serde(default)]
    pub nanos: i32,
}

impl DurationDescriptor {
    pub fn new(seconds: i64, nanos: i32) -> Self {
        Self { seconds, nanos }
    }

    /// Convert to a boundary duration; out-of-range values become invalid.
    pub fn to_policy(&self) -> PolicyDuration {
        if !(-MAX_SECONDS..=MAX_SECONDS).contains(&self.seconds)
            || !(-MAX_NANOS..=MAX_NANOS).contains(&self.nanos)
        {
            return PolicyDuration::UNSET;
        }
        if (self.seconds < 0 && self.nanos > 0) || (self.seconds > 0 && self.nanos < 0) {
            return PolicyDuration::UNSET;
        }
        match self
            .seconds
            .checked_mul(NANOS_PER_SECOND)
            .and_then(|n| n.checked_add(i64::from(self.nanos)))
        {
            Some(total) => PolicyDuration::from_nanos(total),
            None => PolicyDuration::UNSET,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RetryPolicyDescriptor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_interval: Option<DurationDescriptor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_interval: Option<DurationDescriptor>,
    #[serde(default)]
    pub backoff_coefficient: f64,
    #[serde(default)]
    pub max_attempts: i32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub non_retryable_error_types: Vec<String>,
}

impl RetryPolicyDescriptor {
    /// Wire zeros are "not declared".
    pub fn to_policy(&self) -> RetryPolicy {
        RetryPolicy {
            initial_interval: policy_or_unset(self.initial_interval.as_ref()),
            max_interval: policy_or_unset(self.max_interval.as_ref()),
            backoff_coefficient: (self.backoff_coefficient != 0.0).then_some(self.backoff_coefficient),
            max_attempts: (self.max_attempts != 0).then_some(self.max_attempts),
            non_retryable_error_kinds: self.non_retryable_error_types.iter().cloned().collect(),
        }
    }
}

fn policy_or_unset(d: Option<&DurationDescriptor>) -> PolicyDuration {
    d.map(DurationDescriptor::to_policy)
        .unwrap_or(PolicyDuration::UNSET)
}

// ── Reader ─────────────────────────────────────────────────────────────

/// Document syntax, picked from the file extension.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DescriptorFormat {
    Toml,
    Json,
}

impl DescriptorFormat {
    pub fn from_path(path: &Path) -> DescriptorResult<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Ok(Self::Toml),
            Some("json") => Ok(Self::Json),
            Some(other) => Err(DescriptorError::UnsupportedFormat(other.to_string())),
            None => Err(DescriptorError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// Reader configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderConfig {
    /// Type names meaning "no payload".
    pub empty_types: Vec<String>,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            empty_types: vec!["google.protobuf.Empty".to_string()],
        }
    }
}

/// Loads service descriptors and normalizes them into schemas.
#[derive(Clone, Debug, Default)]
pub struct DescriptorReader {
    config: ReaderConfig,
}

impl DescriptorReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: ReaderConfig) -> Self {
        self.config = config;
        self
    }

    pub fn read_path(&self, path: impl AsRef<Path>) -> DescriptorResult<ServiceSchema> {
        let path = path.as_ref();
        let format = DescriptorFormat::from_path(path)?;
        let text = std::fs::read_to_string(path).map_err(|source| DescriptorError::Io {
            path: PathBuf::from(path),
            source,
        })?;
        tracing::debug!(path = %path.display(), ?format, "Reading descriptor");
        self.parse_str(&text, format)
    }

    pub fn parse_str(&self, text: &str, format: DescriptorFormat) -> DescriptorResult<ServiceSchema> {
        let descriptor: ServiceDescriptor = match format {
            DescriptorFormat::Toml => toml::from_str(text)?,
            DescriptorFormat::Json => serde_json::from_str(text)?,
        };
        self.normalize(&descriptor)
    }

    /// Turn a parsed document into a schema. Method-level problems are left
    /// for validation so one bad method does not sink the service.
    pub fn normalize(&self, descriptor: &ServiceDescriptor) -> DescriptorResult<ServiceSchema> {
        if descriptor.service.trim().is_empty() {
            return Err(DescriptorError::InvalidService("service name is empty".into()));
        }

        let mut schema = ServiceSchema::new(descriptor.service.clone());
        schema.package = descriptor.package.clone().filter(|p| !p.is_empty());

        for method in &descriptor.methods {
            let Some(activity) = &method.activity else {
                tracing::debug!(method = %method.name, "Skipping method without activity options");
                continue;
            };
            schema.methods.push(self.method_schema(method, activity));
        }

        Ok(schema)
    }

    fn method_schema(&self, method: &MethodDescriptor, activity: &ActivityDescriptor) -> MethodSchema {
        let options = &activity.default_options;

        let mut defaults = DefaultInvocationPolicy::new();
        for kind in TimeoutKind::ALL {
            if let Some(d) = options.timeout(kind) {
                defaults = defaults.with_timeout(kind, d.to_policy());
            }
        }
        if let Some(retry) = &options.retry_policy {
            defaults = defaults.with_retry_policy(retry.to_policy());
        }

        MethodSchema {
            name: method.name.clone(),
            input_type: self.payload(method.input.as_deref()),
            output_type: self.payload(method.output.as_deref()),
            locality: if activity.local {
                Locality::Local
            } else {
                Locality::Durable
            },
            defaults,
            doc: method.comments.clone(),
            logical_name: activity.name.clone(),
        }
    }

    fn payload(&self, type_name: Option<&str>) -> Option<TypeRef> {
        let name = type_name?.trim().trim_start_matches('.');
        if name.is_empty() || self.config.empty_types.iter().any(|e| e == name) {
            None
        } else {
            Some(TypeRef::new(name))
        }
    }
}
