//! Boundary durations with an explicit validity flag

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A duration as it crosses the descriptor boundary.
///
/// Carries a signed nanosecond count and a validity flag. A negative count
/// is never valid. `PolicyDuration::from_nanos(0)` is *valid zero*, which
/// means "explicitly no timeout" and is distinct from [`PolicyDuration::UNSET`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "RawPolicyDuration")]
pub struct PolicyDuration {
    nanos: i64,
    valid: bool,
}

/// Wire shape; normalized through [`PolicyDuration::with_validity`] on the way in.
#[derive(Deserialize)]
struct RawPolicyDuration {
    nanos: i64,
    #[serde(default = "default_valid")]
    valid: bool,
}

fn default_valid() -> bool {
    true
}

impl From<RawPolicyDuration> for PolicyDuration {
    fn from(raw: RawPolicyDuration) -> Self {
        Self::with_validity(raw.nanos, raw.valid)
    }
}

impl PolicyDuration {
    /// The explicit unset sentinel.
    pub const UNSET: Self = Self {
        nanos: -1,
        valid: false,
    };

    /// Valid zero: present, meaning "no timeout".
    pub const ZERO: Self = Self {
        nanos: 0,
        valid: true,
    };

    /// Build from a nanosecond count. Negative counts are invalid.
    pub fn from_nanos(nanos: i64) -> Self {
        Self {
            nanos,
            valid: nanos >= 0,
        }
    }

    /// Build from whole seconds, saturating into the invalid state on overflow.
    pub fn from_secs(secs: i64) -> Self {
        match secs.checked_mul(1_000_000_000) {
            Some(nanos) => Self::from_nanos(nanos),
            None => Self::UNSET,
        }
    }

    /// Build from whole milliseconds, saturating into the invalid state on overflow.
    pub fn from_millis(millis: i64) -> Self {
        match millis.checked_mul(1_000_000) {
            Some(nanos) => Self::from_nanos(nanos),
            None => Self::UNSET,
        }
    }

    /// Build from a raw nanosecond count and an externally supplied flag.
    ///
    /// The flag can only make a duration less valid: a negative count stays
    /// invalid even if the flag claims otherwise.
    pub fn with_validity(nanos: i64, valid: bool) -> Self {
        Self {
            nanos,
            valid: valid && nanos >= 0,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Valid and exactly zero.
    pub fn is_valid_zero(&self) -> bool {
        self.valid && self.nanos == 0
    }

    /// Raw nanosecond count, meaningful only when valid.
    pub fn nanos(&self) -> i64 {
        self.nanos
    }

    /// The duration, if valid.
    pub fn as_duration(&self) -> Option<Duration> {
        if self.valid {
            Some(Duration::from_nanos(self.nanos as u64))
        } else {
            None
        }
    }
}

impl Default for PolicyDuration {
    fn default() -> Self {
        Self::UNSET
    }
}

impl From<Duration> for PolicyDuration {
    fn from(d: Duration) -> Self {
        match i64::try_from(d.as_nanos()) {
            Ok(nanos) => Self::from_nanos(nanos),
            Err(_) => Self::UNSET,
        }
    }
}

impl std::fmt::Display for PolicyDuration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.as_duration() {
            Some(d) => write!(f, "{:?}", d),
            None => write!(f, "unset"),
        }
    }
}
