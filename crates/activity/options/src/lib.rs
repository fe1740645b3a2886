//! Activity Options and Default Merging
//!
//! Call sites carry an [`EffectiveOptions`] value; schemas carry a
//! [`DefaultInvocationPolicy`](activity_types::DefaultInvocationPolicy).
//! The merger fills the gaps in the former from the latter.
//!
//! # Rules
//!
//! 1. A field the caller already set is never overwritten.
//! 2. Only valid defaults are applied. Invalid defaults are left for the
//!    runtime's built-in values.
//! 3. Which timeout kinds may be defaulted depends only on locality.
//! 4. Merging is idempotent.
//!
//! The merge is split in two: [`DefaultsPlan::compile`] runs once per method
//! at generation time and keeps only what could ever be applied;
//! [`DefaultsPlan::apply`] runs per call.
//!
//! ```rust
//! use activity_options::{merge, EffectiveOptions};
//! use activity_types::*;
//! use std::time::Duration;
//!
//! let defaults = DefaultInvocationPolicy::new()
//!     .with_timeout(TimeoutKind::StartToClose, PolicyDuration::from_secs(5));
//!
//! let mut opts = EffectiveOptions::new();
//! merge(&mut opts, &defaults, Locality::Durable);
//! assert_eq!(opts.start_to_close_timeout, Some(Duration::from_secs(5)));
//! ```

#![deny(unsafe_code)]

mod effective;
mod merger;

pub use effective::*;
pub use merger::*;
