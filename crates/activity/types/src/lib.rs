//! Activity Schema Model
//!
//! Normalized, immutable description of the activity methods a service
//! exposes to the durable-execution runtime. Records are produced once by
//! a descriptor reader and consumed by the wrapper synthesizer.
//!
//! # Key Concepts
//!
//! - **MethodSchema**: one activity method: name, optional input/output
//!   message types, locality, and its attached default policy.
//! - **DefaultInvocationPolicy**: the retry policy and per-kind timeouts
//!   declared alongside the method.
//! - **PolicyDuration**: a nanosecond count paired with a validity flag.
//!   "Invalid" and "valid zero" are different states and stay different.
//! - **Locality**: `Durable` activities go through the runtime's task
//!   queues; `Local` activities run in-process with the caller.
//!
//! # Design Principles
//!
//! 1. Absence is explicit. `None` input means "no input", never "empty
//!    message".
//! 2. Every numeric policy field is optional; zero is a value, not a
//!    sentinel.
//! 3. Schema records are immutable for the lifetime of a generation run.

#![deny(unsafe_code)]

mod duration;
mod errors;
mod policy;
mod schema;

pub use duration::*;
pub use errors::*;
pub use policy::*;
pub use schema::*;
