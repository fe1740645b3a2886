//! Activity Runtime Contract
//!
//! The surface synthesized activity wrappers are written against:
//!
//! - [`Context`]: the caller's ambient state (orchestrator handle, separate
//!   option scopes for durable and local activities, cancellation).
//! - [`ActivityRegistry`]: explicit logical name → [`ActivityHandler`] map.
//! - [`Orchestrator`]: schedules a [`ScheduleRequest`] without blocking.
//! - [`ActivityStub`]: one method's async and sync entry points.
//! - [`ActivityFuture`] and [`Selector`]: resolving pending invocations one
//!   at a time or multiplexed.
//! - [`SimulatedOrchestrator`]: in-memory orchestrator with retry semantics.
//!
//! ```rust
//! use std::sync::Arc;
//! use activity_runtime::*;
//!
//! # tokio_test_block(async {
//! let mut registry = ActivityRegistry::new();
//! registry
//!     .register("mutex.v1.Mutex.Ping", handler_fn(|_ctx, _: ()| async { Ok(()) }))
//!     .unwrap();
//!
//! let ctx = Context::new(Arc::new(SimulatedOrchestrator::new(registry)));
//! let ping: ActivityStub<(), ()> = ActivityStub::durable("mutex.v1.Mutex.Ping")
//!     .with_input(false)
//!     .with_output(false);
//! ping.execute(&ctx, (), None).await.unwrap();
//! # });
//! # fn tokio_test_block<F: std::future::Future>(f: F) {
//! #     tokio::runtime::Runtime::new().unwrap().block_on(f);
//! # }
//! ```

#![deny(unsafe_code)]

mod context;
mod errors;
mod future;
mod orchestrator;
mod registry;
mod selector;
mod simulated;
mod stub;
mod target;

pub use context::*;
pub use errors::*;
pub use future::*;
pub use orchestrator::*;
pub use registry::*;
pub use selector::*;
pub use simulated::*;
pub use stub::*;
pub use target::*;
