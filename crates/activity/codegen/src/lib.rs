//! Activity Wrapper Synthesis
//!
//! Reads a service descriptor, validates each activity method and emits a
//! format-agnostic IR describing the glue a caller needs around it:
//!
//! - a **capability contract** the worker implements,
//! - a **registration binding** per method plus one aggregate registration,
//! - a **future handle** per method (`Get` / `Select`),
//! - an **async entry** that merges declared defaults, resolves the target
//!   and schedules,
//! - a **sync entry** that awaits the async entry.
//!
//! A method that fails validation is reported and left out; the rest of
//! the service is still emitted.
//!
//! ```rust
//! use activity_codegen::{JsonBackend, EmissionBackend, WrapperSynthesizer};
//! use activity_types::{MethodSchema, ServiceSchema};
//!
//! let service = ServiceSchema::new("Mutex")
//!     .with_package("mutex.v1")
//!     .with_method(MethodSchema::new("RenewLease").with_input("mutex.v1.RenewLeaseRequest"));
//!
//! let synthesis = WrapperSynthesizer::new().synthesize(&service);
//! assert!(synthesis.is_clean());
//! let json = JsonBackend::new().render(&synthesis.ir).unwrap();
//! assert!(json.contains("AsyncRenewLease"));
//! ```

#![deny(unsafe_code)]

mod backend;
mod descriptor;
mod error;
mod ir;
mod naming;
mod pipeline;
mod synthesizer;

pub use backend::*;
pub use descriptor::*;
pub use error::*;
pub use ir::*;
pub use naming::*;
pub use pipeline::*;
pub use synthesizer::*;
