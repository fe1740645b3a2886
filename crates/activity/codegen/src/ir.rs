//! Format-agnostic wrapper IR.
//!
//! The IR names things and describes parameter/return shapes; it does not
//! contain target-language syntax. An emission backend turns it into text.
//!
//! One [`MethodIr`] group per accepted method, in declaration order, each
//! holding the capability signature, registration binding, future
//! descriptor, and the async/sync entry descriptors. [`ServiceIr`] adds the
//! aggregated capability contract and registration step.

use activity_options::DefaultsPlan;
use activity_types::{Locality, TypeRef};
use serde::{Deserialize, Serialize};

// ── Shapes ─────────────────────────────────────────────────────────────

/// Parameter or return value shape.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Shape {
    /// Ambient context of the orchestrating caller.
    CallerContext,
    /// Execution context handed to an implementation.
    ActivityContext,
    /// A message payload.
    Message { type_ref: TypeRef },
    /// The error channel.
    Error,
    /// A future handle type.
    Future { type_name: String },
    /// A multiplexed wait-set.
    Selector,
    /// Callback invoked with a resolved future.
    Callback { future: String },
    /// A callable with the capability method's shape.
    Implementation {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        input: Option<TypeRef>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        output: Option<TypeRef>,
    },
    /// A value implementing a capability contract.
    Capability { name: String },
    /// Name → implementation registry.
    Registry,
    /// A shape the caller may omit.
    Optional { inner: Box<Shape> },
}

impl Shape {
    pub fn message(type_ref: &TypeRef) -> Self {
        Shape::Message {
            type_ref: type_ref.clone(),
        }
    }

    pub fn optional(inner: Shape) -> Self {
        Shape::Optional {
            inner: Box::new(inner),
        }
    }
}

/// A named parameter.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Param {
    pub name: String,
    pub shape: Shape,
}

impl Param {
    pub fn new(name: impl Into<String>, shape: Shape) -> Self {
        Self {
            name: name.into(),
            shape,
        }
    }
}

/// A callable's name, parameters and results.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    pub name: String,
    pub params: Vec<Param>,
    pub returns: Vec<Shape>,
}

impl Signature {
    pub fn param(&self, name: &str) -> Option<&Param> {
        self.params.iter().find(|p| p.name == name)
    }

    pub fn param_names(&self) -> Vec<&str> {
        self.params.iter().map(|p| p.name.as_str()).collect()
    }
}

// ── Per-Method Artifacts ───────────────────────────────────────────────

/// The behaviour an implementer must provide.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityMethod {
    pub signature: Signature,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
}

/// Binds the logical name to an implementation inside a registry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationBinding {
    pub signature: Signature,
    pub logical_name_const: String,
    pub logical_name: String,
}

/// Handle over one pending invocation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FutureDescriptor {
    pub type_name: String,
    /// Decoded on resolution; `None` resolves to a completion signal only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<TypeRef>,
    pub get: Signature,
    pub select: Signature,
}

/// How an async entry picks what to schedule.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TargetResolution {
    /// Always the logical name.
    LogicalName { constant: String },
    /// The inline implementation when supplied, otherwise the logical name.
    InlineOrLogicalName { inline_param: String, constant: String },
}

/// Merges defaults, resolves the target, schedules, wraps in a future.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AsyncEntryDescriptor {
    pub signature: Signature,
    /// Which ambient option scope is read and written back.
    pub options_scope: Locality,
    /// Defaults merged into unset fields at call time.
    pub defaults: DefaultsPlan,
    pub target: TargetResolution,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
}

/// Calls the async entry, then `get`s the result.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncEntryDescriptor {
    pub signature: Signature,
    pub delegates_to: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
}

/// Everything synthesized for one method.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MethodIr {
    /// Normalized method identifier.
    pub name: String,
    pub locality: Locality,
    pub capability: CapabilityMethod,
    pub registration: RegistrationBinding,
    pub future: FutureDescriptor,
    pub async_entry: AsyncEntryDescriptor,
    pub sync_entry: SyncEntryDescriptor,
}

impl MethodIr {
    pub fn has_input(&self) -> bool {
        self.capability.signature.param("req").is_some()
    }

    pub fn has_output(&self) -> bool {
        self.future.output.is_some()
    }

    /// Top-level symbols this method declares.
    ///
    /// `name` is excluded: it names a member of the capability contract,
    /// not a top-level item.
    pub fn symbols(&self) -> [&str; 5] {
        [
            self.sync_entry.signature.name.as_str(),
            self.async_entry.signature.name.as_str(),
            self.future.type_name.as_str(),
            self.registration.logical_name_const.as_str(),
            self.registration.signature.name.as_str(),
        ]
    }
}

// ── Service-Level Glue ─────────────────────────────────────────────────

/// All capability methods of a service.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityContract {
    pub name: String,
    pub methods: Vec<CapabilityMethod>,
}

/// Registers every capability method with one call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationStep {
    pub signature: Signature,
    /// Per-method binding functions, in declaration order.
    pub bindings: Vec<String>,
}

/// The IR for one service.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ServiceIr {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,
    pub service: String,
    pub capability: CapabilityContract,
    pub registration: RegistrationStep,
    pub methods: Vec<MethodIr>,
}

impl ServiceIr {
    pub fn method(&self, name: &str) -> Option<&MethodIr> {
        self.methods.iter().find(|m| m.name == name)
    }

    pub fn method_names(&self) -> Vec<&str> {
        self.methods.iter().map(|m| m.name.as_str()).collect()
    }
}
