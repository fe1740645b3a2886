//! Method and service schemas
//!
//! A `ServiceSchema` is the ordered list of activity methods a descriptor
//! reader produced. Declaration order is significant: everything generated
//! from a schema preserves it.

use crate::{DefaultInvocationPolicy, Locality, SchemaError, SchemaResult};
use serde::{Deserialize, Serialize};

// ── Type References ──────────────────────────────────────────────────

/// Reference to a message type, e.g. `mutex.v1.RenewLeaseRequest`
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TypeRef(pub String);

impl TypeRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Fully qualified name as declared
    pub fn full_name(&self) -> &str {
        &self.0
    }

    /// Last path segment, e.g. `RenewLeaseRequest`
    pub fn simple_name(&self) -> &str {
        self.0.rsplit('.').next().unwrap_or(&self.0)
    }

    /// Package prefix, if the reference is qualified
    pub fn package(&self) -> Option<&str> {
        self.0.rsplit_once('.').map(|(pkg, _)| pkg)
    }

    /// Dotted path of identifiers, no empty segments
    pub fn is_well_formed(&self) -> bool {
        !self.0.is_empty() && self.0.split('.').all(is_identifier)
    }
}

impl std::fmt::Display for TypeRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// `[A-Za-z_][A-Za-z0-9_]*`
pub fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

// ── Method Schema ────────────────────────────────────────────────────

/// One activity method plus its default invocation policy
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MethodSchema {
    /// Method name as declared in the service
    pub name: String,
    /// Input message; `None` means the method takes no input
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_type: Option<TypeRef>,
    /// Output message; `None` means the method produces no output
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_type: Option<TypeRef>,
    /// Execution locality
    #[serde(default)]
    pub locality: Locality,
    /// Declared defaults
    #[serde(default)]
    pub defaults: DefaultInvocationPolicy,
    /// Leading comment from the descriptor
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
    /// Explicit logical name, replacing the derived one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logical_name: Option<String>,
}

impl MethodSchema {
    /// Create a durable method with no input, no output and no defaults
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            input_type: None,
            output_type: None,
            locality: Locality::Durable,
            defaults: DefaultInvocationPolicy::default(),
            doc: None,
            logical_name: None,
        }
    }

    pub fn with_input(mut self, input: impl Into<String>) -> Self {
        self.input_type = Some(TypeRef::new(input));
        self
    }

    pub fn with_output(mut self, output: impl Into<String>) -> Self {
        self.output_type = Some(TypeRef::new(output));
        self
    }

    pub fn with_locality(mut self, locality: Locality) -> Self {
        self.locality = locality;
        self
    }

    pub fn local(self) -> Self {
        self.with_locality(Locality::Local)
    }

    pub fn with_defaults(mut self, defaults: DefaultInvocationPolicy) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    pub fn with_logical_name(mut self, name: impl Into<String>) -> Self {
        self.logical_name = Some(name.into());
        self
    }

    pub fn has_input(&self) -> bool {
        self.input_type.is_some()
    }

    pub fn has_output(&self) -> bool {
        self.output_type.is_some()
    }

    /// Validate the method for structural correctness
    pub fn validate(&self) -> SchemaResult<()> {
        if self.name.trim().is_empty() {
            return Err(SchemaError::MissingName);
        }
        if !is_identifier(&self.name) {
            return Err(SchemaError::InvalidName {
                method: self.name.clone(),
            });
        }

        for (role, type_ref) in [("input", &self.input_type), ("output", &self.output_type)] {
            if let Some(type_ref) = type_ref {
                if !type_ref.is_well_formed() {
                    return Err(SchemaError::MalformedTypeRef {
                        method: self.name.clone(),
                        role,
                        type_ref: type_ref.0.clone(),
                    });
                }
            }
        }

        if let Some(name) = &self.logical_name {
            if name.is_empty() || name.chars().any(char::is_whitespace) {
                return Err(SchemaError::InvalidLogicalName {
                    method: self.name.clone(),
                    logical_name: name.clone(),
                });
            }
        }

        if let Some(policy) = &self.defaults.retry_policy {
            let reason = match (policy.backoff_coefficient, policy.max_attempts) {
                (Some(c), _) if !c.is_finite() => {
                    Some(format!("backoff coefficient {} is not finite", c))
                }
                (Some(c), _) if c < 1.0 => Some(format!("backoff coefficient {} is below 1.0", c)),
                (_, Some(n)) if n < 0 => Some(format!("maximum attempts {} is negative", n)),
                _ => None,
            };
            if let Some(reason) = reason {
                return Err(SchemaError::InvalidRetryPolicy {
                    method: self.name.clone(),
                    reason,
                });
            }
        }

        Ok(())
    }
}

// ── Service Schema ───────────────────────────────────────────────────

/// The activity methods of one service, in declaration order
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ServiceSchema {
    /// Package the service is declared in, e.g. `mutex.v1`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,
    /// Service name, e.g. `Mutex`
    pub name: String,
    /// Methods in declaration order
    #[serde(default)]
    pub methods: Vec<MethodSchema>,
}

impl ServiceSchema {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            package: None,
            name: name.into(),
            methods: Vec::new(),
        }
    }

    pub fn with_package(mut self, package: impl Into<String>) -> Self {
        self.package = Some(package.into());
        self
    }

    pub fn with_method(mut self, method: MethodSchema) -> Self {
        self.methods.push(method);
        self
    }

    /// `package.Service`, or just `Service` without a package
    pub fn full_name(&self) -> String {
        match &self.package {
            Some(pkg) if !pkg.is_empty() => format!("{}.{}", pkg, self.name),
            _ => self.name.clone(),
        }
    }

    pub fn get_method(&self, name: &str) -> Option<&MethodSchema> {
        self.methods.iter().find(|m| m.name == name)
    }
}
