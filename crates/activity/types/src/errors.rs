//! Error types for the schema model

/// A method schema that cannot be synthesized
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SchemaError {
    #[error("Method name is missing")]
    MissingName,

    #[error("Invalid method name: '{method}'")]
    InvalidName { method: String },

    #[error("Method '{method}': malformed {role} type reference '{type_ref}'")]
    MalformedTypeRef {
        method: String,
        role: &'static str,
        type_ref: String,
    },

    #[error("Method '{method}': invalid logical name '{logical_name}'")]
    InvalidLogicalName {
        method: String,
        logical_name: String,
    },

    #[error("Method '{method}': invalid retry policy: {reason}")]
    InvalidRetryPolicy { method: String, reason: String },

    #[error("Duplicate method: '{method}'")]
    DuplicateMethod { method: String },

    #[error("Method '{method}': logical name '{logical_name}' already in use")]
    DuplicateLogicalName {
        method: String,
        logical_name: String,
    },

    #[error("Method '{method}': generated name '{name}' already in use")]
    NameCollision { method: String, name: String },
}

impl SchemaError {
    /// The offending method's name, when it has one
    pub fn method(&self) -> Option<&str> {
        match self {
            SchemaError::MissingName => None,
            SchemaError::InvalidName { method }
            | SchemaError::MalformedTypeRef { method, .. }
            | SchemaError::InvalidLogicalName { method, .. }
            | SchemaError::InvalidRetryPolicy { method, .. }
            | SchemaError::DuplicateMethod { method }
            | SchemaError::DuplicateLogicalName { method, .. }
            | SchemaError::NameCollision { method, .. } => Some(method),
        }
    }
}

/// Result type alias for schema operations
pub type SchemaResult<T> = Result<T, SchemaError>;
