//! Naming conventions for synthesized artifacts.
//!
//! Method identifiers are normalized to UpperCamelCase; every other name is
//! derived from the normalized identifier plus a configurable affix.

use activity_types::{MethodSchema, ServiceSchema};
use heck::ToUpperCamelCase;
use serde::{Deserialize, Serialize};

/// Affixes used to derive artifact names.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NamingConfig {
    /// Name of the aggregated capability contract.
    pub capability_name: String,
    /// Prefix of asynchronous entry points.
    pub async_prefix: String,
    /// Suffix of local-activity entry points.
    pub local_suffix: String,
    /// Suffix of future handle types.
    pub future_suffix: String,
    /// Prefix of registration functions.
    pub register_prefix: String,
    /// Suffix of per-method registration functions.
    pub activity_suffix: String,
    /// Suffix of logical-name constants.
    pub logical_name_suffix: String,
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            capability_name: "Activities".into(),
            async_prefix: "Async".into(),
            local_suffix: "Local".into(),
            future_suffix: "Future".into(),
            register_prefix: "Register".into(),
            activity_suffix: "Activity".into(),
            logical_name_suffix: "ActivityName".into(),
        }
    }
}

/// Every name synthesized for one method.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MethodNames {
    pub method: String,
    pub logical_name: String,
    pub logical_name_const: String,
    pub register_fn: String,
    pub future_type: String,
    pub sync_entry: String,
    pub async_entry: String,
}

impl NamingConfig {
    /// Normalized method identifier, e.g. `renew_lease` → `RenewLease`.
    pub fn method_ident(&self, method: &MethodSchema) -> String {
        method.name.to_upper_camel_case()
    }

    /// Logical name the runtime dispatches on.
    ///
    /// An explicit override wins; otherwise `package.Service.Method` with
    /// the method name as declared.
    pub fn logical_name(&self, service: &ServiceSchema, method: &MethodSchema) -> String {
        match &method.logical_name {
            Some(name) => name.clone(),
            None => format!("{}.{}", service.full_name(), method.name),
        }
    }

    pub fn method_names(&self, service: &ServiceSchema, method: &MethodSchema) -> MethodNames {
        let ident = self.method_ident(method);
        let entry = if method.locality.is_local() {
            format!("{}{}", ident, self.local_suffix)
        } else {
            ident.clone()
        };

        MethodNames {
            logical_name: self.logical_name(service, method),
            logical_name_const: format!("{}{}", ident, self.logical_name_suffix),
            register_fn: format!("{}{}{}", self.register_prefix, ident, self.activity_suffix),
            future_type: format!("{}{}", ident, self.future_suffix),
            async_entry: format!("{}{}", self.async_prefix, entry),
            sync_entry: entry,
            method: ident,
        }
    }

    /// Aggregate registration function, e.g. `RegisterActivities`.
    pub fn register_all_fn(&self) -> String {
        format!("{}{}", self.register_prefix, self.capability_name)
    }

    /// Top-level symbols declared once per service.
    pub fn service_symbols(&self) -> [String; 2] {
        [self.capability_name.clone(), self.register_all_fn()]
    }
}
