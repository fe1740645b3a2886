//! Wrapper synthesizer: per-method artifacts plus service-level glue.
//!
//! Walks a service's methods in declaration order. For each method that
//! passes validation it emits five IR pieces; a method that fails is
//! reported with its identity and left out, and the run continues.
//!
//! The synthesizer is synchronous, holds no state across methods, and
//! produces identical output for identical input.

use std::collections::HashSet;

use activity_options::DefaultsPlan;
use activity_types::{MethodSchema, SchemaError, SchemaResult, ServiceSchema};

use crate::ir::*;
use crate::naming::{MethodNames, NamingConfig};

const CTX: &str = "ctx";
const REQ: &str = "req";
const INLINE: &str = "inline";

// ── Synthesis Output ───────────────────────────────────────────────────

/// A method that was left out of the IR.
#[derive(Clone, Debug, PartialEq)]
pub struct MethodRejection {
    /// Position in the service's declaration order.
    pub index: usize,
    pub error: SchemaError,
}

impl MethodRejection {
    /// Method name, or `#index` when the method has none.
    pub fn method_label(&self) -> String {
        match self.error.method() {
            Some(name) => name.to_string(),
            None => format!("#{}", self.index),
        }
    }
}

/// Result of synthesizing one service.
#[derive(Clone, Debug, PartialEq)]
pub struct Synthesis {
    pub ir: ServiceIr,
    pub rejected: Vec<MethodRejection>,
}

impl Synthesis {
    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty()
    }
}

// ── Synthesizer ────────────────────────────────────────────────────────

/// Emits wrapper IR from method schemas.
#[derive(Clone, Debug, Default)]
pub struct WrapperSynthesizer {
    naming: NamingConfig,
}

impl WrapperSynthesizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_naming(mut self, naming: NamingConfig) -> Self {
        self.naming = naming;
        self
    }

    pub fn naming(&self) -> &NamingConfig {
        &self.naming
    }

    /// Synthesize every method of a service, in declaration order.
    ///
    /// A method is rejected when its identifier, logical name or any of its
    /// top-level symbols is already taken by an earlier method or by the
    /// service-level glue.
    pub fn synthesize(&self, service: &ServiceSchema) -> Synthesis {
        let mut methods = Vec::with_capacity(service.methods.len());
        let mut rejected = Vec::new();
        let mut seen_idents = HashSet::new();
        let mut seen_logical = HashSet::new();
        let mut seen_symbols: HashSet<String> = self.naming.service_symbols().into_iter().collect();

        for (index, method) in service.methods.iter().enumerate() {
            let outcome = self.synthesize_method(service, method).and_then(|ir| {
                if seen_idents.contains(&ir.name) {
                    return Err(SchemaError::DuplicateMethod {
                        method: method.name.clone(),
                    });
                }
                if seen_logical.contains(&ir.registration.logical_name) {
                    return Err(SchemaError::DuplicateLogicalName {
                        method: method.name.clone(),
                        logical_name: ir.registration.logical_name.clone(),
                    });
                }
                let symbols = ir.symbols();
                let mut own = HashSet::new();
                if let Some(clash) = symbols
                    .iter()
                    .find(|s| seen_symbols.contains(**s) || !own.insert(**s))
                {
                    return Err(SchemaError::NameCollision {
                        method: method.name.clone(),
                        name: clash.to_string(),
                    });
                }
                seen_symbols.extend(symbols.iter().map(|s| s.to_string()));
                seen_idents.insert(ir.name.clone());
                seen_logical.insert(ir.registration.logical_name.clone());
                Ok(ir)
            });

            match outcome {
                Ok(ir) => methods.push(ir),
                Err(error) => {
                    let rejection = MethodRejection { index, error };
                    tracing::warn!(
                        service = %service.full_name(),
                        method = %rejection.method_label(),
                        error = %rejection.error,
                        "Method rejected"
                    );
                    rejected.push(rejection);
                }
            }
        }

        let ir = self.assemble(service, methods);
        tracing::info!(
            service = %service.full_name(),
            emitted = ir.methods.len(),
            rejected = rejected.len(),
            "Service synthesized"
        );

        Synthesis { ir, rejected }
    }

    /// Synthesize the five artifacts for a single method.
    pub fn synthesize_method(
        &self,
        service: &ServiceSchema,
        method: &MethodSchema,
    ) -> SchemaResult<MethodIr> {
        method.validate()?;

        let names = self.naming.method_names(service, method);
        if !names.method.starts_with(|c: char| c.is_ascii_alphabetic()) {
            return Err(SchemaError::InvalidName {
                method: method.name.clone(),
            });
        }
        let doc = method
            .doc
            .as_deref()
            .map(|d| d.trim_end_matches('\n').to_string())
            .filter(|d| !d.is_empty());

        let capability = CapabilityMethod {
            signature: self.capability_signature(&names, method),
            doc: doc.clone(),
        };
        let registration = self.registration_binding(&names, method);
        let future = self.future_descriptor(&names, method);
        let async_entry = self.async_entry(&names, method, doc.clone());
        let sync_entry = self.sync_entry(&names, method, &async_entry, doc);

        tracing::debug!(
            method = %names.method,
            locality = %method.locality,
            defaults = async_entry.defaults.timeouts.len(),
            "Method synthesized"
        );

        Ok(MethodIr {
            name: names.method,
            locality: method.locality,
            capability,
            registration,
            future,
            async_entry,
            sync_entry,
        })
    }

    // ── Artifacts ──────────────────────────────────────────────────────

    /// `(ctx, req?) -> (output?, error)`
    fn capability_signature(&self, names: &MethodNames, method: &MethodSchema) -> Signature {
        let mut params = vec![Param::new(CTX, Shape::ActivityContext)];
        if let Some(input) = &method.input_type {
            params.push(Param::new(REQ, Shape::message(input)));
        }
        Signature {
            name: names.method.clone(),
            params,
            returns: result_shapes(method),
        }
    }

    fn registration_binding(&self, names: &MethodNames, method: &MethodSchema) -> RegistrationBinding {
        RegistrationBinding {
            signature: Signature {
                name: names.register_fn.clone(),
                params: vec![
                    Param::new("registry", Shape::Registry),
                    Param::new("implementation", implementation_shape(method)),
                ],
                returns: vec![Shape::Error],
            },
            logical_name_const: names.logical_name_const.clone(),
            logical_name: names.logical_name.clone(),
        }
    }

    fn future_descriptor(&self, names: &MethodNames, method: &MethodSchema) -> FutureDescriptor {
        FutureDescriptor {
            type_name: names.future_type.clone(),
            output: method.output_type.clone(),
            get: Signature {
                name: "Get".into(),
                params: vec![Param::new(CTX, Shape::CallerContext)],
                returns: result_shapes(method),
            },
            select: Signature {
                name: "Select".into(),
                params: vec![
                    Param::new("selector", Shape::Selector),
                    Param::new(
                        "callback",
                        Shape::optional(Shape::Callback {
                            future: names.future_type.clone(),
                        }),
                    ),
                ],
                returns: vec![Shape::Selector],
            },
        }
    }

    /// `(ctx, req?, inline?) -> (future, error)`
    fn entry_params(&self, method: &MethodSchema) -> Vec<Param> {
        let mut params = vec![Param::new(CTX, Shape::CallerContext)];
        if let Some(input) = &method.input_type {
            params.push(Param::new(REQ, Shape::message(input)));
        }
        if method.locality.is_local() {
            params.push(Param::new(
                INLINE,
                Shape::optional(implementation_shape(method)),
            ));
        }
        params
    }

    fn async_entry(
        &self,
        names: &MethodNames,
        method: &MethodSchema,
        doc: Option<String>,
    ) -> AsyncEntryDescriptor {
        let target = if method.locality.is_local() {
            TargetResolution::InlineOrLogicalName {
                inline_param: INLINE.into(),
                constant: names.logical_name_const.clone(),
            }
        } else {
            TargetResolution::LogicalName {
                constant: names.logical_name_const.clone(),
            }
        };

        AsyncEntryDescriptor {
            signature: Signature {
                name: names.async_entry.clone(),
                params: self.entry_params(method),
                returns: vec![
                    Shape::Future {
                        type_name: names.future_type.clone(),
                    },
                    Shape::Error,
                ],
            },
            options_scope: method.locality,
            defaults: DefaultsPlan::compile(&method.defaults, method.locality),
            target,
            doc,
        }
    }

    fn sync_entry(
        &self,
        names: &MethodNames,
        method: &MethodSchema,
        async_entry: &AsyncEntryDescriptor,
        doc: Option<String>,
    ) -> SyncEntryDescriptor {
        SyncEntryDescriptor {
            signature: Signature {
                name: names.sync_entry.clone(),
                params: async_entry.signature.params.clone(),
                returns: result_shapes(method),
            },
            delegates_to: async_entry.signature.name.clone(),
            doc,
        }
    }

    // ── Glue ───────────────────────────────────────────────────────────

    fn assemble(&self, service: &ServiceSchema, methods: Vec<MethodIr>) -> ServiceIr {
        let capability = CapabilityContract {
            name: self.naming.capability_name.clone(),
            methods: methods.iter().map(|m| m.capability.clone()).collect(),
        };

        let registration = RegistrationStep {
            signature: Signature {
                name: self.naming.register_all_fn(),
                params: vec![
                    Param::new("registry", Shape::Registry),
                    Param::new(
                        "activities",
                        Shape::Capability {
                            name: self.naming.capability_name.clone(),
                        },
                    ),
                ],
                returns: vec![Shape::Error],
            },
            bindings: methods
                .iter()
                .map(|m| m.registration.signature.name.clone())
                .collect(),
        };

        ServiceIr {
            package: service.package.clone(),
            service: service.name.clone(),
            capability,
            registration,
            methods,
        }
    }
}

/// `(output?, error)`
fn result_shapes(method: &MethodSchema) -> Vec<Shape> {
    let mut returns = Vec::with_capacity(2);
    if let Some(output) = &method.output_type {
        returns.push(Shape::message(output));
    }
    returns.push(Shape::Error);
    returns
}

fn implementation_shape(method: &MethodSchema) -> Shape {
    Shape::Implementation {
        input: method.input_type.clone(),
        output: method.output_type.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use activity_types::*;
    use std::time::Duration;

    fn mutex_service() -> ServiceSchema {
        ServiceSchema::new("Mutex")
            .with_package("mutex.v1")
            .with_method(
                MethodSchema::new("RenewLease")
                    .with_input("mutex.v1.RenewLeaseRequest")
                    .with_defaults(
                        DefaultInvocationPolicy::new()
                            .with_timeout(TimeoutKind::StartToClose, PolicyDuration::from_secs(5)),
                    )
                    .with_doc("RenewLease extends a held lease\n"),
            )
            .with_method(MethodSchema::new("Ping"))
            .with_method(
                MethodSchema::new("RevokeLease")
                    .with_input("mutex.v1.RevokeLeaseRequest")
                    .with_output("mutex.v1.RevokeLeaseResponse")
                    .local()
                    .with_defaults(
                        DefaultInvocationPolicy::new()
                            .with_timeout(TimeoutKind::Heartbeat, PolicyDuration::from_secs(30))
                            .with_timeout(TimeoutKind::ScheduleToClose, PolicyDuration::from_secs(60)),
                    ),
            )
    }

    #[test]
    fn test_declaration_order_preserved() {
        let out = WrapperSynthesizer::new().synthesize(&mutex_service());
        assert!(out.is_clean());
        assert_eq!(out.ir.method_names(), vec!["RenewLease", "Ping", "RevokeLease"]);
        assert_eq!(
            out.ir.registration.bindings,
            vec![
                "RegisterRenewLeaseActivity",
                "RegisterPingActivity",
                "RegisterRevokeLeaseActivity"
            ]
        );
        assert_eq!(out.ir.capability.methods.len(), 3);
    }

    #[test]
    fn test_no_input_no_output_capability() {
        let out = WrapperSynthesizer::new().synthesize(&mutex_service());
        let ping = out.ir.method("Ping").unwrap();
        assert_eq!(ping.capability.signature.params, vec![Param::new("ctx", Shape::ActivityContext)]);
        assert_eq!(ping.capability.signature.returns, vec![Shape::Error]);
        assert_eq!(ping.future.get.returns, vec![Shape::Error]);
        assert!(!ping.has_input());
        assert!(!ping.has_output());
    }

    #[test]
    fn test_renew_lease_defaults() {
        let out = WrapperSynthesizer::new().synthesize(&mutex_service());
        let renew = out.ir.method("RenewLease").unwrap();
        let plan = &renew.async_entry.defaults;
        assert_eq!(plan.timeout(TimeoutKind::StartToClose), Some(Duration::from_secs(5)));
        assert_eq!(plan.timeouts.len(), 1);
        assert!(plan.retry_policy.is_none());
        assert_eq!(renew.capability.doc.as_deref(), Some("RenewLease extends a held lease"));
    }

    #[test]
    fn test_local_entry_shape() {
        let out = WrapperSynthesizer::new().synthesize(&mutex_service());
        let revoke = out.ir.method("RevokeLease").unwrap();

        assert_eq!(revoke.async_entry.signature.name, "AsyncRevokeLeaseLocal");
        assert_eq!(revoke.async_entry.signature.param_names(), vec!["ctx", "req", "inline"]);
        assert!(matches!(
            revoke.async_entry.target,
            TargetResolution::InlineOrLogicalName { .. }
        ));
        // Heartbeat is not applicable to local activities
        assert_eq!(revoke.async_entry.defaults.timeout(TimeoutKind::Heartbeat), None);
        assert_eq!(
            revoke.async_entry.defaults.timeout(TimeoutKind::ScheduleToClose),
            Some(Duration::from_secs(60))
        );
    }

    #[test]
    fn test_sync_entry_mirrors_async() {
        let out = WrapperSynthesizer::new().synthesize(&mutex_service());
        for method in &out.ir.methods {
            assert_eq!(method.sync_entry.delegates_to, method.async_entry.signature.name);
            assert_eq!(method.sync_entry.signature.params, method.async_entry.signature.params);
            assert_eq!(method.sync_entry.signature.returns, method.future.get.returns);
        }
    }

    #[test]
    fn test_durable_entry_has_no_inline_param() {
        let out = WrapperSynthesizer::new().synthesize(&mutex_service());
        let renew = out.ir.method("RenewLease").unwrap();
        assert!(renew.async_entry.signature.param("inline").is_none());
        assert_eq!(
            renew.async_entry.target,
            TargetResolution::LogicalName {
                constant: "RenewLeaseActivityName".into()
            }
        );
    }

    #[test]
    fn test_invalid_method_rejected_others_emitted() {
        let service = mutex_service()
            .with_method(MethodSchema::new("Bad").with_input("not..valid"))
            .with_method(MethodSchema::new("Acquire").with_output("mutex.v1.Lease"));
        let out = WrapperSynthesizer::new().synthesize(&service);

        assert_eq!(out.rejected.len(), 1);
        assert_eq!(out.rejected[0].index, 3);
        assert_eq!(out.rejected[0].method_label(), "Bad");
        assert_eq!(out.ir.method_names(), vec!["RenewLease", "Ping", "RevokeLease", "Acquire"]);
        assert!(!out.ir.registration.bindings.contains(&"RegisterBadActivity".to_string()));
    }

    #[test]
    fn test_duplicate_method_rejected() {
        let service = ServiceSchema::new("Svc")
            .with_method(MethodSchema::new("Ping"))
            .with_method(MethodSchema::new("ping"));
        let out = WrapperSynthesizer::new().synthesize(&service);
        assert_eq!(out.ir.methods.len(), 1);
        assert!(matches!(out.rejected[0].error, SchemaError::DuplicateMethod { .. }));
    }

    #[test]
    fn test_duplicate_logical_name_rejected() {
        let service = ServiceSchema::new("Svc")
            .with_method(MethodSchema::new("A").with_logical_name("shared"))
            .with_method(MethodSchema::new("B").with_logical_name("shared"));
        let out = WrapperSynthesizer::new().synthesize(&service);
        assert_eq!(out.ir.method_names(), vec!["A"]);
        assert!(matches!(
            out.rejected[0].error,
            SchemaError::DuplicateLogicalName { .. }
        ));
    }

    #[test]
    fn test_entry_name_collision_rejected() {
        let service = ServiceSchema::new("Svc")
            .with_method(MethodSchema::new("Renew").local())
            .with_method(MethodSchema::new("RenewLocal"));
        let out = WrapperSynthesizer::new().synthesize(&service);
        assert_eq!(out.ir.method_names(), vec!["Renew"]);
        assert_eq!(
            out.rejected[0].error,
            SchemaError::NameCollision {
                method: "RenewLocal".into(),
                name: "RenewLocal".into(),
            }
        );
        assert_eq!(out.rejected[0].index, 1);
    }

    #[test]
    fn test_service_symbol_collision_rejected() {
        let service = ServiceSchema::new("Svc")
            .with_method(MethodSchema::new("Activities"))
            .with_method(MethodSchema::new("Ping"));
        let out = WrapperSynthesizer::new().synthesize(&service);
        assert_eq!(out.ir.method_names(), vec!["Ping"]);
        assert!(matches!(
            &out.rejected[0].error,
            SchemaError::NameCollision { name, .. } if name == "Activities"
        ));
    }

    #[test]
    fn test_emitted_symbols_are_unique() {
        let service = ServiceSchema::new("Svc")
            .with_method(MethodSchema::new("Renew").local())
            .with_method(MethodSchema::new("RenewLocal"))
            .with_method(MethodSchema::new("RenewFuture"))
            .with_method(MethodSchema::new("Future"));
        let out = WrapperSynthesizer::new().synthesize(&service);
        let mut seen = HashSet::new();
        for method in &out.ir.methods {
            for symbol in method.symbols() {
                assert!(seen.insert(symbol.to_string()), "{symbol} declared twice");
            }
        }
        assert_eq!(out.ir.methods.len() + out.rejected.len(), 4);
    }

    #[test]
    fn test_degenerate_identifiers_rejected() {
        let service = ServiceSchema::new("Svc")
            .with_method(MethodSchema::new("_"))
            .with_method(MethodSchema::new("__"))
            .with_method(MethodSchema::new("_1abc"))
            .with_method(MethodSchema::new("_ping"));
        let out = WrapperSynthesizer::new().synthesize(&service);
        assert_eq!(out.ir.method_names(), vec!["Ping"]);
        let labels: Vec<String> = out.rejected.iter().map(|r| r.method_label()).collect();
        assert_eq!(labels, vec!["_", "__", "_1abc"]);
        assert!(out
            .rejected
            .iter()
            .all(|r| matches!(r.error, SchemaError::InvalidName { .. })));
    }

    #[test]
    fn test_nameless_method_labelled_by_index() {
        let service = ServiceSchema::new("Svc").with_method(MethodSchema::new(""));
        let out = WrapperSynthesizer::new().synthesize(&service);
        assert_eq!(out.rejected[0].method_label(), "#0");
        assert!(out.ir.methods.is_empty());
    }

    #[test]
    fn test_deterministic() {
        let synth = WrapperSynthesizer::new();
        let a = synth.synthesize(&mutex_service());
        let b = synth.synthesize(&mutex_service());
        assert_eq!(a, b);
    }
}
