//! Hand-written wrappers in the shape the synthesizer describes for the
//! lease service, driven against the simulated orchestrator.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use activity_options::{DefaultsPlan, EffectiveOptions, RetryOptions};
use activity_runtime::*;
use activity_types::*;
use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct RenewLeaseRequest {
    lease_id: String,
    timeout_secs: u64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct RevokeLeaseRequest {
    lease_id: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct ListLeasesResponse {
    lease_ids: Vec<String>,
}

// ---------------------------------------------------------------------------
// Wrappers
// ---------------------------------------------------------------------------

const RENEW_LEASE_ACTIVITY_NAME: &str = "mycompany.mutex.v1.Mutex.RenewLease";
const REVOKE_LEASE_ACTIVITY_NAME: &str = "mycompany.mutex.v1.Mutex.RevokeLease";
const LIST_LEASES_ACTIVITY_NAME: &str = "mycompany.mutex.v1.Mutex.ListLeases";

#[async_trait]
trait Activities: Send + Sync + 'static {
    async fn renew_lease(&self, ctx: ActivityContext, req: RenewLeaseRequest) -> ActivityResult<()>;
    async fn revoke_lease(&self, ctx: ActivityContext, req: RevokeLeaseRequest) -> ActivityResult<()>;
    async fn list_leases(&self, ctx: ActivityContext) -> ActivityResult<ListLeasesResponse>;
}

fn register_activities(registry: &mut ActivityRegistry, activities: Arc<dyn Activities>) -> RegistryResult<()> {
    let a = activities.clone();
    registry.register(
        RENEW_LEASE_ACTIVITY_NAME,
        handler_fn(move |ctx, req: RenewLeaseRequest| {
            let a = a.clone();
            async move { a.renew_lease(ctx, req).await }
        }),
    )?;
    let a = activities.clone();
    registry.register(
        REVOKE_LEASE_ACTIVITY_NAME,
        handler_fn(move |ctx, req: RevokeLeaseRequest| {
            let a = a.clone();
            async move { a.revoke_lease(ctx, req).await }
        }),
    )?;
    let a = activities;
    registry.register(
        LIST_LEASES_ACTIVITY_NAME,
        handler_fn(move |ctx, _: ()| {
            let a = a.clone();
            async move { a.list_leases(ctx).await }
        }),
    )
}

fn renew_lease_stub() -> ActivityStub<RenewLeaseRequest, ()> {
    let defaults = DefaultInvocationPolicy::new()
        .with_timeout(TimeoutKind::StartToClose, PolicyDuration::from_secs(5));
    ActivityStub::durable(RENEW_LEASE_ACTIVITY_NAME)
        .with_output(false)
        .with_defaults(DefaultsPlan::compile(&defaults, Locality::Durable))
}

fn revoke_lease_local_stub() -> ActivityStub<RevokeLeaseRequest, ()> {
    let defaults = DefaultInvocationPolicy::new()
        .with_timeout(TimeoutKind::Heartbeat, PolicyDuration::from_secs(30))
        .with_timeout(TimeoutKind::ScheduleToClose, PolicyDuration::from_secs(60));
    ActivityStub::local(REVOKE_LEASE_ACTIVITY_NAME)
        .with_output(false)
        .with_defaults(DefaultsPlan::compile(&defaults, Locality::Local))
}

fn list_leases_stub() -> ActivityStub<(), ListLeasesResponse> {
    let defaults = DefaultInvocationPolicy::new()
        .with_timeout(TimeoutKind::StartToClose, PolicyDuration::ZERO)
        .with_retry_policy(RetryPolicy::new().with_max_attempts(1));
    ActivityStub::durable(LIST_LEASES_ACTIVITY_NAME)
        .with_input(false)
        .with_defaults(DefaultsPlan::compile(&defaults, Locality::Durable))
}

// ---------------------------------------------------------------------------
// Implementation
// ---------------------------------------------------------------------------

#[derive(Default)]
struct LeaseTable {
    leases: Mutex<HashMap<String, u64>>,
}

#[async_trait]
impl Activities for LeaseTable {
    async fn renew_lease(&self, _ctx: ActivityContext, req: RenewLeaseRequest) -> ActivityResult<()> {
        let mut leases = self.leases.lock();
        match leases.get_mut(&req.lease_id) {
            Some(timeout) => {
                *timeout = req.timeout_secs;
                Ok(())
            }
            None => Err(ActivityError::non_retryable("LeaseNotFound", req.lease_id)),
        }
    }

    async fn revoke_lease(&self, _ctx: ActivityContext, req: RevokeLeaseRequest) -> ActivityResult<()> {
        self.leases.lock().remove(&req.lease_id);
        Ok(())
    }

    async fn list_leases(&self, _ctx: ActivityContext) -> ActivityResult<ListLeasesResponse> {
        let mut lease_ids: Vec<String> = self.leases.lock().keys().cloned().collect();
        lease_ids.sort();
        Ok(ListLeasesResponse { lease_ids })
    }
}

fn setup(leases: &[&str]) -> (Context, Arc<SimulatedOrchestrator>, Arc<LeaseTable>) {
    let table = Arc::new(LeaseTable::default());
    for id in leases {
        table.leases.lock().insert(id.to_string(), 10);
    }
    let mut registry = ActivityRegistry::new();
    register_activities(&mut registry, table.clone()).unwrap();
    let sim = Arc::new(SimulatedOrchestrator::new(registry));
    (Context::new(sim.clone()), sim, table)
}

fn renew(lease_id: &str) -> RenewLeaseRequest {
    RenewLeaseRequest {
        lease_id: lease_id.into(),
        timeout_secs: 30,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn renew_lease_merges_declared_timeout() {
    let (ctx, sim, table) = setup(&["lease-1"]);

    renew_lease_stub().execute(&ctx, renew("lease-1"), None).await.unwrap();

    let calls = sim.calls();
    let call = &calls[0];
    assert_eq!(call.activity, RENEW_LEASE_ACTIVITY_NAME);
    assert_eq!(call.options.start_to_close_timeout, Some(Duration::from_secs(5)));
    assert_eq!(call.options.heartbeat_timeout, None);
    assert!(call.options.retry_policy.is_none());
    assert_eq!(table.leases.lock()["lease-1"], 30);
}

#[tokio::test]
async fn caller_options_are_not_overridden() {
    let (ctx, sim, _table) = setup(&["lease-1"]);
    let ctx = ctx.with_activity_options(
        EffectiveOptions::new().with_timeout(TimeoutKind::StartToClose, Duration::from_secs(1)),
    );

    renew_lease_stub().execute(&ctx, renew("lease-1"), None).await.unwrap();

    assert_eq!(sim.calls()[0].options.start_to_close_timeout, Some(Duration::from_secs(1)));
    // the caller's scope is untouched by the merge
    assert_eq!(
        ctx.activity_options().and_then(|o| o.start_to_close_timeout),
        Some(Duration::from_secs(1))
    );
}

#[tokio::test]
async fn local_scope_ignores_durable_options() {
    let (ctx, sim, _table) = setup(&["lease-1"]);
    let ctx = ctx.with_activity_options(
        EffectiveOptions::new().with_timeout(TimeoutKind::ScheduleToClose, Duration::from_secs(1)),
    );

    revoke_lease_local_stub()
        .execute(&ctx, RevokeLeaseRequest { lease_id: "lease-1".into() }, None)
        .await
        .unwrap();

    let calls = sim.calls();
    let options = &calls[0].options;
    assert_eq!(options.schedule_to_close_timeout, Some(Duration::from_secs(60)));
    assert_eq!(options.heartbeat_timeout, None);
    assert_eq!(sim.calls()[0].locality, Locality::Local);
}

#[tokio::test]
async fn local_inline_implementation_is_used() {
    let (ctx, sim, table) = setup(&["lease-1"]);
    let inline = InlineActivity::new(handler_fn(|_ctx, _req: RevokeLeaseRequest| async { Ok(()) }));

    revoke_lease_local_stub()
        .execute(&ctx, RevokeLeaseRequest { lease_id: "lease-1".into() }, Some(inline))
        .await
        .unwrap();

    assert!(sim.calls()[0].inline);
    // the registered implementation never ran
    assert!(table.leases.lock().contains_key("lease-1"));
}

#[tokio::test]
async fn durable_entry_ignores_inline_implementation() {
    let (ctx, sim, table) = setup(&["lease-1"]);
    let inline = InlineActivity::new(handler_fn(|_ctx, _req: RenewLeaseRequest| async { Ok(()) }));

    renew_lease_stub()
        .execute(&ctx, renew("lease-1"), Some(inline))
        .await
        .unwrap();

    assert!(!sim.calls()[0].inline);
    assert_eq!(sim.calls()[0].activity, RENEW_LEASE_ACTIVITY_NAME);
    assert_eq!(table.leases.lock()["lease-1"], 30);
}

#[tokio::test]
async fn no_input_with_output_and_valid_zero_default() {
    let (ctx, sim, _table) = setup(&["b", "a"]);

    let resp = list_leases_stub().execute(&ctx, (), None).await.unwrap();

    assert_eq!(resp.lease_ids, vec!["a", "b"]);
    let calls = sim.calls();
    let call = &calls[0];
    assert_eq!(call.input, None);
    assert_eq!(call.options.start_to_close_timeout, Some(Duration::ZERO));
    assert_eq!(
        call.options.retry_policy,
        Some(RetryOptions {
            maximum_attempts: Some(1),
            ..Default::default()
        })
    );
}

#[tokio::test]
async fn failure_surfaces_unchanged() {
    let (ctx, _sim, _table) = setup(&[]);

    let err = renew_lease_stub()
        .execute(&ctx, renew("missing"), None)
        .await
        .unwrap_err();

    match err {
        InvocationError::Failed { activity, attempts, source } => {
            assert_eq!(activity, RENEW_LEASE_ACTIVITY_NAME);
            assert_eq!(attempts, 1);
            assert_eq!(source.kind, "LeaseNotFound");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn unregistered_name_is_rejected_at_schedule_time() {
    let ctx = Context::new(Arc::new(SimulatedOrchestrator::new(ActivityRegistry::new())));
    let err = renew_lease_stub()
        .execute_async(&ctx, renew("lease-1"), None)
        .err()
        .unwrap();
    assert!(matches!(err, InvocationError::SchedulingRejected { .. }));
}

#[tokio::test]
async fn selector_collects_multiple_renewals() {
    let (ctx, sim, _table) = setup(&["a", "b", "c"]);
    let stub = renew_lease_stub();
    let done = Mutex::new(Vec::new());

    {
        let done = &done;
        let mut selector = Selector::new();
        for id in ["a", "b", "c"] {
            stub.execute_async(&ctx, renew(id), None)
                .unwrap()
                .select_with(&mut selector, move |r| {
                    r.unwrap();
                    done.lock().push(id);
                });
        }
        assert_eq!(selector.drain(&ctx).await.unwrap(), 3);
    }

    let mut done = done.into_inner();
    done.sort();
    assert_eq!(done, vec!["a", "b", "c"]);
    assert_eq!(sim.call_count(), 3);
}

#[test]
fn aggregate_registration_rejects_second_run() {
    let table: Arc<dyn Activities> = Arc::new(LeaseTable::default());
    let mut registry = ActivityRegistry::new();
    register_activities(&mut registry, table.clone()).unwrap();
    assert_eq!(registry.len(), 3);
    assert!(matches!(
        register_activities(&mut registry, table),
        Err(RegistryError::Duplicate(_))
    ));
}
