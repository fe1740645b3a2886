//! Caller context: orchestrator handle, ambient option scopes and cancellation.

use std::fmt;
use std::sync::Arc;

use activity_options::EffectiveOptions;
use activity_types::Locality;
use futures::future::{self, FutureExt};
use tokio::sync::watch;

use crate::orchestrator::Orchestrator;

/// Ambient context of an orchestrating caller.
///
/// Cheap to clone. Derivation (`with_*`) never mutates the parent: option
/// scopes are copied, cancellation signals are shared so a cancelled
/// parent is observed by every descendant.
#[derive(Clone)]
pub struct Context {
    orchestrator: Arc<dyn Orchestrator>,
    activity_options: Option<EffectiveOptions>,
    local_options: Option<EffectiveOptions>,
    signals: Vec<watch::Receiver<bool>>,
}

/// Cancels the context returned alongside it by [`Context::with_cancel`].
#[derive(Clone, Debug)]
pub struct CancelHandle {
    sender: Arc<watch::Sender<bool>>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.sender.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.sender.borrow()
    }
}

impl Context {
    pub fn new(orchestrator: Arc<dyn Orchestrator>) -> Self {
        Self {
            orchestrator,
            activity_options: None,
            local_options: None,
            signals: Vec::new(),
        }
    }

    pub fn orchestrator(&self) -> &Arc<dyn Orchestrator> {
        &self.orchestrator
    }

    // ── Option scopes ────────────────────────────────────────────────

    /// Ambient options for durable activities, if any were attached
    pub fn activity_options(&self) -> Option<&EffectiveOptions> {
        self.activity_options.as_ref()
    }

    /// Ambient options for local activities, if any were attached
    pub fn local_options(&self) -> Option<&EffectiveOptions> {
        self.local_options.as_ref()
    }

    pub fn with_activity_options(&self, options: EffectiveOptions) -> Self {
        Self {
            activity_options: Some(options),
            ..self.clone()
        }
    }

    pub fn with_local_options(&self, options: EffectiveOptions) -> Self {
        Self {
            local_options: Some(options),
            ..self.clone()
        }
    }

    /// The scope a locality reads from
    pub fn options(&self, locality: Locality) -> Option<&EffectiveOptions> {
        match locality {
            Locality::Durable => self.activity_options(),
            Locality::Local => self.local_options(),
        }
    }

    /// Derive a context with the scope for `locality` replaced
    pub fn with_options(&self, locality: Locality, options: EffectiveOptions) -> Self {
        match locality {
            Locality::Durable => self.with_activity_options(options),
            Locality::Local => self.with_local_options(options),
        }
    }

    // ── Cancellation ─────────────────────────────────────────────────

    /// Derive a cancellable child context.
    pub fn with_cancel(&self) -> (Self, CancelHandle) {
        let (sender, receiver) = watch::channel(false);
        let mut child = self.clone();
        child.signals.push(receiver);
        (
            child,
            CancelHandle {
                sender: Arc::new(sender),
            },
        )
    }

    pub fn is_cancelled(&self) -> bool {
        self.signals.iter().any(|rx| *rx.borrow())
    }

    /// Resolves once this context or any ancestor is cancelled.
    ///
    /// Never resolves for a context without cancellation signals, or once
    /// every handle was dropped without cancelling.
    pub async fn cancelled(&self) {
        if self.signals.is_empty() {
            return future::pending().await;
        }
        let waits = self.signals.iter().cloned().map(|mut rx| {
            async move {
                let closed = rx.wait_for(|cancelled| *cancelled).await.is_err();
                if closed {
                    future::pending::<()>().await;
                }
            }
            .boxed()
        });
        future::select_all(waits).await;
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("orchestrator", &self.orchestrator.name())
            .field("activity_options", &self.activity_options)
            .field("local_options", &self.local_options)
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulated::SimulatedOrchestrator;
    use crate::ActivityRegistry;
    use activity_types::TimeoutKind;
    use std::time::Duration;

    fn ctx() -> Context {
        Context::new(Arc::new(SimulatedOrchestrator::new(ActivityRegistry::new())))
    }

    #[test]
    fn option_scopes_are_separate() {
        let opts = EffectiveOptions::new().with_timeout(TimeoutKind::StartToClose, Duration::from_secs(1));
        let ctx = ctx().with_local_options(opts.clone());
        assert_eq!(ctx.options(Locality::Local), Some(&opts));
        assert!(ctx.options(Locality::Durable).is_none());
    }

    #[test]
    fn derivation_leaves_parent_untouched() {
        let parent = ctx();
        let child = parent.with_options(Locality::Durable, EffectiveOptions::new());
        assert!(parent.activity_options().is_none());
        assert!(child.activity_options().is_some());
    }

    #[tokio::test]
    async fn parent_cancellation_reaches_child() {
        let (parent, handle) = ctx().with_cancel();
        let (child, _child_handle) = parent.with_cancel();
        assert!(!child.is_cancelled());

        handle.cancel();
        assert!(child.is_cancelled());
        tokio::time::timeout(Duration::from_secs(1), child.cancelled())
            .await
            .expect("child observes parent cancellation");
    }

    #[tokio::test]
    async fn child_cancellation_does_not_reach_parent() {
        let (parent, _handle) = ctx().with_cancel();
        let (child, child_handle) = parent.with_cancel();
        child_handle.cancel();
        assert!(child.is_cancelled());
        assert!(!parent.is_cancelled());
    }

    #[tokio::test]
    async fn uncancellable_context_never_resolves() {
        let result = tokio::time::timeout(Duration::from_millis(20), ctx().cancelled()).await;
        assert!(result.is_err());
    }
}
