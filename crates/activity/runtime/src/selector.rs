//! Multiplexed wait-set over activity futures.

use std::fmt;
use std::future::Future;

use futures::future::BoxFuture;
use futures::stream::{FuturesUnordered, StreamExt};
use futures::FutureExt;

use crate::context::Context;
use crate::errors::{InvocationError, InvocationResult};

type Ready<'a> = Box<dyn FnOnce() + Send + 'a>;

/// Waits on several futures at once and runs their callbacks in completion
/// order, one per [`select`](Self::select) call.
#[derive(Default)]
pub struct Selector<'a> {
    pending: FuturesUnordered<BoxFuture<'a, Ready<'a>>>,
}

impl<'a> Selector<'a> {
    pub fn new() -> Self {
        Self {
            pending: FuturesUnordered::new(),
        }
    }

    pub(crate) fn push<F>(&mut self, fut: F)
    where
        F: Future<Output = Ready<'a>> + Send + 'a,
    {
        self.pending.push(fut.boxed());
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Wait for the next future to resolve and run its callback.
    ///
    /// Returns `Ok(false)` when nothing is pending and
    /// [`InvocationError::Cancelled`] if `ctx` is cancelled while every
    /// future is still running. A future that already resolved is picked
    /// even when `ctx` is cancelled.
    pub async fn select(&mut self, ctx: &Context) -> InvocationResult<bool> {
        if self.pending.is_empty() {
            return Ok(false);
        }
        tokio::select! {
            biased;
            next = self.pending.next() => match next {
                Some(callback) => {
                    callback();
                    Ok(true)
                }
                None => Ok(false),
            },
            _ = ctx.cancelled() => Err(InvocationError::Cancelled),
        }
    }

    /// Run `select` until every future has resolved.
    pub async fn drain(&mut self, ctx: &Context) -> InvocationResult<usize> {
        let mut resolved = 0;
        while self.select(ctx).await? {
            resolved += 1;
        }
        Ok(resolved)
    }
}

impl fmt::Debug for Selector<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Selector")
            .field("pending", &self.pending.len())
            .finish()
    }
}
