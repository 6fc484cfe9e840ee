//! Cancellation and deadlines for connection establishment.

use crate::error::Error;
use event_listener::Event;
use futures_util::future::{self, Either};
use std::fmt::{self, Debug, Formatter};
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Carries the cancellation signal and deadline for a single `connect` call.
///
/// Every `Connector::connect` forwards its context into the
/// [`Establish`](crate::driver::Establish) implementation, so an in-flight dial or
/// handshake is aborted as soon as the context is cancelled or expires.
#[derive(Clone, Debug, Default)]
pub struct ConnectContext {
    deadline: Option<Instant>,
    cancel: Vec<CancelToken>,
}

impl ConnectContext {
    /// A context that is never cancelled and has no deadline.
    pub fn background() -> Self {
        Self::default()
    }

    /// Bound the context by `timeout` from now. An earlier existing deadline is kept.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        match Instant::now().checked_add(timeout) {
            Some(deadline) => self.with_deadline(deadline),
            // too far in the future to be observable
            None => self,
        }
    }

    /// Bound the context by `deadline`. An earlier existing deadline is kept.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(current) => current.min(deadline),
            None => deadline,
        });
        self
    }

    /// Derive a cancellable context, returning the token that cancels it.
    ///
    /// Tokens of the context this one is derived from still apply: cancelling any of
    /// them aborts the derived context, while the new token only affects the derived one.
    pub fn with_cancel(mut self) -> (Self, CancelToken) {
        let token = CancelToken::new();
        self.cancel.push(token.clone());
        (self, token)
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.iter().any(CancelToken::is_cancelled)
    }

    /// Drive `fut` to completion unless the context is cancelled or its deadline passes
    /// first, in which case `fut` is dropped.
    pub async fn run<F, T>(&self, fut: F) -> Result<T, Error>
    where
        F: Future<Output = Result<T, Error>>,
    {
        if self.is_cancelled() {
            return Err(Error::Cancelled);
        }

        let bounded = async {
            match self.deadline {
                Some(deadline) => {
                    let remaining = deadline.saturating_duration_since(Instant::now());
                    if remaining.is_zero() {
                        return Err(Error::ConnectTimedOut);
                    }

                    sqlx_rt::timeout(remaining, fut)
                        .await
                        .map_err(|_| Error::ConnectTimedOut)?
                }
                None => fut.await,
            }
        };

        let cancelled = self.cancelled();

        futures_util::pin_mut!(bounded);
        futures_util::pin_mut!(cancelled);

        match future::select(bounded, cancelled).await {
            Either::Left((res, _)) => res,
            Either::Right(((), _)) => Err(Error::Cancelled),
        }
    }

    async fn cancelled(&self) {
        if self.cancel.is_empty() {
            return future::pending().await;
        }

        future::select_all(self.cancel.iter().map(|token| Box::pin(token.cancelled()))).await;
    }
}

/// Cancels every [`ConnectContext`] derived from it.
#[derive(Clone)]
pub struct CancelToken {
    inner: Arc<CancelInner>,
}

struct CancelInner {
    cancelled: AtomicBool,
    on_cancel: Event,
}

impl CancelToken {
    fn new() -> Self {
        CancelToken {
            inner: Arc::new(CancelInner {
                cancelled: AtomicBool::new(false),
                on_cancel: Event::new(),
            }),
        }
    }

    /// Cancel the token. Calling this more than once has no further effect.
    pub fn cancel(&self) {
        if !self.inner.cancelled.swap(true, Ordering::AcqRel) {
            self.inner.on_cancel.notify(usize::MAX);
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::Acquire)
    }

    /// Resolves once the token is cancelled.
    pub async fn cancelled(&self) {
        loop {
            if self.is_cancelled() {
                return;
            }

            let listener = self.inner.on_cancel.listen();

            // re-check after registering so a concurrent `cancel` cannot be missed
            if self.is_cancelled() {
                return;
            }

            listener.await;
        }
    }
}

impl Debug for CancelToken {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("CancelToken")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

#[test]
fn it_keeps_the_earliest_deadline() {
    let near = Instant::now() + Duration::from_secs(1);
    let far = near + Duration::from_secs(60);

    let ctx = ConnectContext::background()
        .with_deadline(near)
        .with_deadline(far);
    assert_eq!(ctx.deadline(), Some(near));

    let ctx = ConnectContext::background()
        .with_deadline(far)
        .with_deadline(near);
    assert_eq!(ctx.deadline(), Some(near));
}

#[test]
fn it_propagates_parent_cancellation() {
    let (parent, parent_token) = ConnectContext::background().with_cancel();
    let (child, child_token) = parent.clone().with_cancel();

    child_token.cancel();
    assert!(child.is_cancelled());
    assert!(!parent.is_cancelled());

    let (child, _) = parent.clone().with_cancel();
    parent_token.cancel();
    assert!(child.is_cancelled());
}

#[test]
fn it_fails_fast_when_already_cancelled() {
    let (ctx, token) = ConnectContext::background().with_cancel();
    token.cancel();
    token.cancel();

    let res = sqlx_rt::test_block_on(ctx.run(async { Ok::<_, Error>(()) }));
    assert!(matches!(res, Err(Error::Cancelled)));
}

#[test]
fn it_runs_to_completion_without_signals() {
    let ctx = ConnectContext::background().with_timeout(Duration::from_secs(5));

    let res = sqlx_rt::test_block_on(ctx.run(async { Ok::<_, Error>(42) }));
    assert_eq!(res.unwrap(), 42);
}

#[test]
fn it_times_out_pending_work() {
    let ctx = ConnectContext::background().with_timeout(Duration::from_millis(20));

    let res = sqlx_rt::test_block_on(
        ctx.run(future::pending::<Result<(), Error>>()),
    );
    assert!(matches!(res, Err(Error::ConnectTimedOut)));
}

#[test]
fn it_aborts_pending_work_on_cancel() {
    let (ctx, token) = ConnectContext::background().with_cancel();

    let res = sqlx_rt::test_block_on(async move {
        let canceller = async {
            sqlx_rt::sleep(Duration::from_millis(20)).await;
            token.cancel();
            future::pending::<Result<(), Error>>().await
        };

        let work = ctx.run(future::pending::<Result<(), Error>>());
        futures_util::pin_mut!(work);
        futures_util::pin_mut!(canceller);

        match future::select(work, canceller).await {
            Either::Left((res, _)) => res,
            Either::Right((res, _)) => res,
        }
    });

    assert!(matches!(res, Err(Error::Cancelled)));
}
