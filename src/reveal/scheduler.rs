//! Cancellable timer scheduling for one reveal run.

use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;

/// Shared cancellation signal for one run. Once cancelled it stays
/// cancelled; a new run gets a new token.
#[derive(Debug, Default)]
pub struct CancellationToken {
    cancelled: AtomicBool,
    notify: Notify,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
        self.notify.notify_waiters();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Resolves once `cancel` has been called.
    pub async fn cancelled(&self) {
        loop {
            let notified = self.notify.notified();
            if self.is_cancelled() {
                return;
            }
            notified.await;
        }
    }
}

/// Spawns delayed tasks bound to one `CancellationToken`.
#[derive(Debug, Clone)]
pub struct Scheduler {
    token: Arc<CancellationToken>,
    pending: Arc<AtomicUsize>,
}

impl Scheduler {
    pub fn new(token: Arc<CancellationToken>) -> Self {
        Self {
            token,
            pending: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn token(&self) -> &Arc<CancellationToken> {
        &self.token
    }

    /// Timers that have neither fired nor been cancelled.
    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::Acquire)
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Run `task` after `after` unless the token is cancelled first. The
    /// task itself must re-check the token under whatever lock guards the
    /// state it touches.
    pub fn schedule<F>(&self, after: Duration, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let token = Arc::clone(&self.token);
        let pending = Arc::clone(&self.pending);
        pending.fetch_add(1, Ordering::AcqRel);

        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {}
                _ = tokio::time::sleep(after) => {
                    if !token.is_cancelled() {
                        task.await;
                    }
                }
            }
            pending.fetch_sub(1, Ordering::AcqRel);
        });
    }
}
