//! Tracker for fire-and-forget background work
//!
//! Every task spawned through [`BackgroundTasks`] is counted until it
//! finishes, so shutdown can wait for outstanding work. A panicking task is
//! logged and never takes the process down.

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;
use tracing::error;

#[derive(Default)]
struct Inner {
    active: AtomicUsize,
    drained: Notify,
}

/// Shared counter of in-flight background tasks
#[derive(Clone, Default)]
pub struct BackgroundTasks {
    inner: Arc<Inner>,
}

impl BackgroundTasks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `future` on its own tokio task and track it until completion
    pub fn spawn<F>(&self, name: &'static str, future: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.inner.active.fetch_add(1, Ordering::SeqCst);
        let inner = self.inner.clone();

        tokio::spawn(async move {
            if let Err(e) = tokio::spawn(future).await {
                if e.is_panic() {
                    error!(task = name, "background task panicked");
                } else {
                    error!(task = name, "background task was cancelled");
                }
            }

            if inner.active.fetch_sub(1, Ordering::SeqCst) == 1 {
                inner.drained.notify_waiters();
            }
        });
    }

    /// Number of tasks still running
    pub fn active(&self) -> usize {
        self.inner.active.load(Ordering::SeqCst)
    }

    /// Wait until every tracked task has finished or `timeout` elapses
    ///
    /// Returns `true` when all tasks drained in time.
    pub async fn wait(&self, timeout: Duration) -> bool {
        tokio::time::timeout(timeout, async {
            loop {
                let drained = self.inner.drained.notified();
                tokio::pin!(drained);
                // Register before checking so a concurrent notify is not lost
                drained.as_mut().enable();
                if self.active() == 0 {
                    return;
                }
                drained.await;
            }
        })
        .await
        .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicBool;

    #[tokio::test]
    async fn test_wait_with_no_tasks() {
        let tasks = BackgroundTasks::new();
        assert!(tasks.wait(Duration::from_millis(10)).await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_for_running_tasks() {
        let tasks = BackgroundTasks::new();
        let done = Arc::new(AtomicBool::new(false));
        let flag = done.clone();

        tasks.spawn("slow", async move {
            tokio::time::sleep(Duration::from_secs(2)).await;
            flag.store(true, Ordering::SeqCst);
        });
        assert_eq!(tasks.active(), 1);

        assert!(tasks.wait(Duration::from_secs(5)).await);
        assert!(done.load(Ordering::SeqCst));
        assert_eq!(tasks.active(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_times_out() {
        let tasks = BackgroundTasks::new();
        tasks.spawn("stuck", async {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        });

        assert!(!tasks.wait(Duration::from_secs(1)).await);
        assert_eq!(tasks.active(), 1);
    }

    #[tokio::test]
    async fn test_panicking_task_is_contained() {
        let tasks = BackgroundTasks::new();
        tasks.spawn("boom", async {
            panic!("boom");
        });
        tasks.spawn("fine", async {});

        assert!(tasks.wait(Duration::from_secs(5)).await);
        assert_eq!(tasks.active(), 0);
    }
}
