//! UI-facing plumbing shared by the controllers
//!
//! `UiScope` owns tasks started on behalf of a UI surface. Cancelling the
//! scope, or dropping its last handle, aborts every task still in flight.

use serde::Serialize;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::watch;
use tokio::task::JoinSet;

/// Capacity of each controller's transient message channel
pub const MESSAGE_CHANNEL_CAPACITY: usize = 32;

/// Transient messages for the presentation layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum UiMessage {
    Toast(String),
    Snackbar(String),
    /// Device location is off but the user can be prompted to enable it;
    /// retry registration for this reminder afterwards
    LocationResolutionRequired(String),
}

#[derive(Clone)]
pub struct UiScope {
    tasks: Arc<Mutex<JoinSet<()>>>,
    /// Bumped on every `cancel`, so waiters holding drained tasks abort them too
    cancellations: Arc<watch::Sender<u64>>,
}

impl Default for UiScope {
    fn default() -> Self {
        let (cancellations, _) = watch::channel(0);
        Self {
            tasks: Arc::new(Mutex::new(JoinSet::new())),
            cancellations: Arc::new(cancellations),
        }
    }
}

impl UiScope {
    pub fn new() -> Self {
        Self::default()
    }

    fn tasks(&self) -> MutexGuard<'_, JoinSet<()>> {
        match self.tasks.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub fn spawn<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let mut tasks = self.tasks();
        // Reap finished tasks so the set does not grow unbounded
        while tasks.try_join_next().is_some() {}
        tasks.spawn(task);
    }

    /// Abort every in-flight task, including those a `wait_idle` is joining
    pub fn cancel(&self) {
        {
            let mut tasks = self.tasks();
            if !tasks.is_empty() {
                tracing::debug!("Cancelling {} UI task(s)", tasks.len());
            }
            tasks.abort_all();
        }
        self.cancellations.send_modify(|generation| *generation += 1);
    }

    /// Wait until every task spawned so far has finished or been cancelled
    pub async fn wait_idle(&self) {
        let mut cancelled = self.cancellations.subscribe();
        let mut pending = std::mem::take(&mut *self.tasks());

        loop {
            tokio::select! {
                joined = pending.join_next() => {
                    if joined.is_none() {
                        break;
                    }
                }
                Ok(()) = cancelled.changed() => pending.abort_all(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn test_cancel_aborts_in_flight_tasks() {
        let scope = UiScope::new();
        let finished = Arc::new(AtomicBool::new(false));

        let flag = finished.clone();
        scope.spawn(async move {
            tokio::time::sleep(Duration::from_secs(60)).await;
            flag.store(true, Ordering::SeqCst);
        });

        scope.cancel();
        scope.wait_idle().await;

        assert!(!finished.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_cancel_reaches_tasks_being_waited_on() {
        let scope = UiScope::new();
        let finished = Arc::new(AtomicBool::new(false));

        let flag = finished.clone();
        scope.spawn(async move {
            tokio::time::sleep(Duration::from_secs(60)).await;
            flag.store(true, Ordering::SeqCst);
        });

        let waiter = scope.clone();
        let waiting = tokio::spawn(async move { waiter.wait_idle().await });
        tokio::task::yield_now().await;

        scope.cancel();

        tokio::time::timeout(Duration::from_secs(5), waiting)
            .await
            .expect("wait_idle did not observe the cancellation")
            .unwrap();
        assert!(!finished.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_wait_idle_runs_tasks_to_completion() {
        let scope = UiScope::new();
        let finished = Arc::new(AtomicBool::new(false));

        let flag = finished.clone();
        scope.spawn(async move {
            tokio::task::yield_now().await;
            flag.store(true, Ordering::SeqCst);
        });

        scope.wait_idle().await;

        assert!(finished.load(Ordering::SeqCst));
    }
}
