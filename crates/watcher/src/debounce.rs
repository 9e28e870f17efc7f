//! Debounced async trigger
//!
//! Collapses rapid-fire invocations of one async operation: at most one
//! execution runs at a time and at most one follow-up is queued behind it.
//! Every caller that arrives while a run is in flight joins that single
//! trailing slot and receives the trailing execution's result.

use anyhow::Result;
use futures::future::BoxFuture;
use parking_lot::Mutex;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::broadcast;

/// Result shared between every waiter of one execution. Errors are reference
/// counted so all trailing callers see the same rejection.
pub type SharedResult<T> = std::result::Result<T, Arc<anyhow::Error>>;

type Op<T> = dyn Fn() -> BoxFuture<'static, Result<T>> + Send + Sync;

struct TriggerState<T> {
    running: bool,
    /// The single trailing slot. Any number of concurrent requests collapse
    /// into this one sender; intermediate requests beyond it are intentional
    /// batching, not a queue.
    trailing: Option<broadcast::Sender<SharedResult<T>>>,
}

pub struct DebouncedTrigger<T> {
    op: Arc<Op<T>>,
    state: Arc<Mutex<TriggerState<T>>>,
}

impl<T> Clone for DebouncedTrigger<T> {
    fn clone(&self) -> Self {
        Self {
            op: self.op.clone(),
            state: self.state.clone(),
        }
    }
}

impl<T: Clone + Send + 'static> DebouncedTrigger<T> {
    pub fn new<F, Fut>(op: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        Self {
            op: Arc::new(move || Box::pin(op()) as BoxFuture<'static, Result<T>>),
            state: Arc::new(Mutex::new(TriggerState {
                running: false,
                trailing: None,
            })),
        }
    }

    /// Invoke the wrapped operation. Starts it immediately when idle;
    /// otherwise awaits the single trailing execution scheduled after the
    /// current run completes. No cancellation: a started run finishes.
    pub async fn call(&self) -> SharedResult<T> {
        let waiter = {
            let mut state = self.state.lock();
            if state.running {
                let tx = state
                    .trailing
                    .get_or_insert_with(|| broadcast::channel(1).0);
                // Subscribe under the lock so the trailing send can never
                // happen before this receiver exists.
                Some(tx.subscribe())
            } else {
                state.running = true;
                None
            }
        };

        if let Some(mut rx) = waiter {
            return match rx.recv().await {
                Ok(result) => result,
                // Only reachable if the runtime is torn down mid-flight.
                Err(_) => Err(Arc::new(anyhow::anyhow!(
                    "trailing execution was dropped before completing"
                ))),
            };
        }

        let result = (self.op)().await.map_err(Arc::new);
        Self::on_complete(&self.op, &self.state);
        result
    }

    /// Completion bookkeeping: launch the coalesced follow-up run if one was
    /// requested while we were busy, otherwise go idle. A failure in the
    /// finished run never cancels the follow-up.
    fn on_complete(op: &Arc<Op<T>>, state: &Arc<Mutex<TriggerState<T>>>) {
        let trailing = {
            let mut state = state.lock();
            match state.trailing.take() {
                Some(tx) => Some(tx),
                None => {
                    state.running = false;
                    None
                }
            }
        };

        if let Some(tx) = trailing {
            let op = op.clone();
            let state = state.clone();
            tokio::spawn(async move {
                let result = op().await.map_err(Arc::new);
                let _ = tx.send(result);
                Self::on_complete(&op, &state);
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn counting_trigger(
        executions: Arc<AtomicUsize>,
        fail_from: Option<usize>,
    ) -> DebouncedTrigger<usize> {
        DebouncedTrigger::new(move || {
            let executions = executions.clone();
            async move {
                let n = executions.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(40)).await;
                match fail_from {
                    Some(from) if n >= from => anyhow::bail!("execution {n} failed"),
                    _ => Ok(n),
                }
            }
        })
    }

    #[tokio::test]
    async fn idle_trigger_runs_once() {
        let executions = Arc::new(AtomicUsize::new(0));
        let trigger = counting_trigger(executions.clone(), None);

        assert_eq!(trigger.call().await.unwrap(), 0);
        assert_eq!(executions.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn concurrent_calls_collapse_into_one_trailing_run() {
        let executions = Arc::new(AtomicUsize::new(0));
        let trigger = counting_trigger(executions.clone(), None);

        let leading = {
            let trigger = trigger.clone();
            tokio::spawn(async move { trigger.call().await })
        };
        // Let the leading run get in flight.
        tokio::time::sleep(Duration::from_millis(10)).await;

        let mut waiters = Vec::new();
        for _ in 0..8 {
            let trigger = trigger.clone();
            waiters.push(tokio::spawn(async move { trigger.call().await }));
        }

        assert_eq!(leading.await.unwrap().unwrap(), 0);
        for waiter in waiters {
            // Every trailing caller sees the one coalesced follow-up run.
            assert_eq!(waiter.await.unwrap().unwrap(), 1);
        }
        assert_eq!(executions.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn trailing_failure_is_shared_by_all_waiters() {
        let executions = Arc::new(AtomicUsize::new(0));
        let trigger = counting_trigger(executions.clone(), Some(1));

        let leading = {
            let trigger = trigger.clone();
            tokio::spawn(async move { trigger.call().await })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;

        let mut waiters = Vec::new();
        for _ in 0..3 {
            let trigger = trigger.clone();
            waiters.push(tokio::spawn(async move { trigger.call().await }));
        }

        assert_eq!(leading.await.unwrap().unwrap(), 0);

        let mut errors = Vec::new();
        for waiter in waiters {
            errors.push(waiter.await.unwrap().unwrap_err());
        }
        assert!(errors.iter().all(|e| e.to_string().contains("execution 1 failed")));
        // One rejection, shared.
        assert!(errors.windows(2).all(|pair| Arc::ptr_eq(&pair[0], &pair[1])));
        assert_eq!(executions.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn leading_failure_does_not_cancel_the_trailing_run() {
        let executions = Arc::new(AtomicUsize::new(0));
        // Only the first execution fails.
        let trigger = DebouncedTrigger::new({
            let executions = executions.clone();
            move || {
                let executions = executions.clone();
                async move {
                    let n = executions.fetch_add(1, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(40)).await;
                    if n == 0 {
                        anyhow::bail!("leading failed")
                    }
                    Ok(n)
                }
            }
        });

        let leading = {
            let trigger = trigger.clone();
            tokio::spawn(async move { trigger.call().await })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;
        let trailing = {
            let trigger = trigger.clone();
            tokio::spawn(async move { trigger.call().await })
        };

        assert!(leading.await.unwrap().is_err());
        assert_eq!(trailing.await.unwrap().unwrap(), 1);
        assert_eq!(executions.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn trigger_goes_idle_again_after_draining() {
        let executions = Arc::new(AtomicUsize::new(0));
        let trigger = counting_trigger(executions.clone(), None);

        trigger.call().await.unwrap();
        trigger.call().await.unwrap();
        // Sequential calls never coalesce.
        assert_eq!(executions.load(Ordering::SeqCst), 2);
    }
}
