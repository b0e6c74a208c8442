//! Cancellable, timeout-bounded model calls.
//!
//! Each model call runs in its own Tokio task. The owning session keeps the
//! task's abort handle in an [`InflightSlot`] so the user can cancel it, and a
//! newer call in the same slot supersedes (aborts) the older one.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use tokio::task::AbortHandle;
use tracing::debug;

use crate::error::InferenceError;

/// Holds the abort handle of the model call currently running for one session.
#[derive(Debug, Default)]
pub struct InflightSlot {
    current: Mutex<Option<(u64, AbortHandle)>>,
    next_id: AtomicU64,
}

impl InflightSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Abort the running call, if any. Returns whether something was aborted.
    pub fn cancel(&self) -> bool {
        let taken = self
            .current
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();
        match taken {
            Some((id, handle)) => {
                debug!(task_id = id, "Cancelling in-flight model call");
                handle.abort();
                true
            }
            None => false,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.current
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .is_some()
    }

    fn install(&self, handle: AbortHandle) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let previous = self
            .current
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .replace((id, handle));
        if let Some((old_id, old)) = previous {
            debug!(task_id = old_id, superseded_by = id, "Superseding in-flight model call");
            old.abort();
        }
        id
    }

    fn clear(&self, id: u64) {
        let mut current = self
            .current
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if current.as_ref().is_some_and(|(cur, _)| *cur == id) {
            *current = None;
        }
    }
}

/// Aborts the task and frees its slot when the awaiting caller goes away
/// (e.g. HTTP client disconnect). Aborting a finished task is a no-op.
struct CallGuard<'a> {
    slot: &'a InflightSlot,
    id: u64,
    handle: AbortHandle,
}

impl Drop for CallGuard<'_> {
    fn drop(&mut self) {
        self.handle.abort();
        self.slot.clear(self.id);
    }
}

/// Run `fut` in a task registered in `slot`, bounded by `timeout`.
pub async fn run_bounded<T, F>(
    slot: &InflightSlot,
    timeout: Duration,
    fut: F,
) -> Result<T, InferenceError>
where
    T: Send + 'static,
    F: Future<Output = Result<T, InferenceError>> + Send + 'static,
{
    let handle = tokio::spawn(async move {
        match tokio::time::timeout(timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(InferenceError::Timeout(timeout)),
        }
    });
    let id = slot.install(handle.abort_handle());
    let _guard = CallGuard {
        slot,
        id,
        handle: handle.abort_handle(),
    };

    let outcome = handle.await;

    match outcome {
        Ok(result) => result,
        Err(e) if e.is_cancelled() => Err(InferenceError::Cancelled),
        Err(e) => Err(InferenceError::Transport(format!("model task failed: {e}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn returns_result_and_frees_slot() {
        let slot = InflightSlot::new();
        let out = run_bounded(&slot, Duration::from_secs(5), async { Ok::<_, InferenceError>(7) })
            .await
            .unwrap();
        assert_eq!(out, 7);
        assert!(!slot.is_busy());
    }

    #[tokio::test]
    async fn times_out() {
        let slot = InflightSlot::new();
        let err = run_bounded(&slot, Duration::from_millis(20), async {
            tokio::time::sleep(Duration::from_secs(10)).await;
            Ok::<_, InferenceError>(())
        })
        .await
        .unwrap_err();
        assert_eq!(err, InferenceError::Timeout(Duration::from_millis(20)));
    }

    #[tokio::test]
    async fn cancel_aborts_running_call() {
        let slot = Arc::new(InflightSlot::new());
        let runner = {
            let slot = Arc::clone(&slot);
            tokio::spawn(async move {
                run_bounded(&slot, Duration::from_secs(30), async {
                    tokio::time::sleep(Duration::from_secs(30)).await;
                    Ok::<_, InferenceError>(())
                })
                .await
            })
        };

        while !slot.is_busy() {
            tokio::task::yield_now().await;
        }
        assert!(slot.cancel());

        let err = runner.await.unwrap().unwrap_err();
        assert_eq!(err, InferenceError::Cancelled);
        assert!(!slot.cancel());
    }

    #[tokio::test]
    async fn newer_call_supersedes_older() {
        let slot = Arc::new(InflightSlot::new());
        let first = {
            let slot = Arc::clone(&slot);
            tokio::spawn(async move {
                run_bounded(&slot, Duration::from_secs(30), async {
                    tokio::time::sleep(Duration::from_secs(30)).await;
                    Ok::<_, InferenceError>("first")
                })
                .await
            })
        };
        while !slot.is_busy() {
            tokio::task::yield_now().await;
        }

        let second = run_bounded(&slot, Duration::from_secs(5), async {
            Ok::<_, InferenceError>("second")
        })
        .await;

        assert_eq!(second.unwrap(), "second");
        assert_eq!(first.await.unwrap().unwrap_err(), InferenceError::Cancelled);
    }
}
