//! Dispatch pool (component E). See spec §4.E.
//!
//! A bounded worker pool owned by the visitor: `dispatch` enqueues a
//! future for later execution, the admission width is the only
//! backpressure (§5 "Backpressure"), and `join` drains every in-flight
//! task before the crawl is considered complete. Grounded on the
//! semaphore-bounded `tokio::spawn` fan-out used for per-frontier
//! concurrency in the dependency-graph walker this crate's traversal
//! engine is modeled on.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinHandle;

/// Bounded pool of dispatched subtree crawls.
pub struct DispatchPool {
    semaphore: Arc<Semaphore>,
    handles: std::sync::Mutex<Vec<JoinHandle<()>>>,
}

impl DispatchPool {
    pub fn new(max_concurrency: usize) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(max_concurrency.max(1))),
            handles: std::sync::Mutex::new(Vec::new()),
        }
    }

    /// Enqueue `task` for execution on the pool. Admission is governed by
    /// the semaphore, not by blocking the caller outright: the permit is
    /// acquired inside the spawned task, so `dispatch` itself returns
    /// immediately and the bound is enforced by how many tasks actually
    /// run concurrently.
    pub fn dispatch<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let semaphore = Arc::clone(&self.semaphore);
        let handle = tokio::spawn(async move {
            let _permit = semaphore.acquire_owned().await.expect("semaphore never closed");
            task.await;
        });
        self.handles.lock().expect("dispatch pool mutex poisoned").push(handle);
    }

    /// Awaits every task dispatched so far (including ones dispatched by
    /// tasks that were themselves dispatched, as long as they were
    /// enqueued before this call observes them — callers drain in a loop
    /// until the handle list stops growing).
    pub async fn join(&self) {
        loop {
            let handles = {
                let mut guard = self.handles.lock().expect("dispatch pool mutex poisoned");
                std::mem::take(&mut *guard)
            };
            if handles.is_empty() {
                break;
            }
            for handle in handles {
                let _ = handle.await;
            }
        }
    }
}
