//! Worker pool
//!
//! A fixed set of persistent threads pulling work items from one shared
//! queue. The queue is guarded by a mutex and a condition variable; shutdown
//! is signalled with a sentinel entry rather than a closed flag. The sentinel
//! is never popped, so every thread observes it once the real work ahead of
//! it has drained.

use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread::JoinHandle;

use super::error::{AnalysisError, Result};

/// A unit of execution owned by one pool thread
pub trait Worker: Send + Sync + 'static {
    type Item: Send + 'static;
    /// Per-thread state built by `initialize` on the worker's own thread
    type State;

    /// Prepare the thread. Returning `None` makes the thread exit silently.
    fn initialize(&self) -> Option<Self::State>;

    /// Process one item. Returning `false` makes the thread exit.
    fn execute(&self, state: &mut Self::State, item: Self::Item) -> bool;
}

enum QueueEntry<T> {
    Work(T),
    Shutdown,
}

struct WorkQueue<T> {
    entries: Mutex<VecDeque<QueueEntry<T>>>,
    available: Condvar,
}

impl<T> WorkQueue<T> {
    fn new() -> Self {
        Self {
            entries: Mutex::new(VecDeque::new()),
            available: Condvar::new(),
        }
    }

    /// Block until a work item or the shutdown sentinel is at the front
    fn next(&self) -> Option<T> {
        let mut entries = self.entries.lock();
        loop {
            if matches!(entries.front(), Some(QueueEntry::Shutdown)) {
                return None;
            }
            if let Some(QueueEntry::Work(item)) = entries.pop_front() {
                return Some(item);
            }
            self.available.wait(&mut entries);
        }
    }
}

/// Pool of worker threads sharing one queue
pub struct WorkerPool<W: Worker> {
    queue: Arc<WorkQueue<W::Item>>,
    threads: Vec<JoinHandle<()>>,
    active: Arc<AtomicUsize>,
    initialized: bool,
}

impl<W: Worker> Default for WorkerPool<W> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Worker> WorkerPool<W> {
    pub fn new() -> Self {
        Self {
            queue: Arc::new(WorkQueue::new()),
            threads: Vec::new(),
            active: Arc::new(AtomicUsize::new(0)),
            initialized: false,
        }
    }

    /// Spawn one thread per worker.
    ///
    /// Returns `Ok(false)` if the pool is already running.
    pub fn initialize(&mut self, workers: Vec<Arc<W>>) -> Result<bool> {
        if self.initialized {
            return Ok(false);
        }
        self.initialized = true;

        for (index, worker) in workers.into_iter().enumerate() {
            let queue = Arc::clone(&self.queue);
            let active = Arc::clone(&self.active);
            active.fetch_add(1, Ordering::SeqCst);

            let spawned = std::thread::Builder::new()
                .name(format!("repostats-worker-{index}"))
                .spawn(move || {
                    run_worker(worker.as_ref(), &queue);
                    active.fetch_sub(1, Ordering::SeqCst);
                });

            match spawned {
                Ok(handle) => self.threads.push(handle),
                Err(e) => {
                    self.active.fetch_sub(1, Ordering::SeqCst);
                    // Tear down whatever already started before reporting
                    let _ = self.shutdown();
                    return Err(AnalysisError::WorkerPool(format!(
                        "failed to spawn worker thread {index}: {e}"
                    )));
                }
            }
        }

        tracing::debug!(threads = self.threads.len(), "worker pool started");
        Ok(true)
    }

    /// Queue one item and wake a waiting thread.
    ///
    /// Returns `false` when the pool is not running; callers treat that as a
    /// failure of the whole run.
    pub fn insert_work(&self, item: W::Item) -> bool {
        if !self.initialized {
            return false;
        }
        self.queue.entries.lock().push_back(QueueEntry::Work(item));
        self.queue.available.notify_one();
        true
    }

    /// Signal shutdown, wait for every thread to exit and reset the pool.
    ///
    /// Work queued ahead of the sentinel is processed first. Entries left
    /// behind by threads that exited early are discarded.
    pub fn shutdown(&mut self) -> Result<()> {
        self.queue.entries.lock().push_back(QueueEntry::Shutdown);
        self.queue.available.notify_all();

        let mut panicked = 0usize;
        for handle in self.threads.drain(..) {
            if handle.join().is_err() {
                panicked += 1;
            }
        }

        let leftover = {
            let mut entries = self.queue.entries.lock();
            let leftover = entries
                .iter()
                .filter(|e| matches!(e, QueueEntry::Work(_)))
                .count();
            entries.clear();
            leftover
        };
        if leftover > 0 {
            tracing::debug!(leftover, "discarded unprocessed work items");
        }

        self.initialized = false;

        if panicked > 0 {
            return Err(AnalysisError::WorkerPool(format!(
                "{panicked} worker thread(s) panicked"
            )));
        }
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Number of threads that have not exited yet
    pub fn active_workers(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }
}

impl<W: Worker> Drop for WorkerPool<W> {
    fn drop(&mut self) {
        if self.initialized {
            let _ = self.shutdown();
        }
    }
}

fn run_worker<W: Worker>(worker: &W, queue: &WorkQueue<W::Item>) {
    let Some(mut state) = worker.initialize() else {
        return;
    };
    while let Some(item) = queue.next() {
        if !worker.execute(&mut state, item) {
            return;
        }
    }
}
