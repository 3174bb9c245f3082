//! Scheduling core of the dependency-aware queue.

use std::collections::VecDeque;
use std::num::NonZeroUsize;
use std::sync::mpsc;
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, trace, warn};

use crate::completion::Completion;
use crate::dependency::DependencyKey;

/// Tracing target for queue scheduling.
pub(crate) const QUEUE_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::queue");

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Work queue that serialises conflicting items and parallelises the rest.
///
/// Items are kept in submission order until they complete. When an item is
/// submitted or completes, the queue scans the pending items front to back and
/// starts every item that has no conflicting predecessor still in the queue,
/// up to the optional concurrency limit. Each started item runs on its own
/// worker thread, so a blocking job never stalls unrelated work.
///
/// Cloning the queue yields another handle to the same schedule.
pub struct MessageQueue<K> {
    shared: Arc<Shared<K>>,
}

impl<K> Clone for MessageQueue<K> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<K> std::fmt::Debug for MessageQueue<K> {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.shared.lock_state();
        formatter
            .debug_struct("MessageQueue")
            .field("queued", &state.items.len())
            .field("running", &state.running)
            .field("limit", &self.shared.limit)
            .finish()
    }
}

struct Shared<K> {
    state: Mutex<QueueState<K>>,
    idle: Condvar,
    limit: Option<NonZeroUsize>,
}

struct QueueState<K> {
    next_sequence: u64,
    items: VecDeque<QueuedItem<K>>,
    running: usize,
}

struct QueuedItem<K> {
    sequence: u64,
    key: K,
    /// `None` once the item has started.
    job: Option<Job>,
}

impl<K: DependencyKey> MessageQueue<K> {
    /// Creates a queue without a concurrency limit.
    #[must_use]
    pub fn new() -> Self {
        Self::with_limit(None)
    }

    /// Creates a queue that runs at most `limit` items at a time.
    ///
    /// A limit only affects throughput; ordering guarantees are unchanged.
    #[must_use]
    pub fn with_limit(limit: Option<NonZeroUsize>) -> Self {
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(QueueState {
                    next_sequence: 0,
                    items: VecDeque::new(),
                    running: 0,
                }),
                idle: Condvar::new(),
                limit,
            }),
        }
    }

    /// Submits `job` under `key` and returns a handle to its result.
    ///
    /// The job starts once every earlier item whose key conflicts with `key`
    /// has completed.
    pub fn submit<F, T>(&self, key: K, job: F) -> Completion<T>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let (sender, receiver) = mpsc::channel();
        let wrapped: Job = Box::new(move || {
            if sender.send(job()).is_err() {
                trace!(target: QUEUE_TARGET, "completion dropped before job finished");
            }
        });

        let ready = {
            let mut state = self.shared.lock_state();
            let sequence = state.next_sequence;
            state.next_sequence = sequence.wrapping_add(1);
            state.items.push_back(QueuedItem {
                sequence,
                key,
                job: Some(wrapped),
            });
            trace!(
                target: QUEUE_TARGET,
                sequence,
                queued = state.items.len(),
                "item submitted"
            );
            state.take_ready(self.shared.limit)
        };
        Shared::start(&self.shared, ready);

        Completion::new(receiver)
    }

    /// Blocks until every submitted item has completed.
    pub fn wait_until_idle(&self) {
        let mut state = self.shared.lock_state();
        while !state.items.is_empty() {
            state = self
                .shared
                .idle
                .wait(state)
                .unwrap_or_else(|poison| poison.into_inner());
        }
    }

    /// Waits up to `timeout` for the queue to drain. Returns `true` when idle.
    #[must_use]
    pub fn wait_until_idle_timeout(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut state = self.shared.lock_state();
        while !state.items.is_empty() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return false;
            }
            state = self
                .shared
                .idle
                .wait_timeout(state, remaining)
                .map(|(guard, _)| guard)
                .unwrap_or_else(|poison| poison.into_inner().0);
        }
        true
    }

    /// Number of items submitted but not yet started.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        let state = self.shared.lock_state();
        state.items.len().saturating_sub(state.running)
    }

    /// Number of items currently executing.
    #[must_use]
    pub fn running_len(&self) -> usize {
        self.shared.lock_state().running
    }
}

impl<K: DependencyKey> Default for MessageQueue<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> Shared<K> {
    fn lock_state(&self) -> MutexGuard<'_, QueueState<K>> {
        // Jobs never run under this lock, so a poisoned guard still holds a
        // consistent schedule.
        self.state
            .lock()
            .unwrap_or_else(|poison| poison.into_inner())
    }
}

impl<K: DependencyKey> Shared<K> {
    fn start(shared: &Arc<Self>, ready: Vec<(u64, Job)>) {
        for (sequence, job) in ready {
            // The guard travels with the job so the item is released even if
            // the thread never starts or the job panics.
            let guard = ReleaseGuard {
                shared: Arc::clone(shared),
                sequence,
            };
            let spawned = thread::Builder::new()
                .name(format!("trellis-queue-{sequence}"))
                .spawn(move || {
                    let _guard = guard;
                    job();
                });
            if let Err(error) = spawned {
                warn!(
                    target: QUEUE_TARGET,
                    sequence,
                    %error,
                    "failed to start worker thread; item abandoned"
                );
            }
        }
    }

    fn release(shared: &Arc<Self>, sequence: u64) {
        let ready = {
            let mut state = shared.lock_state();
            if let Some(position) = state
                .items
                .iter()
                .position(|item| item.sequence == sequence)
            {
                state.items.remove(position);
            }
            state.running = state.running.saturating_sub(1);
            debug!(
                target: QUEUE_TARGET,
                sequence,
                queued = state.items.len(),
                running = state.running,
                "item completed"
            );
            let ready = state.take_ready(shared.limit);
            if state.items.is_empty() {
                shared.idle.notify_all();
            }
            ready
        };
        Self::start(shared, ready);
    }
}

impl<K: DependencyKey> QueueState<K> {
    /// Marks every eligible pending item as running and returns their jobs in
    /// submission order.
    fn take_ready(&mut self, limit: Option<NonZeroUsize>) -> Vec<(u64, Job)> {
        let mut ready = Vec::new();
        let items = self.items.make_contiguous();
        for index in 0..items.len() {
            if limit.is_some_and(|limit| self.running >= limit.get()) {
                break;
            }
            let (earlier, rest) = items.split_at_mut(index);
            let Some(item) = rest.first_mut() else {
                break;
            };
            if item.job.is_none() {
                continue;
            }
            if earlier
                .iter()
                .any(|predecessor| item.key.conflicts_with(&predecessor.key))
            {
                continue;
            }
            if let Some(job) = item.job.take() {
                self.running += 1;
                debug!(
                    target: QUEUE_TARGET,
                    sequence = item.sequence,
                    running = self.running,
                    "item started"
                );
                ready.push((item.sequence, job));
            }
        }
        ready
    }
}

struct ReleaseGuard<K: DependencyKey> {
    shared: Arc<Shared<K>>,
    sequence: u64,
}

impl<K: DependencyKey> Drop for ReleaseGuard<K> {
    fn drop(&mut self) {
        Shared::release(&self.shared, self.sequence);
    }
}
