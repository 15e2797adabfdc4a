//! Serialized job queue feeding the update cycle.
//!
//! At most one job action runs at a time. Jobs enqueued while an action is
//! running (including by the action itself) wait their turn, so no two core
//! updates ever interleave.
//!
//! A job that must wait for an asynchronous result calls
//! [`JobQueue::suspend`] before returning. Draining then pauses, with later
//! jobs held pending, until [`JobQueue::resume`] hands over the job's
//! continuation, which runs ahead of them.

use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};

use serde::{Deserialize, Serialize};
use spin::Mutex;

use crate::Error;

/// How a job treats pending jobs that share its key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum QueueStrategy {
    /// Append unconditionally.
    #[default]
    Fifo,
    /// Discard pending jobs with the same key first; latest wins.
    DropOlder,
}

/// Queue key and strategy for a submitted message.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct JobConfig {
    pub id: String,
    pub strategy: QueueStrategy,
}

impl JobConfig {
    pub fn new(id: impl Into<String>, strategy: QueueStrategy) -> Self {
        Self {
            id: id.into(),
            strategy,
        }
    }
}

impl Default for JobConfig {
    fn default() -> Self {
        Self::new("anonymous", QueueStrategy::Fifo)
    }
}

pub type JobAction = Box<dyn FnOnce() -> Result<(), Error>>;

struct Job {
    key: String,
    action: JobAction,
}

struct QueueState {
    pending: VecDeque<Job>,
    running: bool,
    /// Key of the job waiting for its continuation.
    suspended: Option<String>,
}

/// What happened to a job handed to [`JobQueue::enqueue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnqueueOutcome {
    /// Appended; `coalesced` older same-key jobs were discarded first.
    Queued { coalesced: usize },
    /// Shed because the queue was at capacity.
    Dropped,
}

pub struct JobQueue {
    capacity: usize,
    state: Mutex<QueueState>,
}

impl JobQueue {
    /// A queue holding at most `capacity` pending jobs. A capacity of zero
    /// is raised to one so a job can always be submitted to an idle queue.
    pub fn new(capacity: usize) -> Self {
        if capacity == 0 {
            tracing::warn!("queue capacity of zero would shed every job, using 1");
        }

        Self {
            capacity: capacity.max(1),
            state: Mutex::new(QueueState {
                pending: VecDeque::new(),
                running: false,
                suspended: None,
            }),
        }
    }

    /// Submit a job and, if no job is running, drain the queue on the
    /// caller's stack.
    pub fn enqueue(
        &self,
        key: impl Into<String>,
        strategy: QueueStrategy,
        action: JobAction,
    ) -> EnqueueOutcome {
        let key = key.into();

        let (outcome, should_drain) = {
            let mut state = self.state.lock();

            if state.pending.len() >= self.capacity {
                tracing::warn!(key = %key, capacity = self.capacity, "event queue is full, dropping job");
                return EnqueueOutcome::Dropped;
            }

            let coalesced = match strategy {
                QueueStrategy::Fifo => 0,
                QueueStrategy::DropOlder => {
                    let before = state.pending.len();
                    state.pending.retain(|job| job.key != key);
                    before - state.pending.len()
                }
            };

            if coalesced > 0 {
                tracing::trace!(key = %key, coalesced, "dropped older pending jobs");
            }

            state.pending.push_back(Job { key, action });

            let should_drain = !state.running && state.suspended.is_none();
            if should_drain {
                state.running = true;
            }
            (EnqueueOutcome::Queued { coalesced }, should_drain)
        };

        if should_drain {
            self.drain();
        }

        outcome
    }

    pub fn is_running(&self) -> bool {
        self.state.lock().running
    }

    pub fn is_suspended(&self) -> bool {
        self.state.lock().suspended.is_some()
    }

    /// Pause draining once the running job `key` returns.
    pub fn suspend(&self, key: impl Into<String>) {
        let key = key.into();
        tracing::trace!(key = %key, "suspending queue");
        self.state.lock().suspended = Some(key);
    }

    /// Run `continuation` for the suspended job ahead of every pending job,
    /// then keep draining. Called without a suspension, it behaves like a
    /// FIFO enqueue at the head of the queue.
    pub fn resume(&self, continuation: JobAction) {
        let should_drain = {
            let mut state = self.state.lock();
            let key = state.suspended.take().unwrap_or_else(|| "resumed".to_string());
            tracing::trace!(key = %key, "resuming queue");
            state.pending.push_front(Job {
                key,
                action: continuation,
            });

            let should_drain = !state.running;
            state.running = true;
            should_drain
        };

        if should_drain {
            self.drain();
        }
    }

    pub fn pending(&self) -> usize {
        self.state.lock().pending.len()
    }

    fn drain(&self) {
        loop {
            let job = {
                let mut state = self.state.lock();
                if state.suspended.is_some() {
                    state.running = false;
                    return;
                }
                match state.pending.pop_front() {
                    Some(job) => job,
                    None => {
                        state.running = false;
                        return;
                    }
                }
            };

            let Job { key, action } = job;
            let result = panic::catch_unwind(AssertUnwindSafe(action))
                .unwrap_or_else(|_| Err(Error::JobPanicked(key.clone())));

            if let Err(err) = result {
                tracing::error!(key = %key, %err, "failed to run job");
            }
        }
    }
}
