//! Handle for submitting pending messages to the owning controller.

use portable_atomic_util::Arc;

use crate::msg::PendingMsg;
use crate::queue::{EnqueueOutcome, JobConfig};

/// Cheap-to-clone handle captured by listener callbacks, interval ticks and
/// asynchronous effects.
///
/// It holds no strong reference to the controller, so bindings that outlive
/// their controller emit into nothing instead of keeping it alive.
pub(crate) struct Emitter(Arc<Box<dyn Fn(PendingMsg, JobConfig) -> EnqueueOutcome>>);

impl Clone for Emitter {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl Emitter {
    pub(crate) fn new(submit: impl Fn(PendingMsg, JobConfig) -> EnqueueOutcome + 'static) -> Self {
        Self(Arc::new(Box::new(submit)))
    }

    pub(crate) fn emit(&self, msg: PendingMsg, job: JobConfig) -> EnqueueOutcome {
        (**self.0)(msg, job)
    }
}

#[cfg(test)]
impl Emitter {
    /// An emitter that records every submission.
    pub(crate) fn recording() -> (Self, Arc<spin::Mutex<Vec<(PendingMsg, JobConfig)>>>) {
        let log = Arc::new(spin::Mutex::new(Vec::new()));
        let sink = log.clone();
        let emitter = Self::new(move |msg, job| {
            sink.lock().push((msg, job));
            EnqueueOutcome::Queued { coalesced: 0 }
        });
        (emitter, log)
    }
}
