use crate::browser::Timers;
use crate::config::ReconcileMode;
use crate::emitter::Emitter;
use crate::msg::PendingMsg;
use crate::queue::JobConfig;

use super::reconcile::{Delta, Reconciler};
use super::Interval;

/// Keeps the installed timers in step with the declared set, refusing
/// intervals shorter than the configured floor.
pub struct IntervalManager {
    reconciler: Reconciler<Interval>,
    min_duration: u32,
}

impl IntervalManager {
    pub fn new(mode: ReconcileMode, min_duration: u32) -> Self {
        Self {
            reconciler: Reconciler::new(mode),
            min_duration,
        }
    }

    pub(crate) fn set_intervals(
        &mut self,
        desired: Vec<Interval>,
        timers: &dyn Timers,
        emitter: &Emitter,
    ) -> Delta {
        let min_duration = self.min_duration;

        let delta = self.reconciler.reconcile(desired, |interval| {
            if interval.duration < min_duration {
                tracing::warn!(
                    id = %interval.id,
                    duration = interval.duration,
                    min_duration,
                    "interval is shorter than the minimum, not starting it"
                );
                return None;
            }

            let msg = interval.msg.clone();
            let job = JobConfig::new(interval.id.clone(), interval.queue_strategy);
            let emitter = emitter.clone();

            Some(timers.set_interval(
                interval.duration,
                Box::new(move || {
                    emitter.emit(
                        PendingMsg::Subscription {
                            msg: msg.clone(),
                            source: None,
                        },
                        job.clone(),
                    );
                }),
            ))
        });

        if !delta.is_noop() {
            tracing::debug!(added = ?delta.added, removed = ?delta.removed, "updated intervals");
        }

        delta
    }

    pub fn active_ids(&self) -> Vec<String> {
        self.reconciler
            .active()
            .iter()
            .map(|binding| binding.descriptor().id.clone())
            .collect()
    }

    pub fn clear(&mut self) -> Delta {
        self.reconciler.clear()
    }
}
