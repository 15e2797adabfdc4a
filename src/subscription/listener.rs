use crate::browser::{Dom, DomEvent, ListenerOptions};
use crate::config::ReconcileMode;
use crate::emitter::Emitter;
use crate::msg::{EventSnapshot, PendingMsg};
use crate::queue::JobConfig;

use super::reconcile::{Delta, Reconciler};
use super::EventListener;

/// Keeps the installed DOM listeners in step with the declared set.
pub struct ListenerManager {
    reconciler: Reconciler<EventListener>,
}

impl ListenerManager {
    pub fn new(mode: ReconcileMode) -> Self {
        Self {
            reconciler: Reconciler::new(mode),
        }
    }

    pub(crate) fn set_listeners(
        &mut self,
        desired: Vec<EventListener>,
        dom: &dyn Dom,
        emitter: &Emitter,
    ) -> Delta {
        let delta = self.reconciler.reconcile(desired, |listener| {
            let options = ListenerOptions {
                capture: true,
                passive: !listener.propagation.prevent_default,
            };
            let descriptor = listener.clone();
            let emitter = emitter.clone();

            Some(dom.add_event_listener(
                listener.listen_target,
                &listener.event_type,
                options,
                Box::new(move |event: &dyn DomEvent| {
                    handle_event(&descriptor, event, &emitter);
                }),
            ))
        });

        if !delta.is_noop() {
            tracing::debug!(added = ?delta.added, removed = ?delta.removed, "updated event listeners");
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

/// Gate a native event through the listener's selector and matchers, then
/// queue its message. Returns whether a message was queued.
fn handle_event(listener: &EventListener, event: &dyn DomEvent, emitter: &Emitter) -> bool {
    if let Some(selector) = &listener.selector {
        if !event.target_closest(selector) {
            return false;
        }
    }

    if !listener.matchers.iter().all(|matcher| matcher.matches(event)) {
        return false;
    }

    if listener.propagation.prevent_default {
        event.prevent_default();
    }
    if listener.propagation.stop_propagation {
        event.stop_propagation();
    }

    tracing::trace!(id = %listener.id, event_type = %listener.event_type, "listener matched");

    let source = EventSnapshot::capture(&listener.msg, event);
    emitter.emit(
        PendingMsg::Subscription {
            msg: listener.msg.clone(),
            source: Some(source),
        },
        JobConfig::new(listener.id.clone(), listener.queue_strategy),
    );
    true
}
