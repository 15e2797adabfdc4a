//! Declarative bindings a page requests for its current model.

mod interval;
mod listener;
mod matcher;
mod reconcile;

pub use interval::IntervalManager;
pub use listener::ListenerManager;
pub use matcher::{
    EventMatcher, KeyboardCombo, KeyboardComboMatcher, KeyboardKeyMatcher, MouseButton,
    MouseButtonMatcher, SelectorMatcher,
};
pub use reconcile::{ActiveBinding, Binding, Delta, Reconciler};

use serde::{Deserialize, Serialize};

use crate::browser::ListenTarget;
use crate::msg::{SubscriptionMsg, UnknownTag};
use crate::queue::QueueStrategy;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "config", rename_all = "camelCase")]
pub enum Subscription {
    EventListener(EventListener),
    Interval(Interval),
    None,
    #[serde(untagged)]
    Unknown(UnknownTag),
}

/// A DOM listener binding.
///
/// The optional `selector` is a delegation gate: the event target or one of
/// its ancestors must match it before `matchers` are evaluated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventListener {
    pub id: String,
    #[serde(default)]
    pub listen_target: ListenTarget,
    pub event_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selector: Option<String>,
    #[serde(default)]
    pub matchers: Vec<EventMatcher>,
    pub msg: SubscriptionMsg,
    #[serde(default)]
    pub propagation: EventPropagation,
    #[serde(default)]
    pub queue_strategy: QueueStrategy,
}

impl EventListener {
    pub fn new(id: impl Into<String>, event_type: impl Into<String>, msg: impl Into<SubscriptionMsg>) -> Self {
        Self {
            id: id.into(),
            listen_target: ListenTarget::default(),
            event_type: event_type.into(),
            selector: None,
            matchers: Vec::new(),
            msg: msg.into(),
            propagation: EventPropagation::default(),
            queue_strategy: QueueStrategy::default(),
        }
    }

    pub fn on(mut self, selector: impl Into<String>) -> Self {
        self.selector = Some(selector.into());
        self
    }

    pub fn matching(mut self, matcher: EventMatcher) -> Self {
        self.matchers.push(matcher);
        self
    }

    pub fn listen_on(mut self, target: ListenTarget) -> Self {
        self.listen_target = target;
        self
    }

    pub fn propagation(mut self, propagation: EventPropagation) -> Self {
        self.propagation = propagation;
        self
    }

    pub fn strategy(mut self, strategy: QueueStrategy) -> Self {
        self.queue_strategy = strategy;
        self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EventPropagation {
    pub stop_propagation: bool,
    pub prevent_default: bool,
}

/// A repeating timer binding. `duration` is in milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Interval {
    pub id: String,
    pub duration: u32,
    pub msg: SubscriptionMsg,
    #[serde(default)]
    pub queue_strategy: QueueStrategy,
}

impl Interval {
    pub fn new(id: impl Into<String>, duration: u32, msg: impl Into<SubscriptionMsg>) -> Self {
        Self {
            id: id.into(),
            duration,
            msg: msg.into(),
            queue_strategy: QueueStrategy::default(),
        }
    }
}

impl Binding for EventListener {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Binding for Interval {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Split a declared subscription list by binding kind, dropping `none`
/// entries and unknown tags.
pub(crate) fn group(subscriptions: Vec<Subscription>) -> (Vec<EventListener>, Vec<Interval>) {
    let mut listeners = Vec::new();
    let mut intervals = Vec::new();

    for subscription in subscriptions {
        match subscription {
            Subscription::EventListener(listener) => listeners.push(listener),
            Subscription::Interval(interval) => intervals.push(interval),
            Subscription::None => {}
            Subscription::Unknown(tag) => match tag.kind.as_str() {
                "eventListener" | "interval" | "none" => {
                    tracing::warn!(kind = %tag.kind, "subscription config failed to decode, skipping it");
                }
                _ => tracing::warn!(kind = %tag.kind, "unknown subscription type"),
            },
        }
    }

    (listeners, intervals)
}
