//! Message templates declared by the core and the pending form they take
//! while waiting in the job queue.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::browser::DomEvent;
use crate::effect::{DomEffect, Effect};
use crate::placeholder;
use crate::queue::JobConfig;
use crate::Error;

/// Message template attached to a binding or queued by an effect.
///
/// A `pure` message is delivered as-is (after capture substitution). An
/// `effectful` message first runs its effect and substitutes the result into
/// every top-level `{"type": "effectValue"}` field of `msg`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "config", rename_all = "camelCase")]
pub enum SubscriptionMsg {
    Pure(Value),
    Effectful(EffectfulMsg),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectfulMsg {
    pub msg: Value,
    pub effect: Box<Effect>,
}

impl SubscriptionMsg {
    /// Serialize a core message into a pure template.
    pub fn pure<M: Serialize + ?Sized>(msg: &M) -> Result<Self, Error> {
        Ok(Self::Pure(serde_json::to_value(msg)?))
    }

    pub fn effectful(msg: Value, effect: Effect) -> Self {
        Self::Effectful(EffectfulMsg {
            msg,
            effect: Box::new(effect),
        })
    }

    /// Names of every `data-*` attribute this template reads from its
    /// triggering event.
    pub(crate) fn target_data_names(&self) -> Vec<String> {
        let (template, effect) = match self {
            Self::Pure(msg) => (msg, None),
            Self::Effectful(effectful) => (&effectful.msg, Some(effectful.effect.as_ref())),
        };

        let captures = placeholder::captures(template);
        effect
            .into_iter()
            .chain(captures.iter())
            .filter_map(|effect| match effect {
                Effect::Dom(DomEffect::GetTargetDataValue(config)) => Some(config.name.clone()),
                _ => None,
            })
            .collect()
    }
}

impl From<Value> for SubscriptionMsg {
    fn from(msg: Value) -> Self {
        Self::Pure(msg)
    }
}

/// A message an update asks the runtime to enqueue, as produced by
/// [`Effect::Msg`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueuedMsg {
    pub msg: SubscriptionMsg,
    #[serde(default)]
    pub queue: JobConfig,
}

/// A message sent by host code through
/// [`RuntimeController::send_message`](crate::RuntimeController::send_message).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostMsg {
    #[serde(rename = "type")]
    pub kind: String,
    pub data: Value,
}

/// Event data copied out of a DOM event while it is still alive, so captures
/// that depend on the event can be resolved when the job eventually runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventSnapshot {
    data: BTreeMap<String, Option<String>>,
}

impl EventSnapshot {
    pub(crate) fn capture(msg: &SubscriptionMsg, event: &dyn DomEvent) -> Self {
        let data = msg
            .target_data_names()
            .into_iter()
            .map(|name| {
                let value = event.closest_attribute(&format!("data-{name}"));
                (name, value)
            })
            .collect();

        Self { data }
    }

    pub fn with_data(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.data.insert(name.into(), Some(value.into()));
        self
    }

    /// Value of `data-<name>` on the closest element of the triggering event.
    pub fn data(&self, name: &str) -> Option<&str> {
        self.data.get(name).and_then(|value| value.as_deref())
    }
}

/// Fallback arm of the crate's tagged unions: any `{"type": ...}` object whose
/// tag has no known variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnknownTag {
    #[serde(rename = "type")]
    pub kind: String,
}

/// A message waiting in the job queue.
pub(crate) enum PendingMsg {
    Subscription {
        msg: SubscriptionMsg,
        source: Option<EventSnapshot>,
    },
    Host(HostMsg),
}

impl PendingMsg {
    pub(crate) fn is_empty(&self) -> bool {
        matches!(
            self,
            Self::Subscription {
                msg: SubscriptionMsg::Pure(Value::Null),
                ..
            }
        )
    }
}
