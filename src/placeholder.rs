//! Substitution of captured values into pending messages.
//!
//! Only the top-level fields of an object message are inspected. A field is
//! replaced when it is either
//!
//! - a capture descriptor, an object of exactly `{"type", "config"}` that
//!   parses as a value-reading [`Effect`], replaced by the effect's result;
//! - an effect value sentinel `{"type": "effectValue"}`, replaced by the
//!   result of an effectful message's effect;
//! - a legacy `"VALUE_FROM_ID:<id>"` string, replaced by the current value of
//!   the element with that id, or `""`.
//!
//! Messages that are not objects pass through unchanged.

use serde_json::{Map, Value};

use crate::effect::{DomEffect, Effect, EffectDispatcher, EffectOutput, StorageEffect, TimeEffect};

const VALUE_FROM_ID: &str = "VALUE_FROM_ID:";

/// Parse `value` as a capture descriptor. Effects that write or navigate are
/// never captures; such fields are left as data.
fn as_capture(value: &Value) -> Option<Effect> {
    let object = value.as_object()?;
    if object.len() != 2 || !object.contains_key("type") || !object.contains_key("config") {
        return None;
    }

    let effect: Effect = serde_json::from_value(value.clone()).ok()?;
    is_read(&effect).then_some(effect)
}

fn is_read(effect: &Effect) -> bool {
    match effect {
        Effect::Dom(effect) => matches!(
            effect,
            DomEffect::GetElementValue(_)
                | DomEffect::GetRadioGroupValue(_)
                | DomEffect::GetTargetDataValue(_)
                | DomEffect::GetFiles(_)
                | DomEffect::GetWindowSize
        ),
        Effect::LocalStorage(StorageEffect::GetItem { .. })
        | Effect::SessionStorage(StorageEffect::GetItem { .. })
        | Effect::Time(TimeEffect::CurrentTime) => true,
        _ => false,
    }
}

/// Capture descriptors among the top-level fields of `msg`.
pub(crate) fn captures(msg: &Value) -> Vec<Effect> {
    msg.as_object()
        .map(|object| object.values().filter_map(as_capture).collect())
        .unwrap_or_default()
}

pub fn is_effect_value(value: &Value) -> bool {
    value
        .as_object()
        .is_some_and(|object| object.len() == 1 && object.get("type").and_then(Value::as_str) == Some("effectValue"))
}

/// Replace every capture descriptor and legacy id reference in `msg`.
pub fn resolve_captures(msg: Value, dispatcher: &EffectDispatcher<'_>) -> Value {
    map_fields(msg, |name, field| {
        if let Some(effect) = as_capture(&field) {
            return match dispatcher.run(&effect) {
                Ok(EffectOutput::Ready(value)) => value,
                Ok(EffectOutput::Pending(_)) => {
                    tracing::warn!(field = name, kind = effect.kind(), "asynchronous effects cannot be captured");
                    Value::Null
                }
                Err(err) => {
                    tracing::warn!(field = name, %err, "failed to capture value");
                    Value::Null
                }
            };
        }

        match field.as_str().and_then(|raw| raw.strip_prefix(VALUE_FROM_ID)) {
            Some(id) => {
                let value = dispatcher.browser().dom.element_value(id).unwrap_or_default();
                tracing::trace!(field = name, id, "resolved legacy element value reference");
                Value::String(value)
            }
            None => field,
        }
    })
}

/// Insert an effect's result into every `{"type": "effectValue"}` field.
pub fn insert_effect_value(msg: Value, value: &Value) -> Value {
    map_fields(msg, |_, field| if is_effect_value(&field) { value.clone() } else { field })
}

fn map_fields(msg: Value, mut f: impl FnMut(&str, Value) -> Value) -> Value {
    match msg {
        Value::Object(object) => Value::Object(
            object
                .into_iter()
                .map(|(name, field)| {
                    let field = f(&name, field);
                    (name, field)
                })
                .collect::<Map<String, Value>>(),
        ),
        other => other,
    }
}
