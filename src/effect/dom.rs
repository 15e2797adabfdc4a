use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::browser::{Dom, ListenTarget, SyntheticEvent, Window};
use crate::msg::{EventSnapshot, UnknownTag};
use crate::Error;

use super::{decode, to_json};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "config", rename_all = "camelCase")]
pub enum DomEffect {
    DispatchEvent(DispatchEvent),
    FocusElement(ElementId),
    /// Focus an input and select its text.
    SelectInputText(ElementId),
    GetWindowSize,
    GetElementValue(GetElementValue),
    /// Value of the checked input among those matching a selector.
    GetRadioGroupValue(GetRadioGroupValue),
    GetFiles(ElementId),
    /// A `data-*` attribute of the closest element of the triggering event.
    GetTargetDataValue(GetTargetDataValue),
    #[serde(untagged)]
    Unknown(UnknownTag),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchEvent {
    pub event_target: ListenTarget,
    pub event_type: String,
    #[serde(default)]
    pub bubbles: bool,
    #[serde(default)]
    pub cancelable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementId {
    pub element_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetElementValue {
    pub element_id: String,
    #[serde(default)]
    pub parse_as_json: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetRadioGroupValue {
    pub selector: String,
    #[serde(default)]
    pub parse_as_json: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetTargetDataValue {
    pub name: String,
    #[serde(default)]
    pub parse_as_json: bool,
}

pub(super) fn run(
    effect: &DomEffect,
    dom: &dyn Dom,
    window: &dyn Window,
    source: Option<&EventSnapshot>,
) -> Result<Value, Error> {
    let value = match effect {
        DomEffect::DispatchEvent(config) => {
            dom.dispatch_event(
                config.event_target,
                &SyntheticEvent {
                    event_type: config.event_type.clone(),
                    bubbles: config.bubbles,
                    cancelable: config.cancelable,
                },
            );
            Value::Null
        }
        DomEffect::FocusElement(config) => {
            dom.focus(&config.element_id);
            Value::Null
        }
        DomEffect::SelectInputText(config) => {
            dom.select_text(&config.element_id);
            Value::Null
        }
        DomEffect::GetWindowSize => to_json(&window.size()),
        DomEffect::GetElementValue(config) => match dom.element_value(&config.element_id) {
            Some(raw) => {
                let value = decode(raw, config.parse_as_json);
                tracing::debug!(element_id = %config.element_id, %value, "got value from element");
                value
            }
            None => {
                tracing::error!(element_id = %config.element_id, "failed to get value from element");
                Value::Null
            }
        },
        DomEffect::GetRadioGroupValue(config) => match dom.checked_value(&config.selector) {
            Some(raw) => {
                let value = decode(raw, config.parse_as_json);
                tracing::debug!(selector = %config.selector, %value, "got value from radio group");
                value
            }
            None => {
                tracing::error!(selector = %config.selector, "failed to find a checked input in radio group");
                Value::Null
            }
        },
        DomEffect::GetFiles(config) => match dom.files(&config.element_id) {
            Some(files) => {
                tracing::debug!(element_id = %config.element_id, count = files.len(), "got files from element");
                to_json(&files)
            }
            None => {
                tracing::error!(element_id = %config.element_id, "failed to get files from element");
                Value::Null
            }
        },
        DomEffect::GetTargetDataValue(config) => {
            match source.and_then(|source| source.data(&config.name)) {
                Some(raw) => decode(raw.to_string(), config.parse_as_json),
                None => {
                    tracing::error!(name = %config.name, "failed to get data value from event target");
                    Value::Null
                }
            }
        }
        DomEffect::Unknown(tag) => {
            tracing::warn!(kind = %tag.kind, "unknown dom effect type");
            return Err(Error::UnknownEffect(format!("dom.{}", tag.kind)));
        }
    };

    Ok(value)
}
