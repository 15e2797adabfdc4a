use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::browser::{History, Location};
use crate::msg::UnknownTag;
use crate::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "config", rename_all = "camelCase")]
pub enum NavigationEffect {
    PushUrl(String),
    ReplaceUrl(String),
    /// Full page navigation.
    SetLocation(String),
    #[serde(untagged)]
    Unknown(UnknownTag),
}

pub(super) fn run(effect: &NavigationEffect, history: &dyn History, location: &dyn Location) -> Result<Value, Error> {
    match effect {
        NavigationEffect::PushUrl(url) => history.push_url(url),
        NavigationEffect::ReplaceUrl(url) => history.replace_url(url),
        NavigationEffect::SetLocation(url) => location.assign(url),
        NavigationEffect::Unknown(tag) => {
            tracing::warn!(kind = %tag.kind, "unknown navigation effect type");
            return Err(Error::UnknownEffect(format!("navigation.{}", tag.kind)));
        }
    }

    Ok(Value::Null)
}
