use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::browser::Storage;
use crate::msg::UnknownTag;
use crate::{json, Error};

/// Local or session storage access. Values are stored as JSON strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "config", rename_all = "camelCase")]
pub enum StorageEffect {
    /// Yields the parsed value, or `null` when absent or malformed.
    GetItem { key: String },
    /// Yields `true` once the write succeeded.
    SetItem { key: String, value: Value },
    #[serde(untagged)]
    Unknown(UnknownTag),
}

pub(super) fn run(effect: &StorageEffect, storage: &dyn Storage) -> Result<Value, Error> {
    match effect {
        StorageEffect::GetItem { key } => {
            let value = storage
                .get_item(key)
                .and_then(|raw| json::parse(&raw).ok())
                .unwrap_or(Value::Null);
            tracing::debug!(key = %key, "read storage item");
            Ok(value)
        }
        StorageEffect::SetItem { key, value } => {
            let Ok(raw) = json::stringify(value) else {
                return Ok(Value::Bool(false));
            };

            match storage.set_item(key, &raw) {
                Ok(()) => Ok(Value::Bool(true)),
                Err(err) => {
                    tracing::warn!(key = %key, %err, "failed to write storage item");
                    Ok(Value::Bool(false))
                }
            }
        }
        StorageEffect::Unknown(tag) => {
            tracing::warn!(kind = %tag.kind, "unknown storage effect type");
            Err(Error::UnknownEffect(format!("storage.{}", tag.kind)))
        }
    }
}
