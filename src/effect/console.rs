use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::browser::Console;
use crate::msg::UnknownTag;
use crate::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "config", rename_all = "camelCase")]
pub enum ConsoleEffect {
    Log { message: String },
    #[serde(untagged)]
    Unknown(UnknownTag),
}

pub(super) fn run(effect: &ConsoleEffect, console: &dyn Console) -> Result<Value, Error> {
    match effect {
        ConsoleEffect::Log { message } => {
            console.log(message);
            Ok(Value::Null)
        }
        ConsoleEffect::Unknown(tag) => {
            tracing::warn!(kind = %tag.kind, "unknown console effect type");
            Err(Error::UnknownEffect(format!("console.{}", tag.kind)))
        }
    }
}
