use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::browser::Clock;
use crate::msg::UnknownTag;
use crate::time::Posix;
use crate::Error;

use super::to_json;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "config", rename_all = "camelCase")]
pub enum TimeEffect {
    /// Yields a [`Posix`] timestamp.
    CurrentTime,
    #[serde(untagged)]
    Unknown(UnknownTag),
}

pub(super) fn run(effect: &TimeEffect, clock: &dyn Clock) -> Result<Value, Error> {
    match effect {
        TimeEffect::CurrentTime => Ok(to_json(&Posix::from_milliseconds(clock.now_millis()))),
        TimeEffect::Unknown(tag) => {
            tracing::warn!(kind = %tag.kind, "unknown time effect type");
            Err(Error::UnknownEffect(format!("time.{}", tag.kind)))
        }
    }
}
