//! JSON boundary shared by the effect handlers.
//!
//! Failures are logged with the offending input and returned to the caller,
//! which decides whether they become `null` or stay an error.

use serde::Serialize;
use serde_json::Value;

use crate::Error;

pub fn parse(raw: &str) -> Result<Value, Error> {
    serde_json::from_str(raw).map_err(|err| {
        tracing::error!(raw, %err, "failed to parse json");
        Error::Json(err)
    })
}

pub fn stringify<T: Serialize + ?Sized>(value: &T) -> Result<String, Error> {
    serde_json::to_string(value).map_err(|err| {
        tracing::error!(%err, "failed to stringify data into json");
        Error::Json(err)
    })
}
