//! Typed timestamps handed to the core.

use serde::{Deserialize, Serialize};

/// Milliseconds since the Unix epoch.
///
/// Serialized as `{"milliseconds": n}` so the unit travels with the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Posix {
    pub milliseconds: u64,
}

impl Posix {
    pub fn from_milliseconds(milliseconds: u64) -> Self {
        Self { milliseconds }
    }
}
