//! Runtime configuration.

use serde::{Deserialize, Serialize};

use crate::Error;

/// How the binding reconciler decides that a kept binding is "the same".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ReconcileMode {
    /// Bindings are identified by id alone. A descriptor whose other fields
    /// changed keeps its originally installed binding.
    #[default]
    IdOnly,
    /// A kept id whose descriptor differs from the installed one is stopped
    /// and installed again.
    Descriptor,
}

/// Configuration of the custom effect channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CustomEffectConfig {
    /// Keep custom effects dispatched before a handler is registered.
    pub use_backlog: bool,
    /// Maximum number of effects held in the backlog.
    pub backlog_capacity: usize,
}

impl Default for CustomEffectConfig {
    fn default() -> Self {
        Self {
            use_backlog: true,
            backlog_capacity: 100,
        }
    }
}

/// Configuration for a [`RuntimeController`](crate::RuntimeController).
///
/// Every field has a default, so partial JSON documents are accepted:
///
/// ```rust
/// use oxide_mvu_dom::RuntimeConfig;
///
/// let config = RuntimeConfig::from_json(r#"{ "minIntervalMs": 250 }"#).unwrap();
/// assert_eq!(config.min_interval_ms, 250);
/// assert_eq!(config.queue_capacity, 100);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RuntimeConfig {
    /// Pending jobs allowed before new jobs are shed.
    pub queue_capacity: usize,
    /// Intervals declared with a shorter duration are never installed.
    pub min_interval_ms: u32,
    pub custom_effects: CustomEffectConfig,
    pub reconcile: ReconcileMode,
    /// Elements carrying this attribute are left alone by the patcher.
    pub unmanaged_attribute: String,
    /// Skip patching a focused input whose live value differs from the markup.
    pub preserve_focused_input: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 100,
            min_interval_ms: 100,
            custom_effects: CustomEffectConfig::default(),
            reconcile: ReconcileMode::default(),
            unmanaged_attribute: "unmanaged".to_string(),
            preserve_focused_input: true,
        }
    }
}

impl RuntimeConfig {
    /// Parse a configuration document, filling omitted fields with defaults.
    pub fn from_json(raw: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(raw)?)
    }
}
