use futures::FutureExt;
use serde::{Deserialize, Serialize};

use crate::browser::Clipboard;
use crate::msg::UnknownTag;
use crate::Error;

use super::{to_json, EffectOutput};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "config", rename_all = "camelCase")]
pub enum ClipboardEffect {
    WriteText { text: String },
    #[serde(untagged)]
    Unknown(UnknownTag),
}

/// Value produced by a clipboard write. Permission denials are reported here
/// rather than failing the job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClipboardOutcome {
    pub success: bool,
    pub error: Option<String>,
}

pub(super) fn run(effect: &ClipboardEffect, clipboard: &dyn Clipboard) -> Result<EffectOutput, Error> {
    match effect {
        ClipboardEffect::WriteText { text } => {
            let write = clipboard.write_text(text);

            Ok(EffectOutput::Pending(
                async move {
                    let outcome = match write.await {
                        Ok(()) => ClipboardOutcome {
                            success: true,
                            error: None,
                        },
                        Err(error) => {
                            tracing::error!(%error, "failed to write text to clipboard");
                            ClipboardOutcome {
                                success: false,
                                error: Some(error),
                            }
                        }
                    };
                    to_json(&outcome)
                }
                .boxed_local(),
            ))
        }
        ClipboardEffect::Unknown(tag) => {
            tracing::warn!(kind = %tag.kind, "unknown clipboard effect type");
            Err(Error::UnknownEffect(format!("clipboard.{}", tag.kind)))
        }
    }
}
