//! Typed side effects and their dispatcher.
//!
//! Effects are declarative values returned by [`Page::init`](crate::Page::init)
//! and [`Page::update`](crate::Page::update). Each family is executed by its own
//! module against the matching [`Browser`] adapter, so a family can be tested in
//! isolation with a mock of that one adapter.
//!
//! # Example
//!
//! ```rust
//! use oxide_mvu_dom::{Effect, StorageEffect};
//! use serde_json::json;
//!
//! let save = Effect::LocalStorage(StorageEffect::SetItem {
//!     key: "draft".to_string(),
//!     value: json!({ "title": "hello" }),
//! });
//!
//! let parsed: Effect = serde_json::from_value(json!({
//!     "type": "localStorage",
//!     "config": { "type": "setItem", "config": { "key": "draft", "value": { "title": "hello" } } }
//! })).unwrap();
//!
//! assert_eq!(save, parsed);
//! ```

mod clipboard;
mod console;
mod custom;
mod dom;
mod navigation;
mod storage;
mod time;

pub use clipboard::{ClipboardEffect, ClipboardOutcome};
pub use console::ConsoleEffect;
pub use custom::CustomEffects;
pub use dom::{DispatchEvent, DomEffect, ElementId, GetElementValue, GetRadioGroupValue, GetTargetDataValue};
pub use navigation::NavigationEffect;
pub use storage::StorageEffect;
pub use time::TimeEffect;

use futures::future::LocalBoxFuture;
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::browser::Browser;
use crate::emitter::Emitter;
use crate::msg::{EventSnapshot, PendingMsg, QueuedMsg, SubscriptionMsg, UnknownTag};
use crate::queue::{JobConfig, QueueStrategy};
use crate::{Error, Spawner};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "config", rename_all = "camelCase")]
pub enum Effect {
    Dom(DomEffect),
    Navigation(NavigationEffect),
    LocalStorage(StorageEffect),
    SessionStorage(StorageEffect),
    Clipboard(ClipboardEffect),
    Time(TimeEffect),
    Console(ConsoleEffect),
    /// Forwarded untouched to the host's custom effect handler.
    #[serde(alias = "app")]
    Custom(Value),
    /// Enqueue a message as if a binding had fired.
    Msg(QueuedMsg),
    None,
    #[serde(untagged)]
    Unknown(UnknownTag),
}

impl Effect {
    /// Enqueue `msg` with no special queue key.
    pub fn msg(msg: impl Into<SubscriptionMsg>) -> Self {
        Self::Msg(QueuedMsg {
            msg: msg.into(),
            queue: JobConfig::default(),
        })
    }

    /// Read `key` from local storage and deliver it in `template`'s
    /// `{"type": "effectValue"}` fields. Repeated loads of the same key
    /// coalesce to the latest.
    pub fn load_local(key: impl Into<String>, template: Value) -> Self {
        let key = key.into();
        let queue = JobConfig::new(format!("localstorage-get-{key}"), QueueStrategy::DropOlder);

        Self::Msg(QueuedMsg {
            msg: SubscriptionMsg::effectful(template, Self::LocalStorage(StorageEffect::GetItem { key })),
            queue,
        })
    }

    /// The tag used in logs and errors.
    pub fn kind(&self) -> &str {
        match self {
            Self::Dom(_) => "dom",
            Self::Navigation(_) => "navigation",
            Self::LocalStorage(_) => "localStorage",
            Self::SessionStorage(_) => "sessionStorage",
            Self::Clipboard(_) => "clipboard",
            Self::Time(_) => "time",
            Self::Console(_) => "console",
            Self::Custom(_) => "custom",
            Self::Msg(_) => "msg",
            Self::None => "none",
            Self::Unknown(tag) => &tag.kind,
        }
    }
}

/// Result of running one effect.
pub enum EffectOutput {
    Ready(Value),
    /// The effect completes on a later tick.
    Pending(LocalBoxFuture<'static, Value>),
}

impl EffectOutput {
    pub fn none() -> Self {
        Self::Ready(Value::Null)
    }
}

/// Executes effects against a [`Browser`].
///
/// `source` is the snapshot of the event that triggered the message being
/// resolved, if any; `getTargetDataValue` reads from it.
pub struct EffectDispatcher<'a> {
    browser: &'a Browser,
    custom: &'a CustomEffects,
    source: Option<&'a EventSnapshot>,
}

impl<'a> EffectDispatcher<'a> {
    pub fn new(browser: &'a Browser, custom: &'a CustomEffects) -> Self {
        Self {
            browser,
            custom,
            source: None,
        }
    }

    pub fn with_source(mut self, source: Option<&'a EventSnapshot>) -> Self {
        self.source = source;
        self
    }

    pub(crate) fn browser(&self) -> &Browser {
        self.browser
    }

    /// Run one effect for its value.
    ///
    /// Fails for unknown effects and for `msg`, which has no value of its own.
    pub fn run(&self, effect: &Effect) -> Result<EffectOutput, Error> {
        let browser = self.browser;

        let value = match effect {
            Effect::Dom(effect) => dom::run(effect, browser.dom.as_ref(), browser.window.as_ref(), self.source)?,
            Effect::Navigation(effect) => navigation::run(effect, browser.history.as_ref(), browser.location.as_ref())?,
            Effect::LocalStorage(effect) => storage::run(effect, browser.local_storage.as_ref())?,
            Effect::SessionStorage(effect) => storage::run(effect, browser.session_storage.as_ref())?,
            Effect::Clipboard(effect) => return clipboard::run(effect, browser.clipboard.as_ref()),
            Effect::Time(effect) => time::run(effect, browser.clock.as_ref())?,
            Effect::Console(effect) => console::run(effect, browser.console.as_ref())?,
            Effect::Custom(effect) => {
                self.custom.dispatch(effect.clone());
                Value::Null
            }
            Effect::Msg(_) => return Err(Error::NotCapturable("msg")),
            Effect::None => Value::Null,
            Effect::Unknown(tag) => {
                tracing::warn!(kind = %tag.kind, "unknown effect type");
                return Err(Error::UnknownEffect(tag.kind.clone()));
            }
        };

        Ok(EffectOutput::Ready(value))
    }

    /// Run a batch returned by the page. Queued messages go to `emitter`,
    /// asynchronous effects to `spawner`; unknown effects are logged and
    /// skipped.
    pub(crate) fn handle(&self, effects: Vec<Effect>, emitter: &Emitter, spawner: &dyn Spawner) {
        for effect in effects {
            match effect {
                Effect::Msg(QueuedMsg { msg, queue }) => {
                    emitter.emit(PendingMsg::Subscription { msg, source: None }, queue);
                }
                effect => match self.run(&effect) {
                    Ok(EffectOutput::Ready(_)) => {}
                    Ok(EffectOutput::Pending(future)) => spawner.spawn(future.map(|_| ()).boxed_local()),
                    Err(Error::UnknownEffect(_)) => {}
                    Err(err) => tracing::error!(kind = effect.kind(), %err, "failed to run effect"),
                },
            }
        }
    }
}

/// Serialize an effect result, logging and yielding `null` on failure.
fn to_json<T: Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or_else(|err| {
        tracing::error!(%err, "failed to serialize effect result");
        Value::Null
    })
}

/// Decode a raw string read from the DOM or storage.
fn decode(raw: String, parse_as_json: bool) -> Value {
    if parse_as_json {
        crate::json::parse(&raw).unwrap_or(Value::Null)
    } else {
        Value::String(raw)
    }
}
