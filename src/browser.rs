//! Browser capability adapters.
//!
//! Every browser subsystem the runtime touches sits behind a small trait so
//! the runtime can be driven by native `web-sys` bindings in production and by
//! fakes in tests (see [`FakeBrowser`](crate::testing::FakeBrowser)).

use core::fmt;

use futures::future::LocalBoxFuture;
use serde::{Deserialize, Serialize};
use spin::Mutex;

use crate::StorageError;

/// Capability to detach a native listener or timer.
///
/// Aborting is idempotent: only the first call runs the underlying detach.
pub struct AbortHandle {
    abort: Mutex<Option<Box<dyn FnOnce()>>>,
}

impl AbortHandle {
    pub fn new(abort: impl FnOnce() + 'static) -> Self {
        Self {
            abort: Mutex::new(Some(Box::new(abort))),
        }
    }

    /// A handle with nothing to detach.
    pub fn noop() -> Self {
        Self::new(|| {})
    }

    pub fn abort(&self) {
        let abort = self.abort.lock().take();
        if let Some(abort) = abort {
            abort();
        }
    }

    pub fn is_aborted(&self) -> bool {
        self.abort.lock().is_none()
    }
}

impl fmt::Debug for AbortHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AbortHandle")
            .field("aborted", &self.is_aborted())
            .finish()
    }
}

/// Where a listener is attached.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ListenTarget {
    Window,
    #[default]
    Document,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListenerOptions {
    pub capture: bool,
    pub passive: bool,
}

/// Kind-specific payload of a DOM event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventDetail {
    Keyboard(KeyboardDetail),
    Mouse { button: i16 },
    Other,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyboardDetail {
    /// Physical key code, e.g. `KeyA` or `Enter`.
    pub code: String,
    pub ctrl: bool,
    pub meta: bool,
    pub alt: bool,
    pub shift: bool,
}

/// A live DOM event, borrowed for the duration of a listener callback.
pub trait DomEvent {
    fn detail(&self) -> EventDetail;

    /// Whether the event target itself matches `selector`.
    fn target_matches(&self, selector: &str) -> bool;

    /// Whether the event target or one of its ancestors matches `selector`.
    fn target_closest(&self, selector: &str) -> bool;

    /// Value of `attribute` on the closest element (target included) carrying it.
    fn closest_attribute(&self, attribute: &str) -> Option<String>;

    fn prevent_default(&self);

    fn stop_propagation(&self);
}

pub type EventHandler = Box<dyn Fn(&dyn DomEvent)>;

pub type TimerCallback = Box<dyn Fn()>;

/// Describes an event to synthesize with [`Dom::dispatch_event`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntheticEvent {
    pub event_type: String,
    pub bubbles: bool,
    pub cancelable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileInfo {
    pub name: String,
    pub mime: String,
    pub size: u64,
    pub last_modified: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowSize {
    pub width: u32,
    pub height: u32,
}

pub trait Dom {
    fn has_element(&self, id: &str) -> bool;

    /// The `value` of the element with `id`, if it exists and has one.
    fn element_value(&self, id: &str) -> Option<String>;

    /// The value of the first checked input matching `selector`.
    fn checked_value(&self, selector: &str) -> Option<String>;

    /// Files selected in the file input with `id`.
    fn files(&self, id: &str) -> Option<Vec<FileInfo>>;

    fn focus(&self, id: &str);

    /// Focus the input with `id` and select its text.
    fn select_text(&self, id: &str);

    fn dispatch_event(&self, target: ListenTarget, event: &SyntheticEvent);

    fn add_event_listener(
        &self,
        target: ListenTarget,
        event_type: &str,
        options: ListenerOptions,
        handler: EventHandler,
    ) -> AbortHandle;
}

pub trait Timers {
    fn set_interval(&self, duration_ms: u32, tick: TimerCallback) -> AbortHandle;
}

#[cfg_attr(test, mockall::automock)]
pub trait Window {
    fn size(&self) -> WindowSize;
}

#[cfg_attr(test, mockall::automock)]
pub trait History {
    fn push_url(&self, url: &str);
    fn replace_url(&self, url: &str);
}

#[cfg_attr(test, mockall::automock)]
pub trait Location {
    fn assign(&self, url: &str);
}

#[cfg_attr(test, mockall::automock)]
pub trait Storage {
    fn get_item(&self, key: &str) -> Option<String>;
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

#[cfg_attr(test, mockall::automock)]
pub trait Clipboard {
    /// Resolves to the browser's rejection message when access is denied.
    fn write_text(&self, text: &str) -> LocalBoxFuture<'static, Result<(), String>>;
}

#[cfg_attr(test, mockall::automock)]
pub trait Clock {
    fn now_millis(&self) -> u64;
}

#[cfg_attr(test, mockall::automock)]
pub trait Console {
    fn log(&self, message: &str);
}

/// Every adapter a [`RuntimeController`](crate::RuntimeController) needs.
pub struct Browser {
    pub dom: Box<dyn Dom>,
    pub patcher: Box<dyn crate::DomPatcher>,
    pub timers: Box<dyn Timers>,
    pub window: Box<dyn Window>,
    pub history: Box<dyn History>,
    pub location: Box<dyn Location>,
    pub local_storage: Box<dyn Storage>,
    pub session_storage: Box<dyn Storage>,
    pub clipboard: Box<dyn Clipboard>,
    pub clock: Box<dyn Clock>,
    pub console: Box<dyn Console>,
}
