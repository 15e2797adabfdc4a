//! In-memory browser for tests.
//!
//! Only available with the `testing` feature or during tests.
//!
//! [`FakeBrowser`] implements every adapter trait over one shared state, so a
//! test can hand [`FakeBrowser::browser`] to a
//! [`RuntimeController`](crate::RuntimeController), keep the `FakeBrowser`
//! itself, fire events and timers through it and inspect what the runtime did.

use core::cell::Cell;
use std::collections::BTreeMap;

use futures::future::{self, LocalBoxFuture};
use futures::FutureExt;
use portable_atomic_util::Arc;
use spin::Mutex;

use crate::browser::{
    AbortHandle, Browser, Clipboard, Clock, Console, Dom, DomEvent, EventDetail, EventHandler, FileInfo, History,
    KeyboardDetail, ListenTarget, ListenerOptions, Location, Storage, SyntheticEvent, TimerCallback, Timers, Window,
    WindowSize,
};
use crate::{DomPatcher, PatchNode, StorageError};

/// One call to [`DomPatcher::patch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patch {
    pub root_id: String,
    pub markup: String,
    /// The skip decision for the node pair set with
    /// [`FakeBrowser::set_skip_pair`], if any.
    pub skipped: Option<bool>,
}

/// A node handed to the patcher's skip callback.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FakeNode {
    pub name: String,
    pub attributes: Vec<String>,
    pub value: Option<String>,
    pub active: bool,
}

impl PatchNode for FakeNode {
    fn node_name(&self) -> String {
        self.name.clone()
    }

    fn has_attribute(&self, name: &str) -> bool {
        self.attributes.iter().any(|attribute| attribute == name)
    }

    fn value(&self) -> Option<String> {
        self.value.clone()
    }

    fn is_active(&self) -> bool {
        self.active
    }
}

struct ListenerEntry {
    key: u64,
    target: ListenTarget,
    event_type: String,
    options: ListenerOptions,
    handler: Arc<EventHandler>,
}

struct IntervalEntry {
    key: u64,
    duration: u32,
    tick: Arc<TimerCallback>,
}

#[derive(Default)]
struct FakeState {
    next_key: u64,
    elements: BTreeMap<String, Option<String>>,
    checked: BTreeMap<String, String>,
    files: BTreeMap<String, Vec<FileInfo>>,
    focused: Vec<String>,
    selected: Vec<String>,
    dispatched: Vec<(ListenTarget, SyntheticEvent)>,
    listeners: Vec<ListenerEntry>,
    intervals: Vec<IntervalEntry>,
    patches: Vec<Patch>,
    skip_pair: Option<(FakeNode, FakeNode)>,
    window: WindowSize,
    history: Vec<String>,
    location: Option<String>,
    local: BTreeMap<String, String>,
    session: BTreeMap<String, String>,
    storage_error: Option<StorageError>,
    clipboard: Vec<String>,
    clipboard_denial: Option<String>,
    now: u64,
    console: Vec<String>,
}

impl FakeState {
    fn key(&mut self) -> u64 {
        self.next_key += 1;
        self.next_key
    }
}

#[derive(Clone)]
pub struct FakeBrowser {
    state: Arc<Mutex<FakeState>>,
}

impl Default for FakeBrowser {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeBrowser {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(FakeState::default())),
        }
    }

    pub fn with_element(self, id: &str, value: Option<&str>) -> Self {
        self.set_element(id, value);
        self
    }

    /// Create or replace the element with `id`.
    pub fn set_element(&self, id: &str, value: Option<&str>) {
        self.state
            .lock()
            .elements
            .insert(id.to_string(), value.map(str::to_string));
    }

    pub fn remove_element(&self, id: &str) {
        self.state.lock().elements.remove(id);
    }

    /// Mark `value` as the checked input among those matching `selector`.
    pub fn set_checked(&self, selector: &str, value: &str) {
        self.state
            .lock()
            .checked
            .insert(selector.to_string(), value.to_string());
    }

    pub fn set_files(&self, id: &str, files: Vec<FileInfo>) {
        self.state.lock().files.insert(id.to_string(), files);
    }

    pub fn set_window_size(&self, size: WindowSize) {
        self.state.lock().window = size;
    }

    pub fn set_now(&self, millis: u64) {
        self.state.lock().now = millis;
    }

    /// Make clipboard writes fail with `reason`.
    pub fn deny_clipboard(&self, reason: &str) {
        self.state.lock().clipboard_denial = Some(reason.to_string());
    }

    /// Make storage writes fail with `error`.
    pub fn fail_storage_writes(&self, error: StorageError) {
        self.state.lock().storage_error = Some(error);
    }

    /// Ask the patcher to evaluate its skip callback on `from`/`to` on every
    /// patch, recording the answer in [`Patch::skipped`].
    pub fn set_skip_pair(&self, from: FakeNode, to: FakeNode) {
        self.state.lock().skip_pair = Some((from, to));
    }

    /// Adapters backed by this fake.
    pub fn browser(&self) -> Browser {
        Browser {
            dom: Box::new(self.clone()),
            patcher: Box::new(self.clone()),
            timers: Box::new(self.clone()),
            window: Box::new(self.clone()),
            history: Box::new(self.clone()),
            location: Box::new(self.clone()),
            local_storage: Box::new(FakeStorage {
                state: self.state.clone(),
                session: false,
            }),
            session_storage: Box::new(FakeStorage {
                state: self.state.clone(),
                session: true,
            }),
            clipboard: Box::new(self.clone()),
            clock: Box::new(self.clone()),
            console: Box::new(self.clone()),
        }
    }

    /// Deliver `event` to every listener on `target` for `event_type`.
    /// Returns how many listeners were invoked.
    pub fn fire(&self, target: ListenTarget, event_type: &str, event: &FakeEvent) -> usize {
        let event: &dyn DomEvent = event;
        let handlers: Vec<_> = self
            .state
            .lock()
            .listeners
            .iter()
            .filter(|entry| entry.target == target && entry.event_type == event_type)
            .map(|entry| entry.handler.clone())
            .collect();

        for handler in &handlers {
            (**handler)(event);
        }
        handlers.len()
    }

    /// Fire every running interval once.
    pub fn tick_intervals(&self) {
        let ticks: Vec<_> = self
            .state
            .lock()
            .intervals
            .iter()
            .map(|entry| entry.tick.clone())
            .collect();

        for tick in &ticks {
            (**tick)();
        }
    }

    pub fn listeners(&self) -> Vec<(ListenTarget, String, ListenerOptions)> {
        self.state
            .lock()
            .listeners
            .iter()
            .map(|entry| (entry.target, entry.event_type.clone(), entry.options))
            .collect()
    }

    /// Durations of the running intervals.
    pub fn intervals(&self) -> Vec<u32> {
        self.state
            .lock()
            .intervals
            .iter()
            .map(|entry| entry.duration)
            .collect()
    }

    pub fn patches(&self) -> Vec<Patch> {
        self.state.lock().patches.clone()
    }

    pub fn last_markup(&self) -> Option<String> {
        self.state
            .lock()
            .patches
            .last()
            .map(|patch| patch.markup.clone())
    }

    pub fn focused(&self) -> Vec<String> {
        self.state.lock().focused.clone()
    }

    pub fn selected(&self) -> Vec<String> {
        self.state.lock().selected.clone()
    }

    pub fn dispatched(&self) -> Vec<(ListenTarget, SyntheticEvent)> {
        self.state.lock().dispatched.clone()
    }

    /// The history stack, oldest first.
    pub fn history(&self) -> Vec<String> {
        self.state.lock().history.clone()
    }

    pub fn location(&self) -> Option<String> {
        self.state.lock().location.clone()
    }

    pub fn local_item(&self, key: &str) -> Option<String> {
        self.state.lock().local.get(key).cloned()
    }

    pub fn session_item(&self, key: &str) -> Option<String> {
        self.state.lock().session.get(key).cloned()
    }

    pub fn set_local_item(&self, key: &str, raw: &str) {
        self.state
            .lock()
            .local
            .insert(key.to_string(), raw.to_string());
    }

    /// Text successfully written to the clipboard, in order.
    pub fn clipboard(&self) -> Vec<String> {
        self.state.lock().clipboard.clone()
    }

    pub fn console(&self) -> Vec<String> {
        self.state.lock().console.clone()
    }
}

impl Dom for FakeBrowser {
    fn has_element(&self, id: &str) -> bool {
        self.state.lock().elements.contains_key(id)
    }

    fn element_value(&self, id: &str) -> Option<String> {
        self.state.lock().elements.get(id).cloned().flatten()
    }

    fn checked_value(&self, selector: &str) -> Option<String> {
        self.state.lock().checked.get(selector).cloned()
    }

    fn files(&self, id: &str) -> Option<Vec<FileInfo>> {
        self.state.lock().files.get(id).cloned()
    }

    fn focus(&self, id: &str) {
        self.state.lock().focused.push(id.to_string());
    }

    fn select_text(&self, id: &str) {
        let mut state = self.state.lock();
        state.focused.push(id.to_string());
        state.selected.push(id.to_string());
    }

    fn dispatch_event(&self, target: ListenTarget, event: &SyntheticEvent) {
        self.state.lock().dispatched.push((target, event.clone()));
    }

    fn add_event_listener(
        &self,
        target: ListenTarget,
        event_type: &str,
        options: ListenerOptions,
        handler: EventHandler,
    ) -> AbortHandle {
        let key = {
            let mut state = self.state.lock();
            let key = state.key();
            state.listeners.push(ListenerEntry {
                key,
                target,
                event_type: event_type.to_string(),
                options,
                handler: Arc::new(handler),
            });
            key
        };

        let state = self.state.clone();
        AbortHandle::new(move || state.lock().listeners.retain(|entry| entry.key != key))
    }
}

impl Timers for FakeBrowser {
    fn set_interval(&self, duration_ms: u32, tick: TimerCallback) -> AbortHandle {
        let key = {
            let mut state = self.state.lock();
            let key = state.key();
            state.intervals.push(IntervalEntry {
                key,
                duration: duration_ms,
                tick: Arc::new(tick),
            });
            key
        };

        let state = self.state.clone();
        AbortHandle::new(move || state.lock().intervals.retain(|entry| entry.key != key))
    }
}

impl DomPatcher for FakeBrowser {
    fn patch(&self, root_id: &str, markup: &str, skip: &dyn Fn(&dyn PatchNode, &dyn PatchNode) -> bool) {
        let pair = self.state.lock().skip_pair.clone();
        let skipped = pair.map(|(from, to)| skip(&from as &dyn PatchNode, &to as &dyn PatchNode));

        self.state.lock().patches.push(Patch {
            root_id: root_id.to_string(),
            markup: markup.to_string(),
            skipped,
        });
    }
}

impl Window for FakeBrowser {
    fn size(&self) -> WindowSize {
        self.state.lock().window
    }
}

impl History for FakeBrowser {
    fn push_url(&self, url: &str) {
        self.state.lock().history.push(url.to_string());
    }

    fn replace_url(&self, url: &str) {
        let mut state = self.state.lock();
        state.history.pop();
        state.history.push(url.to_string());
    }
}

impl Location for FakeBrowser {
    fn assign(&self, url: &str) {
        self.state.lock().location = Some(url.to_string());
    }
}

impl Clipboard for FakeBrowser {
    fn write_text(&self, text: &str) -> LocalBoxFuture<'static, Result<(), String>> {
        let mut state = self.state.lock();
        let result = match &state.clipboard_denial {
            Some(reason) => Err(reason.clone()),
            None => {
                state.clipboard.push(text.to_string());
                Ok(())
            }
        };
        future::ready(result).boxed_local()
    }
}

impl Clock for FakeBrowser {
    fn now_millis(&self) -> u64 {
        self.state.lock().now
    }
}

impl Console for FakeBrowser {
    fn log(&self, message: &str) {
        self.state.lock().console.push(message.to_string());
    }
}

struct FakeStorage {
    state: Arc<Mutex<FakeState>>,
    session: bool,
}

impl Storage for FakeStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        let state = self.state.lock();
        let area = if self.session { &state.session } else { &state.local };
        area.get(key).cloned()
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut state = self.state.lock();
        if let Some(err) = &state.storage_error {
            return Err(err.clone());
        }

        let area = if self.session {
            &mut state.session
        } else {
            &mut state.local
        };
        area.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// A DOM event built for [`FakeBrowser::fire`].
///
/// Selectors are compared literally: `on("#go")` makes the target match
/// exactly the selector `"#go"`.
pub struct FakeEvent {
    detail: EventDetail,
    target: Vec<String>,
    ancestors: Vec<String>,
    attributes: BTreeMap<String, String>,
    prevented: Cell<bool>,
    stopped: Cell<bool>,
}

impl FakeEvent {
    fn new(detail: EventDetail) -> Self {
        Self {
            detail,
            target: Vec::new(),
            ancestors: Vec::new(),
            attributes: BTreeMap::new(),
            prevented: Cell::new(false),
            stopped: Cell::new(false),
        }
    }

    /// A primary-button click.
    pub fn click() -> Self {
        Self::mouse(0)
    }

    pub fn mouse(button: i16) -> Self {
        Self::new(EventDetail::Mouse { button })
    }

    pub fn keyboard(detail: KeyboardDetail) -> Self {
        Self::new(EventDetail::Keyboard(detail))
    }

    /// An event that is neither a keyboard nor a mouse event.
    pub fn other() -> Self {
        Self::new(EventDetail::Other)
    }

    /// The target matches `selector`.
    pub fn on(mut self, selector: &str) -> Self {
        self.target.push(selector.to_string());
        self
    }

    /// An ancestor of the target matches `selector`.
    pub fn inside(mut self, selector: &str) -> Self {
        self.ancestors.push(selector.to_string());
        self
    }

    /// The closest element carries `data-<name>="<value>"`.
    pub fn with_data(mut self, name: &str, value: &str) -> Self {
        self.attributes.insert(format!("data-{name}"), value.to_string());
        self
    }

    pub fn is_default_prevented(&self) -> bool {
        self.prevented.get()
    }

    pub fn is_propagation_stopped(&self) -> bool {
        self.stopped.get()
    }
}

impl DomEvent for FakeEvent {
    fn detail(&self) -> EventDetail {
        self.detail.clone()
    }

    fn target_matches(&self, selector: &str) -> bool {
        self.target.iter().any(|candidate| candidate == selector)
    }

    fn target_closest(&self, selector: &str) -> bool {
        self.target_matches(selector) || self.ancestors.iter().any(|candidate| candidate == selector)
    }

    fn closest_attribute(&self, attribute: &str) -> Option<String> {
        self.attributes.get(attribute).cloned()
    }

    fn prevent_default(&self) {
        self.prevented.set(true);
    }

    fn stop_propagation(&self) {
        self.stopped.set(true);
    }
}

/// Run `f` under a subscriber that records every event, returning the
/// formatted output.
#[cfg(test)]
pub(crate) fn capture_logs(f: impl FnOnce()) -> String {
    #[derive(Clone)]
    struct Buffer(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for Buffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    let buffer = Buffer(Arc::new(Mutex::new(Vec::new())));
    let writer = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::TRACE)
        .finish();

    tracing::subscriber::with_default(subscriber, f);

    let output = buffer.0.lock().clone();
    String::from_utf8_lossy(&output).into_owned()
}
