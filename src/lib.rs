//! A browser-side Model-View-Update (MVU) runtime.
//!
//! A pure [`Page`] describes the application: its model, how messages update
//! it, how it renders to markup and which listeners, timers and effects it
//! needs. The [`RuntimeController`] drives it: every browser event, timer tick
//! or host message becomes a job in a serialized queue, and each job runs one
//! full update cycle (resolve captured values, update, render, patch the DOM,
//! reconcile bindings, dispatch effects) before the next begins.
//!
//! Messages and effects are plain JSON-shaped tagged unions (`{"type", "config"}`),
//! so a page's declarations can be produced by Rust code or by any core that
//! speaks JSON.
//!
//! ## Example
//!
//! ```rust
//! use oxide_mvu_dom::testing::{FakeBrowser, FakeEvent};
//! use oxide_mvu_dom::{
//!     create_test_spawner, EventListener, ListenTarget, Page, RuntimeConfig, RuntimeController,
//!     Subscription, Update,
//! };
//! use serde::Deserialize;
//! use serde_json::json;
//!
//! #[derive(Deserialize)]
//! #[serde(tag = "type")]
//! enum Msg { AccumulateClicked }
//!
//! #[derive(Clone)]
//! struct Model { count: i32 }
//!
//! struct MyPage;
//!
//! impl Page for MyPage {
//!     type Model = Model;
//!     type Msg = Msg;
//!
//!     fn id(&self) -> String { "app".to_string() }
//!
//!     fn init(&self) -> Update<Model> {
//!         Update::model(Model { count: 0 })
//!     }
//!
//!     fn update(&self, msg: Msg, model: &Model) -> Update<Model> {
//!         match msg {
//!             Msg::AccumulateClicked => Update::model(Model { count: model.count + 1 }),
//!         }
//!     }
//!
//!     fn view_body(&self, model: &Model) -> String {
//!         format!(r#"<button id="accumulate">{}</button>"#, model.count)
//!     }
//!
//!     fn subscriptions(&self, _model: &Model) -> Vec<Subscription> {
//!         vec![Subscription::EventListener(
//!             EventListener::new("accumulate", "click", json!({ "type": "AccumulateClicked" }))
//!                 .on("#accumulate"),
//!         )]
//!     }
//! }
//!
//! let fake = FakeBrowser::new().with_element("app", None);
//! let runtime = RuntimeController::mount(
//!     MyPage,
//!     fake.browser(),
//!     create_test_spawner(),
//!     RuntimeConfig::default(),
//! ).unwrap();
//!
//! fake.fire(ListenTarget::Document, "click", &FakeEvent::click().on("#accumulate"));
//!
//! assert_eq!(runtime.model().count, 1);
//! ```

// Module declarations
pub mod browser;
mod config;
mod effect;
mod emitter;
mod error;
mod json;
mod msg;
mod page;
mod patch;
pub mod placeholder;
mod queue;
mod runtime;
mod subscription;
mod time;

// Test utilities (only available with 'testing' feature or during tests)
#[cfg(any(test, feature = "testing"))]
pub mod testing;

// Public re-exports
pub use browser::{AbortHandle, Browser, ListenTarget};
pub use config::{CustomEffectConfig, ReconcileMode, RuntimeConfig};
pub use effect::{
    ClipboardEffect, ClipboardOutcome, ConsoleEffect, CustomEffects, DispatchEvent, DomEffect, Effect, EffectDispatcher,
    EffectOutput, ElementId, GetElementValue, GetRadioGroupValue, GetTargetDataValue, NavigationEffect, StorageEffect,
    TimeEffect,
};
pub use error::{Error, StorageError};
pub use msg::{EffectfulMsg, EventSnapshot, HostMsg, QueuedMsg, SubscriptionMsg, UnknownTag};
pub use page::{Page, Update};
pub use patch::{DomPatcher, PatchNode, SkipPolicy};
pub use queue::{EnqueueOutcome, JobAction, JobConfig, JobQueue, QueueStrategy};
pub use runtime::{Phase, RuntimeController, Spawner};
pub use subscription::{
    ActiveBinding, Binding, Delta, EventListener, EventMatcher, EventPropagation, Interval, IntervalManager,
    KeyboardCombo, KeyboardComboMatcher, KeyboardKeyMatcher, ListenerManager, MouseButton, MouseButtonMatcher,
    Reconciler, SelectorMatcher, Subscription,
};
pub use time::Posix;

#[cfg(any(test, feature = "testing"))]
pub use runtime::create_test_spawner;
