//! The runtime controller that drives the update cycle.

use futures::future::LocalBoxFuture;
use futures::FutureExt;
use portable_atomic_util::{Arc, Weak};
use serde_json::Value;
use spin::Mutex;

use crate::browser::Browser;
use crate::effect::{CustomEffects, EffectDispatcher, EffectOutput};
use crate::emitter::Emitter;
use crate::msg::{EventSnapshot, HostMsg, PendingMsg, SubscriptionMsg};
use crate::patch::{PatchNode, SkipPolicy};
use crate::placeholder;
use crate::queue::{EnqueueOutcome, JobConfig, JobQueue, QueueStrategy};
use crate::subscription::{self, IntervalManager, ListenerManager};
use crate::{Error, Page, RuntimeConfig, Update};

/// A spawner trait for executing futures on an async runtime.
///
/// Asynchronous effects (clipboard writes) are handed to the spawner. While
/// the effect of an effectful message is pending, the job queue is suspended:
/// messages submitted meanwhile run only after that message was delivered. In the
/// browser this is typically `wasm_bindgen_futures::spawn_local`.
///
/// Function pointers and closures automatically implement this trait via the blanket implementation.
pub trait Spawner {
    /// Spawn a future on the async runtime.
    fn spawn(&self, future: LocalBoxFuture<'static, ()>);
}

/// Implement Spawner for any callable type that matches the signature.
///
/// This includes function pointers, closures, and function items.
impl<F> Spawner for F
where
    F: Fn(LocalBoxFuture<'static, ()>),
{
    fn spawn(&self, future: LocalBoxFuture<'static, ()>) {
        self(future)
    }
}

/// Lifecycle of a [`RuntimeController`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Uninitialized,
    /// The initial markup has been patched in; bindings are being installed.
    Rendered,
    Idle,
    Updating,
}

struct State<Model> {
    model: Model,
    phase: Phase,
}

struct Bindings {
    listeners: ListenerManager,
    intervals: IntervalManager,
}

struct Inner<P: Page> {
    page: P,
    browser: Browser,
    spawner: Box<dyn Spawner>,
    skip: SkipPolicy,
    queue: JobQueue,
    custom: CustomEffects,
    state: Mutex<State<P::Model>>,
    bindings: Mutex<Bindings>,
}

/// Resets the phase to idle when an update finishes, including by panic.
struct UpdatingGuard<'a, Model>(&'a Mutex<State<Model>>);

impl<Model> Drop for UpdatingGuard<'_, Model> {
    fn drop(&mut self) {
        self.0.lock().phase = Phase::Idle;
    }
}

/// A mounted [`Page`].
///
/// The controller owns the model, the job queue and the active bindings.
/// Every message, whether it comes from a listener, a timer, an effect or the
/// host, becomes a job; jobs run one at a time, each performing a full
/// resolve → update → render → patch → reconcile cycle before the next starts.
///
/// Dropping the controller detaches every listener and timer it installed.
///
/// ```rust
/// use oxide_mvu_dom::testing::FakeBrowser;
/// use oxide_mvu_dom::{create_test_spawner, Page, RuntimeConfig, RuntimeController, Subscription, Update};
/// use serde::Deserialize;
/// use serde_json::json;
///
/// #[derive(Deserialize)]
/// #[serde(tag = "type")]
/// enum Msg { Increment }
///
/// struct Counter;
///
/// impl Page for Counter {
///     type Model = i32;
///     type Msg = Msg;
///     fn id(&self) -> String { "app".to_string() }
///     fn init(&self) -> Update<i32> { Update::model(0) }
///     fn update(&self, msg: Msg, count: &i32) -> Update<i32> {
///         match msg { Msg::Increment => Update::model(count + 1) }
///     }
///     fn view_body(&self, count: &i32) -> String { format!("<p>{count}</p>") }
///     fn subscriptions(&self, _: &i32) -> Vec<Subscription> { Vec::new() }
/// }
///
/// let fake = FakeBrowser::new().with_element("app", None);
/// let runtime = RuntimeController::mount(Counter, fake.browser(), create_test_spawner(), RuntimeConfig::default()).unwrap();
///
/// runtime.send(json!({ "type": "Increment" }), None);
///
/// assert_eq!(runtime.model(), 1);
/// assert_eq!(fake.last_markup().as_deref(), Some("<p>1</p>"));
/// ```
pub struct RuntimeController<P: Page + 'static> {
    inner: Arc<Inner<P>>,
}

impl<P: Page + 'static> RuntimeController<P> {
    /// Mount `page` into the element named by [`Page::id`], render the initial
    /// model and install its bindings.
    ///
    /// Fails with [`Error::MountNotFound`] if the mount element is absent.
    pub fn mount(
        page: P,
        browser: Browser,
        spawner: impl Spawner + 'static,
        config: RuntimeConfig,
    ) -> Result<Self, Error> {
        let root = page.id();
        if !browser.dom.has_element(&root) {
            tracing::error!(id = %root, "could not find mount element");
            return Err(Error::MountNotFound(root));
        }

        let init = page.init();

        let inner = Arc::new(Inner {
            skip: SkipPolicy::new(&config),
            queue: JobQueue::new(config.queue_capacity),
            custom: CustomEffects::new(config.custom_effects.clone()),
            state: Mutex::new(State {
                model: init.model.clone(),
                phase: Phase::Uninitialized,
            }),
            bindings: Mutex::new(Bindings {
                listeners: ListenerManager::new(config.reconcile),
                intervals: IntervalManager::new(config.reconcile, config.min_interval_ms),
            }),
            page,
            browser,
            spawner: Box::new(spawner),
        });

        // The initial render runs as a job so messages queued by its effects
        // wait for it to finish.
        let weak = Arc::downgrade(&inner);
        inner.queue.enqueue(
            "init",
            QueueStrategy::Fifo,
            Box::new(move || {
                let inner = weak.upgrade().ok_or(Error::RuntimeDropped)?;
                Inner::render(&inner, init, Phase::Rendered);
                Ok(())
            }),
        );

        tracing::debug!(id = %root, "mounted page");

        Ok(Self { inner })
    }

    /// Submit a message from host code. `job` defaults to an anonymous FIFO
    /// job.
    pub fn send(&self, msg: impl Into<SubscriptionMsg>, job: Option<JobConfig>) -> EnqueueOutcome {
        Inner::submit(
            &self.inner,
            PendingMsg::Subscription {
                msg: msg.into(),
                source: None,
            },
            job.unwrap_or_default(),
        )
    }

    /// Submit a message outside the page's typed catalogue, delivered to
    /// [`Page::update_from_host`].
    pub fn send_message(&self, kind: impl Into<String>, data: Value) -> EnqueueOutcome {
        let msg = HostMsg {
            kind: kind.into(),
            data,
        };
        Inner::submit(&self.inner, PendingMsg::Host(msg), JobConfig::default())
    }

    /// Register the handler for `custom` effects, flushing any backlog to it.
    pub fn set_custom_effect_handler(&self, handler: impl Fn(&Value) + 'static) {
        self.inner.custom.set_handler(handler);
    }

    pub fn model(&self) -> P::Model {
        self.inner.state.lock().model.clone()
    }

    pub fn phase(&self) -> Phase {
        self.inner.state.lock().phase
    }

    pub fn active_listener_ids(&self) -> Vec<String> {
        self.inner.bindings.lock().listeners.active_ids()
    }

    pub fn active_interval_ids(&self) -> Vec<String> {
        self.inner.bindings.lock().intervals.active_ids()
    }

    /// Detach every listener and timer. A later update installs whatever its
    /// model declares again.
    pub fn teardown(&self) {
        let mut bindings = self.inner.bindings.lock();
        let listeners = bindings.listeners.clear();
        let intervals = bindings.intervals.clear();
        tracing::debug!(
            listeners = listeners.removed.len(),
            intervals = intervals.removed.len(),
            "tore down bindings"
        );
    }
}

impl<P: Page + 'static> Drop for RuntimeController<P> {
    fn drop(&mut self) {
        self.teardown();
    }
}

impl<P: Page + 'static> Inner<P> {
    /// An emitter that reaches this controller for as long as it lives.
    fn emitter(inner: &Arc<Self>) -> Emitter {
        let weak = Arc::downgrade(inner);
        Emitter::new(move |msg, job| match weak.upgrade() {
            Some(inner) => Inner::submit(&inner, msg, job),
            None => {
                tracing::debug!(key = %job.id, "runtime was dropped, discarding message");
                EnqueueOutcome::Dropped
            }
        })
    }

    fn submit(inner: &Arc<Self>, msg: PendingMsg, job: JobConfig) -> EnqueueOutcome {
        let weak: Weak<Self> = Arc::downgrade(inner);
        let key = job.id.clone();
        let strategy = job.strategy;

        inner.queue.enqueue(
            key,
            strategy,
            Box::new(move || {
                let inner = weak.upgrade().ok_or(Error::RuntimeDropped)?;
                Inner::process(&inner, msg, job)
            }),
        )
    }

    fn process(inner: &Arc<Self>, msg: PendingMsg, job: JobConfig) -> Result<(), Error> {
        if msg.is_empty() {
            tracing::trace!(key = %job.id, "ignoring empty message");
            return Ok(());
        }

        match msg {
            PendingMsg::Host(msg) => {
                tracing::debug!(kind = %msg.kind, "updating from host message");
                Inner::update(inner, |page, model| page.update_from_host(msg, model));
                Ok(())
            }
            PendingMsg::Subscription { msg, source } => match Inner::resolve(inner, msg, source.as_ref())? {
                EffectOutput::Ready(value) => Inner::deliver(inner, value),
                EffectOutput::Pending(resolved) => {
                    // Later jobs wait until this message has been delivered.
                    tracing::trace!(key = %job.id, "waiting for asynchronous effect");
                    inner.queue.suspend(job.id.clone());

                    let weak = Arc::downgrade(inner);
                    inner.spawner.spawn(
                        async move {
                            let value = resolved.await;
                            let Some(inner) = weak.upgrade() else {
                                tracing::debug!(key = %job.id, "runtime was dropped, discarding message");
                                return;
                            };

                            let target = Arc::downgrade(&inner);
                            inner.queue.resume(Box::new(move || {
                                let inner = target.upgrade().ok_or(Error::RuntimeDropped)?;
                                Inner::deliver(&inner, value)
                            }));
                        }
                        .boxed_local(),
                    );
                    Ok(())
                }
            },
        }
    }

    /// Turn a message template into a value, running its captures and, for
    /// effectful messages, its effect.
    fn resolve(
        inner: &Arc<Self>,
        msg: SubscriptionMsg,
        source: Option<&EventSnapshot>,
    ) -> Result<EffectOutput, Error> {
        let dispatcher = EffectDispatcher::new(&inner.browser, &inner.custom).with_source(source);

        match msg {
            SubscriptionMsg::Pure(msg) => Ok(EffectOutput::Ready(placeholder::resolve_captures(msg, &dispatcher))),
            SubscriptionMsg::Effectful(effectful) => {
                let msg = placeholder::resolve_captures(effectful.msg, &dispatcher);
                Ok(match dispatcher.run(&effectful.effect)? {
                    EffectOutput::Ready(value) => EffectOutput::Ready(placeholder::insert_effect_value(msg, &value)),
                    EffectOutput::Pending(future) => EffectOutput::Pending(
                        future
                            .map(move |value| placeholder::insert_effect_value(msg, &value))
                            .boxed_local(),
                    ),
                })
            }
        }
    }

    fn deliver(inner: &Arc<Self>, value: Value) -> Result<(), Error> {
        if value.is_null() {
            tracing::trace!("ignoring null message");
            return Ok(());
        }

        let msg: P::Msg = serde_json::from_value(value.clone()).map_err(|err| {
            tracing::error!(msg = %value, %err, "failed to decode message");
            Error::Json(err)
        })?;

        tracing::debug!(msg = %value, "updating");
        Inner::update(inner, |page, model| page.update(msg, model));
        Ok(())
    }

    fn update(inner: &Arc<Self>, update: impl FnOnce(&P, &P::Model) -> Update<P::Model>) {
        let model = {
            let mut state = inner.state.lock();
            state.phase = Phase::Updating;
            state.model.clone()
        };
        let _idle = UpdatingGuard(&inner.state);

        let next = update(&inner.page, &model);
        Inner::render(inner, next, Phase::Updating);
    }

    /// Store the model, patch the DOM, reconcile bindings and run effects.
    fn render(inner: &Arc<Self>, update: Update<P::Model>, phase: Phase) {
        let Update { model, effects } = update;

        let markup = inner.page.view_body(&model);
        let subscriptions = inner.page.subscriptions(&model);
        {
            let mut state = inner.state.lock();
            state.model = model;
            state.phase = phase;
        }

        let root = inner.page.id();
        let skip = &inner.skip;
        inner
            .browser
            .patcher
            .patch(&root, &markup, &|from: &dyn PatchNode, to: &dyn PatchNode| skip.should_skip(from, to));

        let emitter = Inner::emitter(inner);
        let (listeners, intervals) = subscription::group(subscriptions);
        {
            let mut bindings = inner.bindings.lock();
            bindings
                .listeners
                .set_listeners(listeners, inner.browser.dom.as_ref(), &emitter);
            bindings
                .intervals
                .set_intervals(intervals, inner.browser.timers.as_ref(), &emitter);
        }

        if phase == Phase::Rendered {
            inner.state.lock().phase = Phase::Idle;
        }

        EffectDispatcher::new(&inner.browser, &inner.custom).handle(effects, &emitter, inner.spawner.as_ref());
    }
}

#[cfg(any(test, feature = "testing"))]
/// Test spawner function that executes futures synchronously.
///
/// This blocks on the future immediately rather than spawning it on an async runtime.
pub fn test_spawner_fn(fut: LocalBoxFuture<'static, ()>) {
    // Execute the future synchronously for deterministic testing
    futures::executor::block_on(fut);
}

#[cfg(any(test, feature = "testing"))]
/// Creates a test spawner that executes futures synchronously.
///
/// Returns a function pointer that can be passed directly to
/// [`RuntimeController::mount`].
pub fn create_test_spawner() -> fn(LocalBoxFuture<'static, ()>) {
    test_spawner_fn
}
