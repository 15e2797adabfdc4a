mod simple_page;

use std::cell::RefCell;
use std::rc::Rc;

use futures::future::LocalBoxFuture;
use oxide_mvu_dom::testing::FakeBrowser;
use oxide_mvu_dom::{create_test_spawner, Effect, RuntimeConfig, RuntimeController, Spawner};
pub(crate) use simple_page::*;

mod effect_dispatch_tests;
mod reduction_and_emission_tests;

pub(crate) type TestRuntime = RuntimeController<TestPage>;

pub(crate) fn given_initial_effects(effects: Vec<Effect>) -> (TestRuntime, FakeBrowser) {
    create_runtime_and_browser(TestCreationParameters {
        initial_effects: effects,
        on_increment_effects: Vec::new(),
        config: RuntimeConfig::default(),
        browser: given_a_mount_element(),
    })
}

pub(crate) fn given_no_initial_effects() -> (TestRuntime, FakeBrowser) {
    given_initial_effects(Vec::new())
}

// Init returns no effects
pub(crate) fn given_on_increment_effects(effects: Vec<Effect>) -> (TestRuntime, FakeBrowser) {
    create_runtime_and_browser(TestCreationParameters {
        initial_effects: Vec::new(),
        on_increment_effects: effects,
        config: RuntimeConfig::default(),
        browser: given_a_mount_element(),
    })
}

pub(crate) fn given_a_config(config: RuntimeConfig, on_increment_effects: Vec<Effect>) -> (TestRuntime, FakeBrowser) {
    create_runtime_and_browser(TestCreationParameters {
        initial_effects: Vec::new(),
        on_increment_effects,
        config,
        browser: given_a_mount_element(),
    })
}

/// Mount into a browser the caller has already prepared.
pub(crate) fn given_a_browser(browser: FakeBrowser, initial_effects: Vec<Effect>) -> TestRuntime {
    let (runtime, _) = create_runtime_and_browser(TestCreationParameters {
        initial_effects,
        on_increment_effects: Vec::new(),
        config: RuntimeConfig::default(),
        browser,
    });
    runtime
}

/// Mount with a spawner that holds futures until [`DeferredTasks::run_all`].
pub(crate) fn given_deferred_tasks() -> (TestRuntime, FakeBrowser, DeferredTasks) {
    let tasks = DeferredTasks::default();
    let (runtime, browser) = create_runtime_with_spawner(
        TestCreationParameters {
            initial_effects: Vec::new(),
            on_increment_effects: Vec::new(),
            config: RuntimeConfig::default(),
            browser: given_a_mount_element(),
        },
        tasks.spawner(),
    );
    (runtime, browser, tasks)
}

#[derive(Clone, Default)]
pub(crate) struct DeferredTasks(Rc<RefCell<Vec<LocalBoxFuture<'static, ()>>>>);

impl DeferredTasks {
    fn spawner(&self) -> impl Fn(LocalBoxFuture<'static, ()>) + 'static {
        let tasks = self.0.clone();
        move |future| tasks.borrow_mut().push(future)
    }

    /// Run every held future to completion. Returns how many ran.
    pub(crate) fn run_all(&self) -> usize {
        let tasks: Vec<_> = self.0.borrow_mut().drain(..).collect();
        let count = tasks.len();
        for task in tasks {
            futures::executor::block_on(task);
        }
        count
    }
}

pub(crate) fn given_a_mount_element() -> FakeBrowser {
    FakeBrowser::new().with_element("app", None)
}

struct TestCreationParameters {
    initial_effects: Vec<Effect>,
    on_increment_effects: Vec<Effect>,
    config: RuntimeConfig,
    browser: FakeBrowser,
}

fn create_runtime_and_browser(params: TestCreationParameters) -> (TestRuntime, FakeBrowser) {
    create_runtime_with_spawner(params, create_test_spawner())
}

fn create_runtime_with_spawner(
    params: TestCreationParameters,
    spawner: impl Spawner + 'static,
) -> (TestRuntime, FakeBrowser) {
    let TestCreationParameters {
        initial_effects,
        on_increment_effects,
        config,
        browser,
    } = params;

    let mut mock_initial_effects = MockInitialEffectsDependency::new();
    mock_initial_effects
        .expect_on_init()
        .return_once(move || initial_effects);

    let mut mock_effects = MockEffectsDependency::new();
    mock_effects
        .expect_on_increment_effects()
        .returning(move |_| on_increment_effects.clone());

    let page = TestPage {
        initial_effects: Box::new(mock_initial_effects),
        effects: Box::new(mock_effects),
    };

    let runtime = RuntimeController::mount(page, browser.browser(), spawner, config)
        .expect("mount element exists");

    (runtime, browser)
}
