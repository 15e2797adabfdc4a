use oxide_mvu_dom::testing::FakeEvent;
use oxide_mvu_dom::{
    Effect, EnqueueOutcome, JobConfig, ListenTarget, Phase, QueueStrategy, QueuedMsg, RuntimeConfig,
};
use serde_json::{json, Value};

use crate::{given_a_config, given_no_initial_effects, given_on_increment_effects};

fn noted(strategy: QueueStrategy) -> Effect {
    Effect::Msg(QueuedMsg {
        msg: json!({ "type": "Noted" }).into(),
        queue: JobConfig::new("note", strategy),
    })
}

#[test]
fn mounting_renders_the_initial_model_and_installs_bindings() {
    let (runtime, browser) = given_no_initial_effects();

    assert_eq!(runtime.phase(), Phase::Idle);
    assert_eq!(browser.patches().len(), 1);
    assert_eq!(browser.patches()[0].root_id, "app");
    assert_eq!(runtime.active_listener_ids(), vec!["increment", "rename", "copy"]);
    assert_eq!(runtime.active_interval_ids(), vec!["tick"]);
    assert_eq!(browser.intervals(), vec![1000]);
}

#[test]
fn click_runs_exactly_one_update_and_one_patch() {
    let (runtime, browser) = given_no_initial_effects();

    let invoked = browser.fire(ListenTarget::Document, "click", &FakeEvent::click().on("#increment"));

    assert_eq!(invoked, 2);
    assert_eq!(runtime.model().count, 1);
    assert_eq!(browser.patches().len(), 2);
    assert!(browser.last_markup().unwrap().contains(r#"<button id="increment">1</button>"#));
}

#[test]
fn clicks_elsewhere_are_ignored() {
    let (runtime, browser) = given_no_initial_effects();

    browser.fire(ListenTarget::Document, "click", &FakeEvent::click().on("#nothing"));

    assert_eq!(runtime.model().count, 0);
    assert_eq!(browser.patches().len(), 1);
}

#[test]
fn interval_ticks_reach_the_page_until_it_stops_declaring_them() {
    let (runtime, browser) = given_no_initial_effects();

    browser.tick_intervals();
    browser.tick_intervals();
    assert_eq!(runtime.model().ticks, 2);

    runtime.send(json!({ "type": "StopTicking" }), None);
    browser.tick_intervals();

    assert_eq!(runtime.model().ticks, 2);
    assert!(browser.intervals().is_empty());
    assert!(runtime.active_interval_ids().is_empty());
}

#[test]
fn reconciling_an_unchanged_set_installs_nothing_new() {
    let (runtime, browser) = given_no_initial_effects();
    let before = browser.listeners();

    runtime.send(json!({ "type": "Increment" }), None);

    assert_eq!(browser.listeners(), before);
    assert_eq!(browser.intervals(), vec![1000]);
}

#[test]
fn host_messages_reach_update_from_host() {
    let (runtime, browser) = given_no_initial_effects();

    let outcome = runtime.send_message("setCount", json!(5));

    assert_eq!(outcome, EnqueueOutcome::Queued { coalesced: 0 });
    assert_eq!(runtime.model().count, 5);
    assert!(browser.last_markup().unwrap().contains(r#"<button id="increment">5</button>"#));
}

#[test]
fn null_messages_are_ignored() {
    let (runtime, browser) = given_no_initial_effects();

    runtime.send(Value::Null, None);

    assert_eq!(runtime.model().count, 0);
    assert_eq!(browser.patches().len(), 1);
}

#[test]
fn queued_messages_run_after_the_update_that_queued_them() {
    let (runtime, _browser) = given_on_increment_effects(vec![noted(QueueStrategy::Fifo)]);

    runtime.send(json!({ "type": "Increment" }), None);
    runtime.send(json!({ "type": "Increment" }), None);

    assert_eq!(runtime.model().notes, vec![1, 2]);
}

#[test]
fn fifo_messages_with_the_same_key_all_run() {
    let (runtime, _browser) = given_on_increment_effects(vec![noted(QueueStrategy::Fifo), noted(QueueStrategy::Fifo)]);

    runtime.send(json!({ "type": "Increment" }), None);

    assert_eq!(runtime.model().notes, vec![1, 1]);
}

#[test]
fn drop_older_keeps_only_the_latest_pending_message() {
    let (runtime, _browser) = given_on_increment_effects(vec![
        noted(QueueStrategy::DropOlder),
        noted(QueueStrategy::DropOlder),
        noted(QueueStrategy::DropOlder),
    ]);

    runtime.send(json!({ "type": "Increment" }), None);

    assert_eq!(runtime.model().notes, vec![1]);
}

#[test]
fn a_full_queue_sheds_new_jobs() {
    let config = RuntimeConfig {
        queue_capacity: 2,
        ..RuntimeConfig::default()
    };
    let (runtime, _browser) = given_a_config(
        config,
        vec![
            noted(QueueStrategy::Fifo),
            noted(QueueStrategy::Fifo),
            noted(QueueStrategy::Fifo),
        ],
    );

    runtime.send(json!({ "type": "Increment" }), None);

    assert_eq!(runtime.model().count, 1);
    assert_eq!(runtime.model().notes, vec![1, 1]);
}

#[test]
fn explicit_job_config_is_honoured_for_host_sends() {
    let (runtime, _browser) = given_no_initial_effects();

    let outcome = runtime.send(
        json!({ "type": "Increment" }),
        Some(JobConfig::new("increment", QueueStrategy::DropOlder)),
    );

    assert_eq!(outcome, EnqueueOutcome::Queued { coalesced: 0 });
    assert_eq!(runtime.model().count, 1);
}

#[test]
fn teardown_detaches_every_binding() {
    let (runtime, browser) = given_no_initial_effects();

    runtime.teardown();

    assert!(browser.listeners().is_empty());
    assert!(browser.intervals().is_empty());
    assert_eq!(browser.fire(ListenTarget::Document, "click", &FakeEvent::click().on("#increment")), 0);
    assert_eq!(runtime.model().count, 0);
}

#[test]
fn dropping_the_runtime_detaches_every_binding() {
    let (runtime, browser) = given_no_initial_effects();

    drop(runtime);

    assert!(browser.listeners().is_empty());
    assert!(browser.intervals().is_empty());
}

#[test]
fn zero_queue_capacity_still_renders_the_initial_model() {
    let config = RuntimeConfig {
        queue_capacity: 0,
        ..RuntimeConfig::default()
    };
    let (runtime, browser) = given_a_config(config, Vec::new());

    assert_eq!(runtime.phase(), Phase::Idle);
    assert_eq!(browser.patches().len(), 1);

    runtime.send(json!({ "type": "Increment" }), None);
    assert_eq!(runtime.model().count, 1);
}
