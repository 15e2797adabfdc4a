use std::cell::RefCell;
use std::rc::Rc;

use oxide_mvu_dom::testing::{FakeBrowser, FakeEvent, FakeNode};
use oxide_mvu_dom::{ConsoleEffect, Effect, ListenTarget, NavigationEffect, RuntimeConfig, StorageEffect};
use serde_json::{json, Value};

use crate::{
    given_a_browser, given_a_config, given_a_mount_element, given_deferred_tasks, given_initial_effects,
    given_no_initial_effects, given_on_increment_effects,
};

fn load_draft() -> Effect {
    Effect::load_local("draft", json!({ "type": "Loaded", "draft": { "type": "effectValue" } }))
}

#[test]
fn initial_storage_load_is_delivered_after_the_first_render() {
    let browser = given_a_mount_element();
    browser.set_local_item("draft", r#"{ "title": "Groceries" }"#);

    let runtime = given_a_browser(browser.clone(), vec![load_draft()]);

    assert_eq!(runtime.model().draft, json!({ "title": "Groceries" }));
    assert_eq!(browser.patches().len(), 2);
}

#[test]
fn missing_storage_items_load_as_null() {
    let (runtime, browser) = given_initial_effects(vec![load_draft()]);

    assert_eq!(runtime.model().draft, Value::Null);
    assert_eq!(browser.patches().len(), 2);
}

#[test]
fn repeated_loads_of_one_key_coalesce() {
    let browser = given_a_mount_element();
    browser.set_local_item("draft", "1");

    let runtime = given_a_browser(browser.clone(), vec![load_draft(), load_draft(), load_draft()]);

    assert_eq!(runtime.model().draft, json!(1));
    assert_eq!(browser.patches().len(), 2);
}

#[test]
fn storage_writes_are_persisted() {
    let (runtime, browser) = given_on_increment_effects(vec![Effect::SessionStorage(StorageEffect::SetItem {
        key: "count".to_string(),
        value: json!({ "n": 1 }),
    })]);

    runtime.send(json!({ "type": "Increment" }), None);

    assert_eq!(browser.session_item("count").as_deref(), Some(r#"{"n":1}"#));
    assert_eq!(browser.local_item("count"), None);
}

#[test]
fn element_value_captures_are_resolved_when_the_job_runs() {
    let (runtime, browser) = given_no_initial_effects();
    browser.set_element("title", Some("Groceries"));

    browser.fire(ListenTarget::Document, "input", &FakeEvent::other().on("#title"));

    assert_eq!(runtime.model().title, "Groceries");
    assert!(browser.last_markup().unwrap().contains("<h1>Groceries</h1>"));
}

#[test]
fn clipboard_results_are_delivered_as_a_later_message() {
    let (runtime, browser) = given_no_initial_effects();

    browser.fire(ListenTarget::Document, "click", &FakeEvent::click().on("#copy"));

    assert_eq!(runtime.model().copied, json!({ "success": true, "error": null }));
    assert_eq!(browser.clipboard(), vec!["hello"]);
}

#[test]
fn clipboard_denials_are_reported_to_the_page() {
    let (runtime, browser) = given_no_initial_effects();
    browser.deny_clipboard("permission denied");

    browser.fire(ListenTarget::Document, "click", &FakeEvent::click().on("#copy"));

    assert_eq!(
        runtime.model().copied,
        json!({ "success": false, "error": "permission denied" })
    );
    assert!(browser.clipboard().is_empty());
}

#[test]
fn messages_sent_during_a_pending_clipboard_write_wait_for_its_result() {
    let (runtime, browser, tasks) = given_deferred_tasks();

    browser.fire(ListenTarget::Document, "click", &FakeEvent::click().on("#copy"));
    runtime.send(json!({ "type": "Increment" }), None);

    assert_eq!(runtime.model().count, 0);
    assert_eq!(runtime.model().copied, Value::Null);
    assert_eq!(browser.patches().len(), 1);

    assert_eq!(tasks.run_all(), 1);

    assert_eq!(runtime.model().copied, json!({ "success": true, "error": null }));
    assert_eq!(runtime.model().count, 1);
    let markups: Vec<_> = browser.patches().into_iter().map(|patch| patch.markup).collect();
    assert_eq!(markups.len(), 3);
    assert!(markups[1].contains(r#"<button id="increment">0</button>"#));
    assert!(markups[2].contains(r#"<button id="increment">1</button>"#));
}

#[test]
fn navigation_and_console_effects_run_after_the_render() {
    let (runtime, browser) = given_on_increment_effects(vec![
        Effect::Navigation(NavigationEffect::PushUrl("/count/1".to_string())),
        Effect::Console(ConsoleEffect::Log {
            message: "incremented".to_string(),
        }),
    ]);

    runtime.send(json!({ "type": "Increment" }), None);

    assert_eq!(browser.history(), vec!["/count/1"]);
    assert_eq!(browser.console(), vec!["incremented"]);
}

#[test]
fn unknown_effects_do_not_stop_the_rest_of_the_batch() {
    let unknown: Effect = serde_json::from_value(json!({ "type": "vibrate", "config": 200 })).unwrap();
    let (runtime, browser) = given_on_increment_effects(vec![
        unknown,
        Effect::Console(ConsoleEffect::Log {
            message: "still here".to_string(),
        }),
    ]);

    runtime.send(json!({ "type": "Increment" }), None);

    assert_eq!(runtime.model().count, 1);
    assert_eq!(browser.console(), vec!["still here"]);
}

#[test]
fn custom_effects_are_held_until_a_handler_is_registered() {
    let (runtime, browser) = given_on_increment_effects(vec![Effect::Custom(json!({ "event": "incremented" }))]);
    let received = Rc::new(RefCell::new(Vec::new()));

    browser.fire(ListenTarget::Document, "click", &FakeEvent::click().on("#increment"));
    browser.fire(ListenTarget::Document, "click", &FakeEvent::click().on("#increment"));

    let sink = received.clone();
    runtime.set_custom_effect_handler(move |effect| sink.borrow_mut().push(effect.clone()));
    assert_eq!(received.borrow().len(), 2);

    browser.fire(ListenTarget::Document, "click", &FakeEvent::click().on("#increment"));
    assert_eq!(*received.borrow(), vec![json!({ "event": "incremented" }); 3]);
}

#[test]
fn custom_effects_are_discarded_without_a_backlog() {
    let config = RuntimeConfig::from_json(r#"{ "customEffects": { "useBacklog": false } }"#).unwrap();
    let (runtime, _browser) = given_a_config(config, vec![Effect::Custom(json!("ping"))]);
    let received = Rc::new(RefCell::new(Vec::new()));

    runtime.send(json!({ "type": "Increment" }), None);

    let sink = received.clone();
    runtime.set_custom_effect_handler(move |effect| sink.borrow_mut().push(effect.clone()));
    assert!(received.borrow().is_empty());
}

fn unmanaged_div() -> (FakeNode, FakeNode) {
    let from = FakeNode {
        name: "DIV".to_string(),
        attributes: vec!["unmanaged".to_string()],
        ..FakeNode::default()
    };
    let to = FakeNode {
        name: "DIV".to_string(),
        ..FakeNode::default()
    };
    (from, to)
}

#[test]
fn patcher_is_told_to_skip_unmanaged_nodes() {
    let browser: FakeBrowser = given_a_mount_element();
    let (from, to) = unmanaged_div();
    browser.set_skip_pair(from, to);

    let _runtime = given_a_browser(browser.clone(), Vec::new());

    assert_eq!(browser.patches()[0].skipped, Some(true));
}

#[test]
fn patcher_is_told_to_preserve_a_focused_input_being_edited() {
    let (runtime, browser) = given_no_initial_effects();
    browser.set_skip_pair(
        FakeNode {
            name: "INPUT".to_string(),
            value: Some("typing".to_string()),
            active: true,
            ..FakeNode::default()
        },
        FakeNode {
            name: "INPUT".to_string(),
            value: Some(String::new()),
            ..FakeNode::default()
        },
    );

    runtime.send(json!({ "type": "Increment" }), None);

    assert_eq!(browser.patches().last().and_then(|patch| patch.skipped), Some(true));
}

#[test]
fn unmanaged_attribute_is_configurable() {
    let config = RuntimeConfig {
        unmanaged_attribute: "data-keep".to_string(),
        ..RuntimeConfig::default()
    };
    let (runtime, browser) = given_a_config(config, Vec::new());
    let (from, to) = unmanaged_div();
    browser.set_skip_pair(from, to);

    runtime.send(json!({ "type": "Increment" }), None);

    assert_eq!(browser.patches().last().and_then(|patch| patch.skipped), Some(false));
}
