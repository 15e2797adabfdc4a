use oxide_mvu_dom::{
    ClipboardEffect, Effect, EventListener, HostMsg, Interval, Page, Subscription, SubscriptionMsg, Update,
};
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(tag = "type")]
pub(crate) enum TestMsg {
    Increment,
    Tick,
    StopTicking,
    Noted,
    Renamed { title: String },
    Loaded { draft: Value },
    Copied { result: Value },
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct TestModel {
    pub(crate) count: i32,
    pub(crate) ticks: u32,
    pub(crate) ticking: bool,
    pub(crate) title: String,
    pub(crate) draft: Value,
    pub(crate) copied: Value,
    /// Count observed by each `Noted` message, in arrival order.
    pub(crate) notes: Vec<i32>,
}

pub(crate) struct TestPage {
    pub(crate) initial_effects: Box<dyn InitialEffectsDependency>,
    pub(crate) effects: Box<dyn EffectsDependency>,
}

#[cfg_attr(test, mockall::automock)]
pub(crate) trait InitialEffectsDependency {
    fn on_init(&self) -> Vec<Effect>;
}

#[cfg_attr(test, mockall::automock)]
pub(crate) trait EffectsDependency {
    fn on_increment_effects(&self, count: i32) -> Vec<Effect>;
}

impl Page for TestPage {
    type Model = TestModel;
    type Msg = TestMsg;

    fn id(&self) -> String {
        "app".to_string()
    }

    fn init(&self) -> Update<TestModel> {
        let model = TestModel {
            count: 0,
            ticks: 0,
            ticking: true,
            title: String::new(),
            draft: Value::Null,
            copied: Value::Null,
            notes: Vec::new(),
        };
        Update::new(model, self.initial_effects.on_init())
    }

    fn update(&self, msg: TestMsg, model: &TestModel) -> Update<TestModel> {
        let mut next = model.clone();
        match msg {
            TestMsg::Increment => {
                next.count += 1;
                let effects = self.effects.on_increment_effects(next.count);
                return Update::new(next, effects);
            }
            TestMsg::Tick => next.ticks += 1,
            TestMsg::StopTicking => next.ticking = false,
            TestMsg::Noted => next.notes.push(model.count),
            TestMsg::Renamed { title } => next.title = title,
            TestMsg::Loaded { draft } => next.draft = draft,
            TestMsg::Copied { result } => next.copied = result,
        }
        Update::model(next)
    }

    fn update_from_host(&self, msg: HostMsg, model: &TestModel) -> Update<TestModel> {
        let mut next = model.clone();
        if msg.kind == "setCount" {
            next.count = msg.data.as_i64().unwrap_or_default() as i32;
        }
        Update::model(next)
    }

    fn view_body(&self, model: &TestModel) -> String {
        format!(
            r#"<button id="increment">{}</button><input id="title"><h1>{}</h1><button id="copy">copy</button>"#,
            model.count, model.title
        )
    }

    fn subscriptions(&self, model: &TestModel) -> Vec<Subscription> {
        let mut subscriptions = vec![
            Subscription::EventListener(
                EventListener::new("increment", "click", json!({ "type": "Increment" })).on("#increment"),
            ),
            Subscription::EventListener(
                EventListener::new(
                    "rename",
                    "input",
                    json!({
                        "type": "Renamed",
                        "title": {
                            "type": "dom",
                            "config": { "type": "getElementValue", "config": { "elementId": "title" } }
                        }
                    }),
                )
                .on("#title"),
            ),
            Subscription::EventListener(
                EventListener::new(
                    "copy",
                    "click",
                    SubscriptionMsg::effectful(
                        json!({ "type": "Copied", "result": { "type": "effectValue" } }),
                        Effect::Clipboard(ClipboardEffect::WriteText {
                            text: "hello".to_string(),
                        }),
                    ),
                )
                .on("#copy"),
            ),
        ];

        if model.ticking {
            subscriptions.push(Subscription::Interval(Interval::new(
                "tick",
                1000,
                json!({ "type": "Tick" }),
            )));
        }

        subscriptions
    }
}
