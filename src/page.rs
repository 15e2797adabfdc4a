//! The pure core contract.

use serde::de::DeserializeOwned;

use crate::{Effect, HostMsg, Subscription};

/// Result of [`Page::init`] and [`Page::update`]: the replacement model and
/// the effects to dispatch once it has been rendered.
pub struct Update<Model> {
    pub model: Model,
    pub effects: Vec<Effect>,
}

impl<Model> Update<Model> {
    pub fn new(model: Model, effects: Vec<Effect>) -> Self {
        Self { model, effects }
    }

    /// A model with no effects.
    pub fn model(model: Model) -> Self {
        Self::new(model, Vec::new())
    }
}

/// Application core driven by the runtime.
///
/// Implementations must be pure: every method derives its output from its
/// arguments alone. Messages reach [`update`](Self::update) after capture
/// substitution, decoded from their JSON template into [`Page::Msg`].
///
/// # Example
///
/// ```rust
/// use oxide_mvu_dom::{Page, Subscription, Update};
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// enum Msg { Increment }
///
/// #[derive(Clone)]
/// struct Model { count: i32 }
///
/// struct Counter;
///
/// impl Page for Counter {
///     type Model = Model;
///     type Msg = Msg;
///
///     fn id(&self) -> String { "app".to_string() }
///
///     fn init(&self) -> Update<Model> { Update::model(Model { count: 0 }) }
///
///     fn update(&self, msg: Msg, model: &Model) -> Update<Model> {
///         match msg {
///             Msg::Increment => Update::model(Model { count: model.count + 1 }),
///         }
///     }
///
///     fn view_body(&self, model: &Model) -> String {
///         format!("<p>{}</p>", model.count)
///     }
///
///     fn subscriptions(&self, _model: &Model) -> Vec<Subscription> { Vec::new() }
/// }
/// ```
pub trait Page {
    type Model: Clone + 'static;
    type Msg: DeserializeOwned;

    /// Id of the element the page is mounted into.
    fn id(&self) -> String;

    fn init(&self) -> Update<Self::Model>;

    fn update(&self, msg: Self::Msg, model: &Self::Model) -> Update<Self::Model>;

    /// Handle a message sent by host code outside the typed message catalogue.
    fn update_from_host(&self, msg: HostMsg, model: &Self::Model) -> Update<Self::Model> {
        tracing::warn!(kind = %msg.kind, "page does not handle host messages");
        Update::model(model.clone())
    }

    fn view_body(&self, model: &Self::Model) -> String;

    /// Bindings the model currently requires.
    fn subscriptions(&self, model: &Self::Model) -> Vec<Subscription>;
}
