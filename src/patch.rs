//! Contract with the external DOM patcher.

use crate::RuntimeConfig;

/// Read-only view of a node the patcher is about to update.
pub trait PatchNode {
    /// Upper-case node name, e.g. `INPUT`.
    fn node_name(&self) -> String;

    fn has_attribute(&self, name: &str) -> bool;

    /// The node's current `value`, for form controls.
    fn value(&self) -> Option<String>;

    /// Whether the node is the document's active element.
    fn is_active(&self) -> bool;
}

/// Reconciles rendered markup into the live tree under `root_id`.
///
/// The patcher calls `skip(from, to)` before updating each element, with
/// `from` the live node and `to` the node parsed from `markup`; returning
/// `true` leaves the live node untouched.
///
/// # Example
///
/// ```rust
/// use oxide_mvu_dom::{DomPatcher, PatchNode};
///
/// struct InnerHtml;
///
/// impl DomPatcher for InnerHtml {
///     fn patch(&self, root_id: &str, markup: &str, _skip: &dyn Fn(&dyn PatchNode, &dyn PatchNode) -> bool) {
///         println!("#{root_id} <- {markup}");
///     }
/// }
/// ```
pub trait DomPatcher {
    fn patch(&self, root_id: &str, markup: &str, skip: &dyn Fn(&dyn PatchNode, &dyn PatchNode) -> bool);
}

/// Decides which live nodes the patcher must leave alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkipPolicy {
    unmanaged_attribute: String,
    preserve_focused_input: bool,
}

impl SkipPolicy {
    pub fn new(config: &RuntimeConfig) -> Self {
        Self {
            unmanaged_attribute: config.unmanaged_attribute.clone(),
            preserve_focused_input: config.preserve_focused_input,
        }
    }

    pub fn should_skip(&self, from: &dyn PatchNode, to: &dyn PatchNode) -> bool {
        if from.has_attribute(&self.unmanaged_attribute) {
            return true;
        }

        // Keeps in-progress typing from being reset by a stale render.
        self.preserve_focused_input
            && from.node_name() == "INPUT"
            && to.node_name() == "INPUT"
            && from.is_active()
            && from.value() != to.value()
    }
}

impl Default for SkipPolicy {
    fn default() -> Self {
        Self::new(&RuntimeConfig::default())
    }
}
