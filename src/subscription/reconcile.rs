//! Set reconciliation shared by listeners and intervals.

use std::collections::BTreeSet;

use crate::browser::AbortHandle;
use crate::config::ReconcileMode;

/// A declarative descriptor identified by a core-supplied id that is stable
/// across renders.
pub trait Binding: Clone + PartialEq {
    fn id(&self) -> &str;
}

/// A descriptor the reconciler has installed.
#[derive(Debug)]
pub struct ActiveBinding<D> {
    descriptor: D,
    handle: AbortHandle,
}

impl<D> ActiveBinding<D> {
    pub fn descriptor(&self) -> &D {
        &self.descriptor
    }

    pub fn handle(&self) -> &AbortHandle {
        &self.handle
    }
}

/// Ids touched by one reconciliation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Delta {
    pub added: Vec<String>,
    pub removed: Vec<String>,
    pub kept: Vec<String>,
    /// Declared but refused by the installer; never part of the active set.
    pub rejected: Vec<String>,
}

impl Delta {
    /// Whether the pass installed or stopped anything.
    pub fn is_noop(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

pub struct Reconciler<D> {
    mode: ReconcileMode,
    active: Vec<ActiveBinding<D>>,
}

impl<D: Binding> Reconciler<D> {
    pub fn new(mode: ReconcileMode) -> Self {
        Self {
            mode,
            active: Vec::new(),
        }
    }

    pub fn active(&self) -> &[ActiveBinding<D>] {
        &self.active
    }

    pub fn contains(&self, id: &str) -> bool {
        self.active.iter().any(|binding| binding.descriptor.id() == id)
    }

    /// Replace the active set with `desired`, stopping removed bindings before
    /// installing new ones with `start`. `start` returns `None` to refuse a
    /// descriptor.
    pub fn reconcile(
        &mut self,
        desired: Vec<D>,
        mut start: impl FnMut(&D) -> Option<AbortHandle>,
    ) -> Delta {
        let desired = dedupe(desired);
        let mode = self.mode;
        let mut delta = Delta::default();

        let (mut keep, remove): (Vec<_>, Vec<_>) =
            std::mem::take(&mut self.active)
                .into_iter()
                .partition(|binding| {
                    desired
                        .iter()
                        .find(|descriptor| descriptor.id() == binding.descriptor.id())
                        .is_some_and(|descriptor| {
                            mode == ReconcileMode::IdOnly || *descriptor == binding.descriptor
                        })
                });

        for binding in remove {
            binding.handle.abort();
            delta.removed.push(binding.descriptor.id().to_string());
        }

        delta.kept = keep
            .iter()
            .map(|binding| binding.descriptor.id().to_string())
            .collect();

        for descriptor in desired {
            if delta.kept.iter().any(|id| id == descriptor.id()) {
                continue;
            }

            let id = descriptor.id().to_string();
            match start(&descriptor) {
                Some(handle) => {
                    delta.added.push(id);
                    keep.push(ActiveBinding { descriptor, handle });
                }
                None => delta.rejected.push(id),
            }
        }

        self.active = keep;
        delta
    }

    /// Stop every active binding.
    pub fn clear(&mut self) -> Delta {
        self.reconcile(Vec::new(), |_| None)
    }
}

fn dedupe<D: Binding>(desired: Vec<D>) -> Vec<D> {
    let mut seen = BTreeSet::new();
    desired
        .into_iter()
        .filter(|descriptor| {
            let fresh = seen.insert(descriptor.id().to_string());
            if !fresh {
                tracing::warn!(id = descriptor.id(), "duplicate binding id, keeping the first");
            }
            fresh
        })
        .collect()
}
