use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};

use portable_atomic_util::Arc;
use serde_json::Value;
use spin::Mutex;

use crate::CustomEffectConfig;

type CustomHandler = Arc<Box<dyn Fn(&Value)>>;

struct CustomState {
    handler: Option<CustomHandler>,
    backlog: VecDeque<Value>,
}

/// Channel for effects the runtime does not interpret itself.
///
/// Effects dispatched before a handler is registered wait in a bounded
/// backlog and are flushed, in order, to the first handler registered.
pub struct CustomEffects {
    config: CustomEffectConfig,
    state: Mutex<CustomState>,
}

impl CustomEffects {
    pub fn new(config: CustomEffectConfig) -> Self {
        Self {
            config,
            state: Mutex::new(CustomState {
                handler: None,
                backlog: VecDeque::new(),
            }),
        }
    }

    pub fn dispatch(&self, effect: Value) {
        let handler = {
            let mut state = self.state.lock();
            match state.handler.clone() {
                Some(handler) => handler,
                None => {
                    self.defer(&mut state.backlog, effect);
                    return;
                }
            }
        };

        invoke(&handler, &effect);
    }

    fn defer(&self, backlog: &mut VecDeque<Value>, effect: Value) {
        if !self.config.use_backlog {
            tracing::debug!("no custom effect handler registered, ignoring effect");
        } else if backlog.len() >= self.config.backlog_capacity {
            tracing::warn!(
                capacity = self.config.backlog_capacity,
                "the custom effect backlog is full, ignoring effect"
            );
        } else {
            backlog.push_back(effect);
            tracing::debug!(len = backlog.len(), "added effect to backlog");
        }
    }

    /// Register the handler, replacing any previous one, and flush the
    /// backlog to it.
    pub fn set_handler(&self, handler: impl Fn(&Value) + 'static) {
        let handler: CustomHandler = Arc::new(Box::new(handler));

        let backlog = {
            let mut state = self.state.lock();
            state.handler = Some(handler.clone());
            core::mem::take(&mut state.backlog)
        };

        if !backlog.is_empty() {
            tracing::debug!(count = backlog.len(), "handling backlog");
        }

        for effect in &backlog {
            invoke(&handler, effect);
        }
    }

    pub fn backlog_len(&self) -> usize {
        self.state.lock().backlog.len()
    }
}

fn invoke(handler: &CustomHandler, effect: &Value) {
    if panic::catch_unwind(AssertUnwindSafe(|| (**handler)(effect))).is_err() {
        tracing::error!(%effect, "custom effect handler panicked");
    }
}
