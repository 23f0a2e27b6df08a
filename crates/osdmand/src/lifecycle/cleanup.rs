//! Ordered cleanup actions guarded by a one-shot gate.

use std::panic::{self, AssertUnwindSafe};
use std::sync::{Mutex, Once, PoisonError};

use tracing::{error, info};

use super::LIFECYCLE_TARGET;

type Action = Box<dyn FnOnce() + Send>;

/// Cleanup actions registered during initialisation and run at most once.
pub(crate) struct CleanupActions {
    actions: Mutex<Vec<(&'static str, Action)>>,
    gate: Once,
}

impl Default for CleanupActions {
    fn default() -> Self {
        Self {
            actions: Mutex::new(Vec::new()),
            gate: Once::new(),
        }
    }
}

impl CleanupActions {
    pub(crate) fn register(&self, name: &'static str, action: impl FnOnce() + Send + 'static) {
        self.actions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((name, Box::new(action)));
    }

    /// Runs `prelude` and then every action in registration order.
    ///
    /// Only the first caller runs anything; concurrent callers block until the
    /// first has finished, so no caller observes a half-cleaned daemon.
    /// A panicking action is logged and the remaining actions still run.
    /// Returns `true` for the caller that ran the actions.
    pub(crate) fn run_once(&self, prelude: impl FnOnce()) -> bool {
        let mut ran = false;
        self.gate.call_once(|| {
            if panic::catch_unwind(AssertUnwindSafe(prelude)).is_err() {
                error!(target: LIFECYCLE_TARGET, "shutdown prelude panicked");
            }
            let actions = std::mem::take(
                &mut *self.actions.lock().unwrap_or_else(PoisonError::into_inner),
            );
            for (name, action) in actions {
                info!(target: LIFECYCLE_TARGET, action = name, "running cleanup action");
                if panic::catch_unwind(AssertUnwindSafe(action)).is_err() {
                    error!(target: LIFECYCLE_TARGET, action = name, "cleanup action panicked");
                }
            }
            ran = true;
        });
        ran
    }

    pub(crate) fn has_run(&self) -> bool {
        self.gate.is_completed()
    }
}
