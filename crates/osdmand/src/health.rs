//! Structured health reporting for daemon lifecycle events.

use std::sync::Arc;

use crate::display::{DisplayError, DisplayExit};
use crate::lifecycle::{LifecycleState, ShutdownTrigger};
use crate::process::LaunchError;

const HEALTH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::health");

/// Observer trait used to surface lifecycle events to telemetry sinks.
pub trait HealthReporter: Send + Sync {
    /// Invoked on every lifecycle transition.
    fn lifecycle_changed(&self, state: LifecycleState);

    /// Invoked once, by whichever shutdown request arrives first.
    fn shutdown_requested(&self, trigger: ShutdownTrigger);

    /// Invoked when the display program finishes.
    fn display_exited(&self, exit: DisplayExit);

    /// Invoked when the display program cannot be started or observed.
    fn display_unavailable(&self, error: &DisplayError);

    /// Invoked when the daemon fails to launch or run.
    fn launch_failed(&self, error: &LaunchError);
}

impl<T> HealthReporter for Arc<T>
where
    T: HealthReporter + ?Sized,
{
    fn lifecycle_changed(&self, state: LifecycleState) {
        (**self).lifecycle_changed(state);
    }

    fn shutdown_requested(&self, trigger: ShutdownTrigger) {
        (**self).shutdown_requested(trigger);
    }

    fn display_exited(&self, exit: DisplayExit) {
        (**self).display_exited(exit);
    }

    fn display_unavailable(&self, error: &DisplayError) {
        (**self).display_unavailable(error);
    }

    fn launch_failed(&self, error: &LaunchError) {
        (**self).launch_failed(error);
    }
}

/// Default reporter that records lifecycle events using `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuredHealthReporter;

impl StructuredHealthReporter {
    /// Builds a new reporter.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl HealthReporter for StructuredHealthReporter {
    fn lifecycle_changed(&self, state: LifecycleState) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "lifecycle_changed",
            state = %state,
            "daemon lifecycle changed"
        );
    }

    fn shutdown_requested(&self, trigger: ShutdownTrigger) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "shutdown_requested",
            trigger = %trigger,
            "daemon shutting down"
        );
    }

    fn display_exited(&self, exit: DisplayExit) {
        match exit {
            DisplayExit::Exited(status) => tracing::warn!(
                target: HEALTH_TARGET,
                event = "display_exited",
                status = %status,
                "display program exited before shutdown"
            ),
            DisplayExit::Cancelled => tracing::info!(
                target: HEALTH_TARGET,
                event = "display_stopped",
                "display program stopped"
            ),
        }
    }

    fn display_unavailable(&self, error: &DisplayError) {
        tracing::error!(
            target: HEALTH_TARGET,
            event = "display_unavailable",
            error = %error,
            "display program unavailable; levels will not be shown"
        );
    }

    fn launch_failed(&self, error: &LaunchError) {
        tracing::error!(
            target: HEALTH_TARGET,
            event = "launch_failed",
            error = %error,
            "daemon failed"
        );
    }
}
