//! Test double for [`HealthReporter`] that records lifecycle events.

use std::sync::Mutex;

use crate::display::{DisplayError, DisplayExit};
use crate::health::HealthReporter;
use crate::lifecycle::{LifecycleState, ShutdownTrigger};
use crate::process::LaunchError;

/// Health events tracked during scenarios.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum HealthEvent {
    Lifecycle(LifecycleState),
    ShutdownRequested(ShutdownTrigger),
    DisplayExited(DisplayExit),
    DisplayUnavailable(String),
    LaunchFailed(String),
}

#[derive(Debug, Default)]
pub(crate) struct RecordingHealthReporter {
    events: Mutex<Vec<HealthEvent>>,
}

impl RecordingHealthReporter {
    pub(crate) fn events(&self) -> Vec<HealthEvent> {
        self.events
            .lock()
            .expect("health reporter mutex poisoned")
            .clone()
    }

    pub(crate) fn states(&self) -> Vec<LifecycleState> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                HealthEvent::Lifecycle(state) => Some(state),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn shutdown_requests(&self) -> Vec<ShutdownTrigger> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                HealthEvent::ShutdownRequested(trigger) => Some(trigger),
                _ => None,
            })
            .collect()
    }

    fn record(&self, event: HealthEvent) {
        self.events
            .lock()
            .expect("health reporter mutex poisoned")
            .push(event);
    }
}

impl HealthReporter for RecordingHealthReporter {
    fn lifecycle_changed(&self, state: LifecycleState) {
        self.record(HealthEvent::Lifecycle(state));
    }

    fn shutdown_requested(&self, trigger: ShutdownTrigger) {
        self.record(HealthEvent::ShutdownRequested(trigger));
    }

    fn display_exited(&self, exit: DisplayExit) {
        self.record(HealthEvent::DisplayExited(exit));
    }

    fn display_unavailable(&self, error: &DisplayError) {
        self.record(HealthEvent::DisplayUnavailable(error.to_string()));
    }

    fn launch_failed(&self, error: &LaunchError) {
        self.record(HealthEvent::LaunchFailed(error.to_string()));
    }
}
