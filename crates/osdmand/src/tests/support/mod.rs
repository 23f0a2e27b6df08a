//! Shared fixtures for daemon behaviour tests.

mod reporter;
mod signal;
mod world;

pub(crate) use reporter::{HealthEvent, RecordingHealthReporter};
pub(crate) use signal::ManualShutdownSignal;
pub(crate) use world::{DaemonWorld, daemon_config};
