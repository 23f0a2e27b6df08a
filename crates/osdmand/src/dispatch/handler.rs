//! Dispatcher that turns triggers into display levels.

use std::sync::Arc;

use osdman_config::Config;
use tracing::{debug, error, info, warn};

use super::{DISPATCH_TARGET, DispatchError, TriggerRequest};
use crate::display::{Level, LevelSink};
use crate::runner::CommandRunner;
use crate::transport::TriggerHandler;

/// Runs the configured commands for a trigger and forwards the result.
#[derive(Debug)]
pub struct Dispatcher<R, S> {
    config: Arc<Config>,
    runner: R,
    sink: S,
}

impl<R, S> Dispatcher<R, S>
where
    R: CommandRunner,
    S: LevelSink,
{
    /// Builds a dispatcher over an immutable configuration snapshot.
    pub fn new(config: Arc<Config>, runner: R, sink: S) -> Self {
        Self {
            config,
            runner,
            sink,
        }
    }

    /// Handles one payload end to end.
    ///
    /// The verb command always runs before the measurement command, and
    /// nothing runs for payloads that do not name a configured verb.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError`] describing the step that abandoned the
    /// trigger.
    pub fn dispatch(&self, payload: &[u8]) -> Result<Level, DispatchError> {
        let request = TriggerRequest::parse(payload)?;
        let domain = self.config.domain(request.domain()).ok_or_else(|| {
            DispatchError::UnknownDomain {
                domain: request.domain().to_owned(),
            }
        })?;
        let verb = domain
            .verb(request.verb())
            .ok_or_else(|| DispatchError::UnknownVerb {
                domain: request.domain().to_owned(),
                verb: request.verb().to_owned(),
            })?;

        debug!(
            target: DISPATCH_TARGET,
            domain = request.domain(),
            verb = request.verb(),
            "running verb command"
        );
        self.runner
            .run(&verb.command)
            .map_err(|source| DispatchError::VerbCommand {
                domain: request.domain().to_owned(),
                verb: request.verb().to_owned(),
                source,
            })?;

        let output = self
            .runner
            .run(&domain.measurement_command)
            .map_err(|source| DispatchError::MeasurementCommand {
                domain: request.domain().to_owned(),
                source,
            })?;
        let level = Level::parse(&output).ok_or_else(|| DispatchError::InvalidMeasurement {
            domain: request.domain().to_owned(),
            output,
        })?;

        self.sink.send(level).map_err(DispatchError::Display)?;
        Ok(level)
    }
}

impl<R, S> TriggerHandler for Dispatcher<R, S>
where
    R: CommandRunner + 'static,
    S: LevelSink + 'static,
{
    fn handle(&self, payload: &[u8]) {
        match self.dispatch(payload) {
            Ok(level) => info!(
                target: DISPATCH_TARGET,
                level = level.value(),
                "level forwarded to display"
            ),
            Err(err) if err.is_malformed() => warn!(
                target: DISPATCH_TARGET,
                error = %err,
                "ignoring malformed trigger"
            ),
            Err(err) => error!(
                target: DISPATCH_TARGET,
                error = %err,
                "trigger abandoned"
            ),
        }
    }
}
