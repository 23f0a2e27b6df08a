//! Error types for trigger parsing and dispatch.

use thiserror::Error;

use crate::display::DisplayError;
use crate::runner::CommandError;

/// Reasons a trigger payload could not be split into domain and verb.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TriggerParseError {
    /// The payload is not valid UTF-8.
    #[error("trigger is not valid UTF-8")]
    NotUtf8,
    /// The payload has no `/` separator.
    #[error("trigger `{payload}` has no '/' separator")]
    MissingSeparator { payload: String },
    /// The domain or the verb is empty.
    #[error("trigger `{payload}` has an empty domain or verb")]
    EmptySegment { payload: String },
}

/// Errors that abandon a single trigger.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The payload was not a `domain/verb` pair.
    #[error(transparent)]
    Malformed(#[from] TriggerParseError),

    /// The domain is not configured.
    #[error("unknown domain '{domain}'")]
    UnknownDomain { domain: String },

    /// The verb is not configured for the domain.
    #[error("unknown verb '{verb}' for domain '{domain}'")]
    UnknownVerb { domain: String, verb: String },

    /// The verb's command failed.
    #[error("verb command for {domain}/{verb} failed: {source}")]
    VerbCommand {
        domain: String,
        verb: String,
        #[source]
        source: CommandError,
    },

    /// The domain's measurement command failed.
    #[error("measurement command for '{domain}' failed: {source}")]
    MeasurementCommand {
        domain: String,
        #[source]
        source: CommandError,
    },

    /// The measurement command printed something other than a number.
    #[error("malformed stat_cmd output for '{domain}': {output:?}")]
    InvalidMeasurement { domain: String, output: String },

    /// The level could not be written to the display.
    #[error("failed to forward level to display: {0}")]
    Display(#[source] DisplayError),
}

impl DispatchError {
    /// Returns `true` when the payload itself was unusable.
    ///
    /// Malformed payloads are logged as warnings; everything else is an error.
    #[must_use]
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::Malformed(_))
    }
}
