//! Shared configuration for the osdman daemon and its client.
//!
//! The configuration is a YAML document mapping each *domain* (an on-screen
//! indicator such as `volume`) to the command that measures its level and to
//! the *verbs* that change it. Both binaries load the same document so the
//! client can offer completions for exactly the domains the daemon serves.
//!
//! ```yaml
//! domains:
//!   volume:
//!     stat_cmd: "pamixer --get-volume"
//!     verbs:
//!       up: { cmd: "pamixer -i 5" }
//!       down: { cmd: "pamixer -d 5" }
//! ```
//!
//! The snapshot is read once at startup and never mutated afterwards.

use std::collections::BTreeMap;
use std::env;
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

mod defaults;
mod logging;
mod socket;

pub use defaults::{
    CONFIG_FILE_NAME, CONFIG_PATH_ENV_VAR, DEFAULT_DISPLAY_COMMAND, DEFAULT_LOG_FILTER,
    DEFAULT_SHELL, SOCKET_FILE_NAME, default_config_path, default_display_command,
    default_log_filter, default_log_format, default_shell, default_socket_path,
};
pub use logging::{LogFormat, LogFormatParseError};
pub use socket::{SocketPath, SocketPreparationError};

/// A single verb: the shell command that changes a domain's state.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct Verb {
    /// Shell command executed when the verb is triggered.
    #[serde(rename = "cmd")]
    pub command: String,
}

impl Verb {
    /// Builds a verb from its shell command.
    #[must_use]
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }
}

/// A named indicator with one measurement command and a set of verbs.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct Domain {
    /// Shell command whose trimmed output is the domain's current level.
    #[serde(rename = "stat_cmd")]
    pub measurement_command: String,
    /// Verbs keyed by name.
    #[serde(default)]
    pub verbs: BTreeMap<String, Verb>,
}

impl Domain {
    /// Builds a domain without verbs.
    #[must_use]
    pub fn new(measurement_command: impl Into<String>) -> Self {
        Self {
            measurement_command: measurement_command.into(),
            verbs: BTreeMap::new(),
        }
    }

    /// Adds a verb, replacing any previous verb with the same name.
    #[must_use]
    pub fn with_verb(mut self, name: impl Into<String>, command: impl Into<String>) -> Self {
        self.verbs.insert(name.into(), Verb::new(command));
        self
    }

    /// Looks up a verb by name.
    #[must_use]
    pub fn verb(&self, name: &str) -> Option<&Verb> {
        self.verbs.get(name)
    }

    /// Verb names in lexical order.
    pub fn verb_names(&self) -> impl Iterator<Item = &str> {
        self.verbs.keys().map(String::as_str)
    }
}

/// Parsed configuration snapshot shared by the daemon and the client.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct Config {
    /// Domains keyed by name.
    #[serde(default)]
    pub domains: BTreeMap<String, Domain>,
    /// Log filter expression in `tracing` `EnvFilter` syntax.
    #[serde(default = "defaults::default_log_filter_string")]
    pub log_filter: String,
    /// Log output format.
    #[serde(default = "default_log_format")]
    pub log_format: LogFormat,
    /// Program launched once to render levels read from its stdin.
    #[serde(rename = "display_cmd", default = "defaults::default_display_command_string")]
    pub display_command: String,
    /// Shell interpreter used for verb and measurement commands.
    #[serde(default = "defaults::default_shell_string")]
    pub shell: String,
    /// Datagram socket the daemon listens on.
    #[serde(rename = "socket_path", default = "default_socket_path")]
    pub daemon_socket: SocketPath,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            domains: BTreeMap::new(),
            log_filter: defaults::default_log_filter_string(),
            log_format: default_log_format(),
            display_command: defaults::default_display_command_string(),
            shell: defaults::default_shell_string(),
            daemon_socket: default_socket_path(),
        }
    }
}

impl Config {
    /// Loads the configuration from its default location.
    ///
    /// The `OSDMAN_CONFIG_PATH` environment variable overrides the location.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file cannot be located, read, parsed,
    /// or validated.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with_override(None)
    }

    /// Loads the configuration, preferring an explicit path when supplied.
    ///
    /// Precedence: `explicit`, then `OSDMAN_CONFIG_PATH`, then
    /// `<config dir>/osdman/config.yaml`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file cannot be located, read, parsed,
    /// or validated.
    pub fn load_with_override(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let path = resolve_config_path(explicit, env::var_os(CONFIG_PATH_ENV_VAR))?;
        Self::load_from_path(&path)
    }

    /// Loads and validates the configuration stored at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file cannot be read, parsed, or
    /// validated.
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text, &path.display().to_string())
    }

    /// Parses and validates a configuration document held in memory.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the document is not valid YAML, does not
    /// match the schema, or fails validation.
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        Self::parse(text, "<inline>")
    }

    fn parse(text: &str, origin: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_saphyr::from_str(text).map_err(|source| ConfigError::Parse {
            origin: origin.to_owned(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        match self
            .domains
            .keys()
            .find(|name| name.is_empty() || name.contains('/'))
        {
            Some(name) => Err(ConfigError::InvalidDomainName { name: name.clone() }),
            None => Ok(()),
        }
    }

    /// Adds a domain, replacing any previous domain with the same name.
    #[must_use]
    pub fn with_domain(mut self, name: impl Into<String>, domain: Domain) -> Self {
        self.domains.insert(name.into(), domain);
        self
    }

    /// Looks up a domain by name.
    #[must_use]
    pub fn domain(&self, name: &str) -> Option<&Domain> {
        self.domains.get(name)
    }

    /// Domain names in lexical order.
    pub fn domain_names(&self) -> impl Iterator<Item = &str> {
        self.domains.keys().map(String::as_str)
    }

    /// Datagram socket the daemon binds and the client sends to.
    #[must_use]
    pub const fn daemon_socket(&self) -> &SocketPath {
        &self.daemon_socket
    }

    /// Log filter expression.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        self.log_filter.as_str()
    }

    /// Log output format.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Display program command line.
    #[must_use]
    pub fn display_command(&self) -> &str {
        self.display_command.as_str()
    }

    /// Shell interpreter for verb and measurement commands.
    #[must_use]
    pub fn shell(&self) -> &str {
        self.shell.as_str()
    }
}

fn resolve_config_path(
    explicit: Option<&Path>,
    from_env: Option<OsString>,
) -> Result<PathBuf, ConfigError> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }
    if let Some(path) = from_env.filter(|value| !value.is_empty()) {
        return Ok(PathBuf::from(path));
    }
    default_config_path().ok_or(ConfigError::MissingConfigDirectory)
}

/// Errors raised while loading the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No explicit path was given and the platform has no config directory.
    #[error("unable to locate the user configuration directory")]
    MissingConfigDirectory,
    /// The configuration file could not be read.
    #[error("failed to read configuration '{path}': {source}")]
    Read {
        /// File that could not be read.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// The document is not valid YAML or does not match the schema.
    #[error("failed to parse configuration '{origin}': {source}")]
    Parse {
        /// File path, or `<inline>` for in-memory documents.
        origin: String,
        /// Underlying deserialisation error.
        #[source]
        source: serde_saphyr::Error,
    },
    /// A domain name cannot be addressed by a `<domain>/<verb>` trigger.
    #[error("domain name '{name}' must be non-empty and must not contain '/'")]
    InvalidDomainName {
        /// Offending domain name.
        name: String,
    },
}

impl ConfigError {
    /// Returns true when the error means the file does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Read { source, .. } if source.kind() == io::ErrorKind::NotFound)
    }
}
