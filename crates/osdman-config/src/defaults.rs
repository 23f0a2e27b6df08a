use std::path::PathBuf;

use camino::Utf8PathBuf;

#[cfg(unix)]
use libc::geteuid;

use crate::logging::LogFormat;
use crate::socket::SocketPath;

/// Environment variable overriding the configuration file location.
pub const CONFIG_PATH_ENV_VAR: &str = "OSDMAN_CONFIG_PATH";

/// Name of the configuration file inside the `osdman` config directory.
pub const CONFIG_FILE_NAME: &str = "config.yaml";

/// Default log filter expression used by the binaries.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Display program launched when the configuration does not name one.
pub const DEFAULT_DISPLAY_COMMAND: &str = "wob";

/// Shell interpreter used when the configuration does not name one.
pub const DEFAULT_SHELL: &str = "bash";

/// File name of the daemon socket inside the per-user runtime directory.
pub const SOCKET_FILE_NAME: &str = "osdcmd.sock";

const RUNTIME_ROOT: &str = "/run/user";

/// Default log filter expression used by the binaries.
#[must_use]
pub const fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

pub(crate) fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

/// Default logging format for the binaries.
#[must_use]
pub const fn default_log_format() -> LogFormat {
    LogFormat::Json
}

/// Default display program.
#[must_use]
pub const fn default_display_command() -> &'static str {
    DEFAULT_DISPLAY_COMMAND
}

pub(crate) fn default_display_command_string() -> String {
    DEFAULT_DISPLAY_COMMAND.to_owned()
}

/// Default shell interpreter.
#[must_use]
pub const fn default_shell() -> &'static str {
    DEFAULT_SHELL
}

pub(crate) fn default_shell_string() -> String {
    DEFAULT_SHELL.to_owned()
}

/// Default configuration file: `<config dir>/osdman/config.yaml`.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|mut dir| {
        dir.push("osdman");
        dir.push(CONFIG_FILE_NAME);
        dir
    })
}

/// Computes the per-user socket path: `/run/user/<uid>/osdcmd.sock`.
#[must_use]
pub fn default_socket_path() -> SocketPath {
    let mut path = Utf8PathBuf::from(RUNTIME_ROOT);
    path.push(user_namespace());
    path.push(SOCKET_FILE_NAME);
    SocketPath::new(path)
}

#[cfg(unix)]
fn user_namespace() -> String {
    let uid = unsafe { geteuid() };
    uid.to_string()
}

#[cfg(not(unix))]
fn user_namespace() -> String {
    String::from("0")
}
