//! Command-line interface for osdman.
//!
//! `osdman daemon` runs the daemon in the foreground, `osdman call DOMAIN VERB`
//! sends it a trigger, and `osdman completion SHELL` prints a completion
//! script. The script calls the hidden `osdman complete`, which prints the
//! candidates for `call` from the configured domains and verbs.
//! Configuration loading and the IO streams are injectable so the runtime can
//! be exercised from tests.

use std::ffi::OsString;
use std::io::Write;
use std::process::ExitCode;

use clap::Parser;

mod cli;
mod complete;
mod completions;
mod config;
mod errors;
mod transport;

use cli::{Cli, CliCommand};
pub(crate) use config::{ConfigLoader, FileConfigLoader};
pub(crate) use errors::AppError;

/// Runs the CLI using the provided arguments and IO handles.
#[must_use]
pub fn run<I, W, E>(args: I, stdout: &mut W, stderr: &mut E) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
{
    run_with_loader(args, stdout, stderr, &FileConfigLoader)
}

pub(crate) fn run_with_loader<I, W, E, L>(
    args: I,
    stdout: &mut W,
    stderr: &mut E,
    loader: &L,
) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
    L: ConfigLoader,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(error) if !error.use_stderr() => {
            let _ = write!(stdout, "{error}");
            return ExitCode::SUCCESS;
        }
        Err(error) => {
            let _ = write!(stderr, "{}", AppError::CliUsage(error));
            return ExitCode::FAILURE;
        }
    };

    match execute(cli, loader, stdout) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            let _ = writeln!(stderr, "osdman: {error}");
            ExitCode::FAILURE
        }
    }
}

fn execute<W, L>(cli: Cli, loader: &L, stdout: &mut W) -> Result<(), AppError>
where
    W: Write,
    L: ConfigLoader,
{
    let load = || loader.load(cli.config_path.as_deref());
    match cli.command {
        CliCommand::Daemon => osdmand::run_daemon_with_config(load()?).map_err(AppError::from),
        CliCommand::Call { domain, verb } => {
            let config = load()?;
            let written = transport::send_trigger(config.daemon_socket(), &domain, &verb)?;
            writeln!(stdout, "Wrote: {written}").map_err(AppError::Output)
        }
        CliCommand::Completion { shell } => {
            completions::write_script(shell, stdout).map_err(AppError::Output)
        }
        CliCommand::Complete { words } => {
            let config = load()?;
            for candidate in complete::candidates(&config, &words)? {
                writeln!(stdout, "{candidate}").map_err(AppError::Output)?;
            }
            Ok(())
        }
    }
}
