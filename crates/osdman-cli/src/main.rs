//! CLI entrypoint for osdman.
//!
//! The binary delegates to [`osdman_cli::run`], which loads configuration and
//! either runs the daemon, sends a trigger to it, or prints completions.

use std::io;
use std::process::ExitCode;

fn main() -> ExitCode {
    // The standard streams stay unlocked: `daemon` logs to stderr from its
    // worker threads while this thread is still inside `run`.
    let mut stdout = io::stdout();
    let mut stderr = io::stderr();
    osdman_cli::run(std::env::args_os(), &mut stdout, &mut stderr)
}
