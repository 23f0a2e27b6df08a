//! CLI argument definitions for osdman.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::completions::CompletionShell;

/// Command-line interface for the osdman on-screen display manager.
#[derive(Parser, Debug)]
#[command(name = "osdman", disable_help_subcommand = true)]
pub(crate) struct Cli {
    /// Reads configuration from this file instead of the default location.
    #[arg(long, value_name = "FILE", global = true)]
    pub(crate) config_path: Option<PathBuf>,
    #[command(subcommand)]
    pub(crate) command: CliCommand,
}

#[derive(Subcommand, Debug, Clone)]
pub(crate) enum CliCommand {
    /// Runs the daemon in the foreground.
    Daemon,
    /// Triggers a verb of a configured domain.
    Call {
        /// Domain name, for example `volume`.
        #[arg(value_name = "DOMAIN")]
        domain: String,
        /// Verb name, for example `up`.
        #[arg(value_name = "VERB")]
        verb: String,
    },
    /// Prints a shell completion script.
    Completion {
        /// Shell to generate the script for.
        #[arg(value_enum, value_name = "SHELL")]
        shell: CompletionShell,
    },
    /// Prints completion candidates for `call`, one per line.
    #[command(hide = true)]
    Complete {
        /// Words already typed after `call`.
        #[arg(value_name = "WORD", num_args = 0..)]
        words: Vec<String>,
    },
}
