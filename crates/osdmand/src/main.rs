use std::io::{self, Write};
use std::process::ExitCode;

fn main() -> ExitCode {
    match osdmand::run_daemon() {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            let _ = writeln!(io::stderr(), "osdmand: {error}");
            ExitCode::FAILURE
        }
    }
}
