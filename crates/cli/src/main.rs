use std::process::ExitCode;

fn main() -> ExitCode {
    basketcast_cli::run()
}
